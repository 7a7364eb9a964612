use kitflow::ordering::{
    CategoryCounts, Company, CompanyAdmin, CompanyDirectory, CompanyId, DispatchPreference,
    Employee, EmployeeDirectory, EmployeeId, Order, OrderId, OrderStatus, OrderStore, Product,
    ProductCatalog, ProductId, RepositoryError, Sku, UniformCategory,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryEmployeeDirectory {
    records: Mutex<HashMap<EmployeeId, Employee>>,
}

impl InMemoryEmployeeDirectory {
    pub(crate) fn insert(&self, employee: Employee) {
        let mut guard = self.records.lock().expect("employee mutex poisoned");
        guard.insert(employee.id.clone(), employee);
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn find(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        let guard = self.records.lock().expect("employee mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryProductCatalog {
    records: Mutex<Vec<Product>>,
}

impl InMemoryProductCatalog {
    pub(crate) fn insert(&self, product: Product) {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        guard.push(product);
    }
}

impl ProductCatalog for InMemoryProductCatalog {
    fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|product| &product.sku == sku).cloned())
    }

    fn find(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|product| &product.id == id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryOrderStore {
    records: Mutex<HashMap<OrderId, Order>>,
}

impl OrderStore for InMemoryOrderStore {
    fn insert(&self, order: Order) -> Result<Order, RepositoryError> {
        let mut guard = self.records.lock().expect("order mutex poisoned");
        if guard.contains_key(&order.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    fn fetch(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let guard = self.records.lock().expect("order mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("order mutex poisoned");
        let order = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        order.status = status;
        Ok(())
    }

    fn for_employee(&self, id: &EmployeeId) -> Result<Vec<Order>, RepositoryError> {
        let guard = self.records.lock().expect("order mutex poisoned");
        Ok(guard
            .values()
            .filter(|order| &order.employee_id == id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryCompanyDirectory {
    records: Mutex<HashMap<CompanyId, Company>>,
}

impl InMemoryCompanyDirectory {
    pub(crate) fn insert(&self, company: Company) {
        let mut guard = self.records.lock().expect("company mutex poisoned");
        guard.insert(company.id.clone(), company);
    }
}

impl CompanyDirectory for InMemoryCompanyDirectory {
    fn find(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        let guard = self.records.lock().expect("company mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(crate) struct SeededRepositories {
    pub(crate) employees: Arc<InMemoryEmployeeDirectory>,
    pub(crate) catalog: Arc<InMemoryProductCatalog>,
    pub(crate) orders: Arc<InMemoryOrderStore>,
    pub(crate) companies: Arc<InMemoryCompanyDirectory>,
}

/// Demo tenant used by the default server and the CLI demo until a real
/// backing store is wired in.
pub(crate) fn seed_repositories() -> SeededRepositories {
    let employees = Arc::new(InMemoryEmployeeDirectory::default());
    let catalog = Arc::new(InMemoryProductCatalog::default());
    let orders = Arc::new(InMemoryOrderStore::default());
    let companies = Arc::new(InMemoryCompanyDirectory::default());

    let company_id = CompanyId("acme-logistics".to_string());
    companies.insert(Company {
        id: company_id.clone(),
        name: "Acme Logistics".to_string(),
        admins: vec![
            CompanyAdmin {
                email: "ops@acme.example".to_string(),
                can_approve_orders: true,
            },
            CompanyAdmin {
                email: "billing@acme.example".to_string(),
                can_approve_orders: false,
            },
        ],
    });

    employees.insert(Employee {
        id: EmployeeId("emp-1001".to_string()),
        company_id: company_id.clone(),
        name: "Dana Reyes".to_string(),
        eligibility: CategoryCounts {
            shirt: 4,
            pant: 3,
            shoe: 1,
            jacket: 1,
        },
        cycle_months: CategoryCounts {
            shirt: 6,
            pant: 6,
            shoe: 12,
            jacket: 12,
        },
        delivery_address: "12 Dock Road, Gate 4".to_string(),
        dispatch_preference: DispatchPreference::Direct,
    });
    employees.insert(Employee {
        id: EmployeeId("emp-1002".to_string()),
        company_id: company_id.clone(),
        name: "Femi Adeyemi".to_string(),
        eligibility: CategoryCounts {
            shirt: 2,
            pant: 2,
            shoe: 1,
            jacket: 0,
        },
        cycle_months: CategoryCounts {
            shirt: 6,
            pant: 6,
            shoe: 12,
            jacket: 12,
        },
        delivery_address: "Depot 7, Harbour Lane".to_string(),
        dispatch_preference: DispatchPreference::Central,
    });

    catalog.insert(Product {
        id: ProductId("prd-001".to_string()),
        sku: Sku("SKU-OXF-SHIRT".to_string()),
        name: "Oxford work shirt".to_string(),
        category: UniformCategory::Shirt,
        sizes: BTreeSet::from(["S".to_string(), "M".to_string(), "L".to_string()]),
        price: 2500,
        company_ids: vec![company_id.clone()],
        vendor_ids: vec!["vendor-north".to_string()],
    });
    catalog.insert(Product {
        id: ProductId("prd-002".to_string()),
        sku: Sku("SKU-CARGO-PANT".to_string()),
        name: "Cargo trouser".to_string(),
        category: UniformCategory::Pant,
        sizes: BTreeSet::from(["30".to_string(), "32".to_string(), "34".to_string()]),
        price: 3800,
        company_ids: vec![company_id.clone()],
        vendor_ids: vec!["vendor-north".to_string()],
    });
    catalog.insert(Product {
        id: ProductId("prd-003".to_string()),
        sku: Sku("SKU-SAFETY-BOOT".to_string()),
        name: "Safety boot".to_string(),
        category: UniformCategory::Shoe,
        sizes: BTreeSet::from(["41".to_string(), "42".to_string(), "43".to_string()]),
        price: 7200,
        company_ids: vec![company_id.clone()],
        vendor_ids: vec!["vendor-south".to_string()],
    });
    catalog.insert(Product {
        id: ProductId("prd-004".to_string()),
        sku: Sku("SKU-BEANIE".to_string()),
        name: "Knit beanie".to_string(),
        category: UniformCategory::Accessory,
        sizes: BTreeSet::from(["one-size".to_string()]),
        price: 900,
        company_ids: vec![company_id],
        vendor_ids: vec!["vendor-south".to_string()],
    });

    SeededRepositories {
        employees,
        catalog,
        orders,
        companies,
    }
}

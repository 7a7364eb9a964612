//! Integration scenarios for bulk order intake: one outcome per submitted
//! row, per-category eligibility enforcement, and partial success across
//! employees and categories, all through the public service facade.

mod common {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::{Arc, Mutex};

    use kitflow::ordering::{
        CategoryCounts, Company, CompanyAdmin, CompanyDirectory, CompanyId, DispatchPreference,
        Employee, EmployeeDirectory, EmployeeId, Order, OrderId, OrderService, OrderStatus,
        OrderStore, Product, ProductCatalog, ProductId, RawOrderRow, RepositoryError, Sku,
        UniformCategory,
    };

    #[derive(Default)]
    pub(super) struct MemoryEmployees {
        records: Mutex<HashMap<EmployeeId, Employee>>,
    }

    impl MemoryEmployees {
        pub(super) fn insert(&self, employee: Employee) {
            let mut guard = self.records.lock().expect("lock");
            guard.insert(employee.id.clone(), employee);
        }
    }

    impl EmployeeDirectory for MemoryEmployees {
        fn find(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryCatalog {
        records: Mutex<Vec<Product>>,
    }

    impl MemoryCatalog {
        pub(super) fn insert(&self, product: Product) {
            self.records.lock().expect("lock").push(product);
        }
    }

    impl ProductCatalog for MemoryCatalog {
        fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.iter().find(|product| &product.sku == sku).cloned())
        }

        fn find(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.iter().find(|product| &product.id == id).cloned())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryOrders {
        records: Mutex<HashMap<OrderId, Order>>,
        pub(super) fail_inserts: Mutex<bool>,
    }

    impl MemoryOrders {
        pub(super) fn stored(&self) -> Vec<Order> {
            self.records.lock().expect("lock").values().cloned().collect()
        }

        pub(super) fn fail_next_inserts(&self) {
            *self.fail_inserts.lock().expect("lock") = true;
        }
    }

    impl OrderStore for MemoryOrders {
        fn insert(&self, order: Order) -> Result<Order, RepositoryError> {
            if *self.fail_inserts.lock().expect("lock") {
                return Err(RepositoryError::Unavailable("order store offline".to_string()));
            }
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&order.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(order.id.clone(), order.clone());
            Ok(order)
        }

        fn fetch(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            let order = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
            order.status = status;
            Ok(())
        }

        fn for_employee(&self, id: &EmployeeId) -> Result<Vec<Order>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|order| &order.employee_id == id)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryCompanies {
        records: Mutex<HashMap<CompanyId, Company>>,
    }

    impl MemoryCompanies {
        pub(super) fn insert(&self, company: Company) {
            let mut guard = self.records.lock().expect("lock");
            guard.insert(company.id.clone(), company);
        }
    }

    impl CompanyDirectory for MemoryCompanies {
        fn find(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }
    }

    pub(super) type Service =
        OrderService<MemoryEmployees, MemoryCatalog, MemoryOrders, MemoryCompanies>;

    pub(super) struct Fixture {
        pub(super) service: Arc<Service>,
        pub(super) orders: Arc<MemoryOrders>,
    }

    pub(super) fn company_id() -> CompanyId {
        CompanyId("harbour-freight".to_string())
    }

    pub(super) fn employee(id: &str, eligibility: CategoryCounts) -> Employee {
        Employee {
            id: EmployeeId(id.to_string()),
            company_id: company_id(),
            name: format!("Worker {id}"),
            eligibility,
            cycle_months: CategoryCounts {
                shirt: 6,
                pant: 6,
                shoe: 12,
                jacket: 12,
            },
            delivery_address: "Pier 9".to_string(),
            dispatch_preference: DispatchPreference::Central,
        }
    }

    pub(super) fn product(id: &str, sku: &str, category: UniformCategory) -> Product {
        Product {
            id: ProductId(id.to_string()),
            sku: Sku(sku.to_string()),
            name: format!("{category} item"),
            category,
            sizes: BTreeSet::from(["M".to_string(), "L".to_string()]),
            price: 2000,
            company_ids: vec![company_id()],
            vendor_ids: vec!["vendor-1".to_string()],
        }
    }

    pub(super) fn row(row_number: u32, employee_id: &str, sku: &str, quantity: i64) -> RawOrderRow {
        RawOrderRow {
            employee_id: employee_id.to_string(),
            sku: sku.to_string(),
            size: "M".to_string(),
            quantity,
            row_number,
        }
    }

    /// One company, two employees, one product per tracked category.
    pub(super) fn fixture() -> Fixture {
        let employees = Arc::new(MemoryEmployees::default());
        let catalog = Arc::new(MemoryCatalog::default());
        let orders = Arc::new(MemoryOrders::default());
        let companies = Arc::new(MemoryCompanies::default());

        companies.insert(Company {
            id: company_id(),
            name: "Harbour Freight".to_string(),
            admins: vec![CompanyAdmin {
                email: "ops@harbour.example".to_string(),
                can_approve_orders: true,
            }],
        });

        employees.insert(employee(
            "emp-a",
            CategoryCounts {
                shirt: 4,
                pant: 2,
                shoe: 1,
                jacket: 1,
            },
        ));
        employees.insert(employee(
            "emp-b",
            CategoryCounts {
                shirt: 2,
                pant: 2,
                shoe: 1,
                jacket: 1,
            },
        ));

        catalog.insert(product("p-shirt", "SKU-SHIRT", UniformCategory::Shirt));
        catalog.insert(product("p-pant", "SKU-PANT", UniformCategory::Pant));
        catalog.insert(product("p-shoe", "SKU-SHOE", UniformCategory::Shoe));
        catalog.insert(product("p-jacket", "SKU-JACKET", UniformCategory::Jacket));

        let service = Arc::new(OrderService::new(
            employees,
            catalog,
            orders.clone(),
            companies,
        ));

        Fixture { service, orders }
    }
}

mod row_accounting {
    use super::common::*;
    use kitflow::ordering::{BulkOrderBatch, RowStatus};

    #[test]
    fn every_submitted_row_yields_exactly_one_outcome() {
        let fixture = fixture();
        let batch = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![
                row(1, "emp-a", "SKU-SHIRT", 1),
                row(2, "", "SKU-SHIRT", 1),
                row(3, "emp-a", "SKU-GHOST", 1),
                row(4, "emp-b", "SKU-PANT", 0),
                row(5, "ghost", "SKU-SHIRT", 1),
            ],
        };

        let outcome = fixture.service.process_batch(batch);

        assert_eq!(outcome.results.len(), 5);
        let numbers: Vec<u32> = outcome.results.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(outcome.summary.total, 5);
        assert_eq!(
            outcome.summary.successful + outcome.summary.failed,
            outcome.summary.total
        );
        assert_eq!(outcome.summary.successful, 1);
        assert_eq!(outcome.results[0].status, RowStatus::Success);
    }

    #[test]
    fn failures_echo_the_submitted_fields() {
        let fixture = fixture();
        let batch = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![row(7, "emp-a", "SKU-GHOST", 2)],
        };

        let outcome = fixture.service.process_batch(batch);

        let result = &outcome.results[0];
        assert_eq!(result.row_number, 7);
        assert_eq!(result.employee_id, "emp-a");
        assert_eq!(result.sku, "SKU-GHOST");
        assert_eq!(result.quantity, 2);
        assert_eq!(result.error.as_deref(), Some("unknown SKU SKU-GHOST"));
        assert!(result.order_id.is_none());
    }

    #[test]
    fn store_outage_fails_surviving_rows_without_panicking() {
        let fixture = fixture();
        fixture.orders.fail_next_inserts();
        let batch = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![
                row(1, "emp-a", "SKU-SHIRT", 1),
                row(2, "emp-a", "SKU-GHOST", 1),
            ],
        };

        let outcome = fixture.service.process_batch(batch);

        assert_eq!(outcome.summary.successful, 0);
        assert_eq!(outcome.summary.failed, 2);
        let commit_failure = outcome
            .results
            .iter()
            .find(|result| result.row_number == 1)
            .expect("outcome present");
        assert!(commit_failure
            .error
            .as_deref()
            .expect("error recorded")
            .contains("could not be committed"));
    }
}

mod eligibility_enforcement {
    use super::common::*;
    use kitflow::ordering::{BulkOrderBatch, EmployeeId, RowStatus};

    #[test]
    fn aggregate_category_demand_over_allowance_fails_every_row_in_category() {
        let fixture = fixture();
        // emp-a has a shirt allowance of 4; 3 + 2 = 5 exceeds it, so the
        // whole category fails rather than silently committing a partial
        // quantity.
        let batch = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![
                row(1, "emp-a", "SKU-SHIRT", 3),
                row(2, "emp-a", "SKU-SHIRT", 2),
            ],
        };

        let outcome = fixture.service.process_batch(batch);

        assert_eq!(outcome.summary.successful, 0);
        assert_eq!(outcome.summary.failed, 2);
        for result in &outcome.results {
            let message = result.error.as_deref().expect("error recorded");
            assert!(message.contains("requested 5 shirt(s)"), "got: {message}");
        }
        assert!(fixture.orders.stored().is_empty());
    }

    #[test]
    fn demand_within_allowance_commits_one_order_with_all_lines() {
        let fixture = fixture();
        let batch = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![
                row(1, "emp-a", "SKU-SHIRT", 2),
                row(2, "emp-a", "SKU-SHIRT", 1),
            ],
        };

        let outcome = fixture.service.process_batch(batch);

        assert_eq!(outcome.summary.successful, 2);
        let first = outcome.results[0].order_id.clone().expect("committed");
        let second = outcome.results[1].order_id.clone().expect("committed");
        assert_eq!(first, second);

        let stored = fixture.orders.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].items.len(), 2);
        assert_eq!(stored[0].total, 3 * 2000);
    }

    #[test]
    fn over_budget_category_does_not_drag_down_other_categories() {
        let fixture = fixture();
        // Jackets blow the budget, shirts stay within it.
        let batch = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![
                row(1, "emp-a", "SKU-SHIRT", 2),
                row(2, "emp-a", "SKU-JACKET", 3),
            ],
        };

        let outcome = fixture.service.process_batch(batch);

        assert_eq!(outcome.summary.successful, 1);
        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(outcome.results[0].status, RowStatus::Success);
        assert_eq!(outcome.results[1].status, RowStatus::Failed);

        let stored = fixture.orders.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].items.len(), 1);
    }

    #[test]
    fn quantity_beyond_u32_fails_instead_of_truncating() {
        let fixture = fixture();
        // 2^32 + 1 would truncate to 1 under a lossy cast and slip under the
        // shirt allowance of 4.
        let batch = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![row(1, "emp-a", "SKU-SHIRT", (u32::MAX as i64) + 2)],
        };

        let outcome = fixture.service.process_batch(batch);

        assert_eq!(outcome.summary.successful, 0);
        assert_eq!(outcome.summary.failed, 1);
        let message = outcome.results[0].error.as_deref().expect("error recorded");
        assert!(message.contains("outside the supported range"), "got: {message}");
        assert!(fixture.orders.stored().is_empty());
    }

    #[test]
    fn committed_batches_count_against_later_submissions() {
        let fixture = fixture();
        let first = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![row(1, "emp-b", "SKU-SHIRT", 2)],
        };
        assert_eq!(fixture.service.process_batch(first).summary.successful, 1);

        let consumed = fixture
            .service
            .consumed_eligibility(&EmployeeId("emp-b".to_string()))
            .expect("ledger readable");
        assert_eq!(consumed.shirt, 2);
        // Reading the ledger must not consume anything.
        let again = fixture
            .service
            .consumed_eligibility(&EmployeeId("emp-b".to_string()))
            .expect("ledger readable");
        assert_eq!(again, consumed);

        let second = BulkOrderBatch {
            company_id: company_id(),
            rows: vec![row(1, "emp-b", "SKU-SHIRT", 1)],
        };
        let outcome = fixture.service.process_batch(second);
        assert_eq!(outcome.summary.successful, 0);
        let message = outcome.results[0].error.as_deref().expect("error recorded");
        assert!(message.contains("only 0 remain"), "got: {message}");
    }
}

mod tenancy {
    use super::common::*;
    use kitflow::ordering::{BulkOrderBatch, CompanyId};

    #[test]
    fn employee_of_another_company_fails_without_affecting_others() {
        let fixture = fixture();
        let batch = BulkOrderBatch {
            company_id: CompanyId("rival-corp".to_string()),
            rows: vec![
                row(1, "emp-a", "SKU-SHIRT", 1),
                row(2, "emp-b", "SKU-PANT", 1),
            ],
        };

        let outcome = fixture.service.process_batch(batch);

        assert_eq!(outcome.summary.successful, 0);
        for result in &outcome.results {
            let message = result.error.as_deref().expect("error recorded");
            assert!(message.contains("belongs to company"), "got: {message}");
        }
        assert!(fixture.orders.stored().is_empty());
    }
}

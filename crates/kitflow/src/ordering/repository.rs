use super::domain::{
    Company, CompanyId, Employee, EmployeeId, Order, OrderId, OrderStatus, Product, ProductId, Sku,
};

/// Error enumeration for storage failures. The core only ever needs
/// identifier-keyed lookups and insertion.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of employees by their stable identifier.
pub trait EmployeeDirectory: Send + Sync {
    fn find(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError>;
}

/// Catalog lookups by SKU and by product id.
pub trait ProductCatalog: Send + Sync {
    fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError>;
    fn find(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
}

/// Order history storage. `for_employee` returning an empty list is how
/// "no history" and "unknown employee" both look to the eligibility ledger.
pub trait OrderStore: Send + Sync {
    fn insert(&self, order: Order) -> Result<Order, RepositoryError>;
    fn fetch(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;
    fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), RepositoryError>;
    fn for_employee(&self, id: &EmployeeId) -> Result<Vec<Order>, RepositoryError>;
}

/// Lookup of companies and their admin rosters.
pub trait CompanyDirectory: Send + Sync {
    fn find(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;
}

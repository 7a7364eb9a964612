//! Uniform ordering core: eligibility accounting, bulk intake, and the
//! order lifecycle.
//!
//! The modules here are wired together by [`OrderService`], which owns the
//! repository handles and enforces the per-employee eligibility budget on
//! both the single-order and bulk paths.

pub mod authorization;
pub mod batch;
pub mod domain;
pub mod eligibility;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

pub use authorization::AdminGate;
pub use batch::{
    group_by_employee, over_budget_categories, rows_from_path, rows_from_reader, BulkOrderBatch,
    BulkOutcome, BulkSummary, CsvBatchError, ProposedRow, RawOrderRow, RowError, RowIntake,
    RowOutcome, RowStatus,
};
pub use domain::{
    CategoryCounts, Company, CompanyAdmin, CompanyId, DispatchPreference, Employee, EmployeeId,
    Order, OrderId, OrderItem, OrderStatus, Product, ProductId, Sku, UniformCategory,
};
pub use eligibility::EligibilityLedger;
pub use lifecycle::{successor, validate_transition, IllegalTransition};
pub use repository::{
    CompanyDirectory, EmployeeDirectory, OrderStore, ProductCatalog, RepositoryError,
};
pub use router::{order_router, OrderAction};
pub use service::{OrderService, OrderServiceError, OrderSubmission, SubmittedItem};

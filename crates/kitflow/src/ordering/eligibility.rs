use std::sync::Arc;

use super::domain::{CategoryCounts, EmployeeId};
use super::repository::{OrderStore, RepositoryError};

/// Derives per-category consumption from order history instead of keeping a
/// persisted counter, so there is never a second source of truth to drift.
///
/// Consumption counts every order regardless of status. Callers compute
/// `remaining = allowance - consumed` themselves and must treat a negative
/// remainder as "already over" rather than clamping it.
pub struct EligibilityLedger<O> {
    orders: Arc<O>,
}

impl<O> EligibilityLedger<O>
where
    O: OrderStore,
{
    pub fn new(orders: Arc<O>) -> Self {
        Self { orders }
    }

    /// Sum item quantities per tracked category across all of the employee's
    /// orders. Unknown employees and empty histories both yield all zeroes;
    /// callers treat the two identically.
    pub fn consumed(&self, employee_id: &EmployeeId) -> Result<CategoryCounts, RepositoryError> {
        let mut consumed = CategoryCounts::default();

        for order in self.orders.for_employee(employee_id)? {
            for item in &order.items {
                consumed.add(item.category, item.quantity);
            }
        }

        Ok(consumed)
    }
}

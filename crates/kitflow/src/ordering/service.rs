use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;
use serde::Deserialize;

use super::authorization::AdminGate;
use super::batch::{
    group_by_employee, over_budget_categories, BulkOrderBatch, BulkOutcome, CandidateItem,
    ProposedRow, RowError, RowOutcome,
};
use super::domain::{
    CategoryCounts, CompanyId, DispatchPreference, Employee, EmployeeId, Order, OrderId, OrderItem,
    OrderStatus, ProductId, Sku,
};
use super::eligibility::EligibilityLedger;
use super::lifecycle::{self, IllegalTransition};
use super::repository::{
    CompanyDirectory, EmployeeDirectory, OrderStore, ProductCatalog, RepositoryError,
};

/// Single order submission payload. Name and price are caller-provided
/// snapshots; category and company linkage are resolved from the catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub employee_id: EmployeeId,
    pub items: Vec<SubmittedItem>,
    pub delivery_address: String,
    #[serde(rename = "estimatedDeliveryTime")]
    pub estimated_delivery: String,
    #[serde(default)]
    pub dispatch_location: DispatchPreference,
}

#[derive(Debug, Deserialize)]
pub struct SubmittedItem {
    #[serde(rename = "uniformId")]
    pub product_id: ProductId,
    #[serde(rename = "uniformName")]
    pub product_name: String,
    pub size: String,
    pub quantity: u32,
    pub price: u32,
}

/// Error raised by the order service for single submissions and lifecycle
/// actions. Bulk batches never surface these; their failures are folded into
/// per-row outcomes instead.
#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    #[error("employee {0} not found")]
    EmployeeNotFound(String),
    #[error("order {0} not found")]
    OrderNotFound(String),
    #[error("invalid order item: {0}")]
    Item(RowError),
    #[error("{admin} may not approve orders for company {company}")]
    ApprovalDenied { admin: String, company: String },
    #[error(transparent)]
    Transition(#[from] IllegalTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

static ORDER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_order_id() -> OrderId {
    let id = ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OrderId(format!("ord-{id:06}"))
}

/// Service composing the directories, catalog, order store, eligibility
/// ledger, and admin gate. Both submission paths share the ledger and a
/// per-employee commit lock, so an eligibility read and the order insert it
/// authorizes always happen atomically with respect to that employee.
pub struct OrderService<E, P, O, C> {
    employees: Arc<E>,
    catalog: Arc<P>,
    orders: Arc<O>,
    ledger: EligibilityLedger<O>,
    gate: AdminGate<C>,
    commit_locks: Mutex<HashMap<EmployeeId, Arc<Mutex<()>>>>,
}

impl<E, P, O, C> OrderService<E, P, O, C>
where
    E: EmployeeDirectory + 'static,
    P: ProductCatalog + 'static,
    O: OrderStore + 'static,
    C: CompanyDirectory + 'static,
{
    pub fn new(employees: Arc<E>, catalog: Arc<P>, orders: Arc<O>, companies: Arc<C>) -> Self {
        let ledger = EligibilityLedger::new(orders.clone());
        let gate = AdminGate::new(companies);

        Self {
            employees,
            catalog,
            orders,
            ledger,
            gate,
            commit_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Submit a single order. All items must validate and fit the remaining
    /// eligibility; unlike a bulk batch there is no partial fulfillment.
    pub fn submit_order(&self, submission: OrderSubmission) -> Result<Order, OrderServiceError> {
        let employee = self
            .employees
            .find(&submission.employee_id)?
            .ok_or_else(|| OrderServiceError::EmployeeNotFound(submission.employee_id.0.clone()))?;

        let mut items = Vec::with_capacity(submission.items.len());
        for submitted in &submission.items {
            items.push(self.resolve_submitted_item(submitted, &employee.company_id)?);
        }

        let lock = self.employee_lock(&employee.id);
        let _commit = lock.lock().expect("employee commit lock poisoned");

        let consumed = self.ledger.consumed(&employee.id)?;
        if let Some((_, error)) =
            over_budget_categories(items.iter(), &employee.eligibility, &consumed)
                .into_iter()
                .next()
        {
            return Err(OrderServiceError::Item(error));
        }

        let total = Order::compute_total(&items);
        let order = Order {
            id: next_order_id(),
            employee_id: employee.id.clone(),
            company_id: employee.company_id.clone(),
            items,
            total,
            status: OrderStatus::AwaitingApproval,
            order_date: Local::now().date_naive(),
            dispatch_location: submission.dispatch_location,
            delivery_address: submission.delivery_address,
            estimated_delivery: submission.estimated_delivery,
        };

        Ok(self.orders.insert(order)?)
    }

    /// Process a bulk batch. Infallible by design: every failure, expected
    /// or not, is folded into the per-row outcomes and the batch runs to
    /// completion.
    pub fn process_batch(&self, batch: BulkOrderBatch) -> BulkOutcome {
        let BulkOrderBatch { company_id, rows } = batch;
        let (groups, mut outcomes) = group_by_employee(rows);

        for (employee_key, group) in groups {
            let employee_id = EmployeeId(employee_key);
            match self.process_employee_group(&company_id, &employee_id, &group) {
                Ok(mut group_outcomes) => outcomes.append(&mut group_outcomes),
                Err(error) => {
                    // Hard group-level failure: every row in this employee's
                    // group fails, other employees are unaffected.
                    let reason = RowError::Unexpected(error.to_string());
                    outcomes.extend(group.iter().map(|row| RowOutcome::failed(row, &reason)));
                }
            }
        }

        BulkOutcome::seal(outcomes)
    }

    pub fn approve(&self, order_id: &OrderId, admin_email: &str) -> Result<Order, OrderServiceError> {
        let order = self
            .orders
            .fetch(order_id)?
            .ok_or_else(|| OrderServiceError::OrderNotFound(order_id.0.clone()))?;

        if !self.gate.can_approve_orders(admin_email, &order.company_id)? {
            return Err(OrderServiceError::ApprovalDenied {
                admin: admin_email.to_string(),
                company: order.company_id.0.clone(),
            });
        }

        self.transition(order, OrderStatus::AwaitingFulfilment)
    }

    /// Vendor fulfillment actions. The transition table is enforced here, not
    /// in the caller's UI.
    pub fn update_status(
        &self,
        order_id: &OrderId,
        target: OrderStatus,
    ) -> Result<Order, OrderServiceError> {
        let order = self
            .orders
            .fetch(order_id)?
            .ok_or_else(|| OrderServiceError::OrderNotFound(order_id.0.clone()))?;

        self.transition(order, target)
    }

    pub fn consumed_eligibility(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<CategoryCounts, OrderServiceError> {
        Ok(self.ledger.consumed(employee_id)?)
    }

    pub fn is_company_admin(
        &self,
        admin_email: &str,
        company_id: &CompanyId,
    ) -> Result<bool, OrderServiceError> {
        Ok(self.gate.is_company_admin(admin_email, company_id)?)
    }

    fn transition(&self, order: Order, target: OrderStatus) -> Result<Order, OrderServiceError> {
        lifecycle::validate_transition(order.status, target)?;
        self.orders.update_status(&order.id, target)?;

        Ok(Order {
            status: target,
            ..order
        })
    }

    fn process_employee_group(
        &self,
        company_id: &CompanyId,
        employee_id: &EmployeeId,
        group: &[ProposedRow],
    ) -> Result<Vec<RowOutcome>, RepositoryError> {
        let Some(employee) = self.employees.find(employee_id)? else {
            let reason = RowError::EmployeeNotFound(employee_id.0.clone());
            return Ok(group
                .iter()
                .map(|row| RowOutcome::failed(row, &reason))
                .collect());
        };

        if &employee.company_id != company_id {
            let reason = RowError::CompanyMismatch {
                employee: employee_id.0.clone(),
                actual: employee.company_id.0.clone(),
                expected: company_id.0.clone(),
            };
            return Ok(group
                .iter()
                .map(|row| RowOutcome::failed(row, &reason))
                .collect());
        }

        let mut outcomes = Vec::with_capacity(group.len());
        let mut candidates = Vec::new();
        for row in group {
            match self.validate_row(row, company_id)? {
                Ok(item) => candidates.push(CandidateItem {
                    row: row.clone(),
                    item,
                }),
                Err(reason) => outcomes.push(RowOutcome::failed(row, &reason)),
            }
        }

        let lock = self.employee_lock(employee_id);
        let _commit = lock.lock().expect("employee commit lock poisoned");

        let consumed = self.ledger.consumed(employee_id)?;
        let over = over_budget_categories(
            candidates.iter().map(|candidate| &candidate.item),
            &employee.eligibility,
            &consumed,
        );

        let mut survivors = Vec::new();
        for candidate in candidates {
            match over
                .iter()
                .find(|(category, _)| *category == candidate.item.category)
            {
                Some((_, reason)) => outcomes.push(RowOutcome::failed(&candidate.row, reason)),
                None => survivors.push(candidate),
            }
        }

        if !survivors.is_empty() {
            outcomes.append(&mut self.commit_group(&employee, survivors));
        }

        Ok(outcomes)
    }

    /// Resolve a submitted single-order item against the catalog. Name and
    /// price stay as the caller's snapshot; category and linkage come from
    /// the catalog record.
    fn resolve_submitted_item(
        &self,
        submitted: &SubmittedItem,
        company_id: &CompanyId,
    ) -> Result<OrderItem, OrderServiceError> {
        let Some(product) = self.catalog.find(&submitted.product_id)? else {
            return Err(OrderServiceError::Item(RowError::UnknownProduct(
                submitted.product_id.0.clone(),
            )));
        };

        if !product.available_to(company_id) {
            return Err(OrderServiceError::Item(RowError::ProductNotLinked {
                sku: product.sku.0.clone(),
                company: company_id.0.clone(),
            }));
        }

        if !product.offers_size(&submitted.size) {
            let valid = product.sizes.iter().cloned().collect::<Vec<_>>().join(", ");
            return Err(OrderServiceError::Item(RowError::InvalidSize {
                sku: product.sku.0.clone(),
                size: submitted.size.clone(),
                valid,
            }));
        }

        if submitted.quantity == 0 {
            return Err(OrderServiceError::Item(RowError::NonPositiveQuantity(0)));
        }

        Ok(OrderItem {
            product_id: submitted.product_id.clone(),
            product_name: submitted.product_name.clone(),
            category: product.category,
            size: submitted.size.clone(),
            quantity: submitted.quantity,
            unit_price: submitted.price,
        })
    }

    /// Catalog validation for one row. Outer `Err` is a storage failure that
    /// fails the whole group; inner `Err` fails just this row.
    fn validate_row(
        &self,
        row: &ProposedRow,
        company_id: &CompanyId,
    ) -> Result<Result<OrderItem, RowError>, RepositoryError> {
        let sku = Sku(row.sku.clone());
        let Some(product) = self.catalog.find_by_sku(&sku)? else {
            return Ok(Err(RowError::UnknownSku(row.sku.clone())));
        };

        if !product.available_to(company_id) {
            return Ok(Err(RowError::ProductNotLinked {
                sku: row.sku.clone(),
                company: company_id.0.clone(),
            }));
        }

        if !product.offers_size(&row.size) {
            let valid = product.sizes.iter().cloned().collect::<Vec<_>>().join(", ");
            return Ok(Err(RowError::InvalidSize {
                sku: row.sku.clone(),
                size: row.size.clone(),
                valid,
            }));
        }

        if row.quantity <= 0 {
            return Ok(Err(RowError::NonPositiveQuantity(row.quantity)));
        }
        // A lossy cast here would let an oversized request pass the
        // eligibility check at its truncated value.
        let Ok(quantity) = u32::try_from(row.quantity) else {
            return Ok(Err(RowError::QuantityOutOfRange(row.quantity)));
        };

        Ok(Ok(OrderItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            category: product.category,
            size: row.size.clone(),
            quantity,
            unit_price: product.price,
        }))
    }

    /// Commit one order per employee per batch. An insert failure fails every
    /// surviving row with the underlying message; there is no per-line retry.
    fn commit_group(&self, employee: &Employee, survivors: Vec<CandidateItem>) -> Vec<RowOutcome> {
        let items: Vec<OrderItem> = survivors
            .iter()
            .map(|candidate| candidate.item.clone())
            .collect();
        let total = Order::compute_total(&items);

        let order = Order {
            id: next_order_id(),
            employee_id: employee.id.clone(),
            company_id: employee.company_id.clone(),
            items,
            total,
            status: OrderStatus::AwaitingApproval,
            order_date: Local::now().date_naive(),
            dispatch_location: employee.dispatch_preference,
            delivery_address: employee.delivery_address.clone(),
            estimated_delivery: employee
                .dispatch_preference
                .estimated_delivery()
                .to_string(),
        };

        match self.orders.insert(order) {
            Ok(stored) => survivors
                .iter()
                .map(|candidate| RowOutcome::success(&candidate.row, stored.id.clone()))
                .collect(),
            Err(error) => {
                let reason = RowError::Commit(error.to_string());
                survivors
                    .iter()
                    .map(|candidate| RowOutcome::failed(&candidate.row, &reason))
                    .collect()
            }
        }
    }

    fn employee_lock(&self, employee_id: &EmployeeId) -> Arc<Mutex<()>> {
        let mut registry = self.commit_locks.lock().expect("lock registry poisoned");
        // A strong count of 1 means only the registry holds the lock, so
        // nobody is committing for that employee right now.
        registry.retain(|_, lock| Arc::strong_count(lock) > 1);
        registry.entry(employee_id.clone()).or_default().clone()
    }
}

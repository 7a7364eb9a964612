//! Bulk order ingestion: many proposed rows in, exactly one outcome per row
//! out, with partial success across employees and categories.

pub mod csv;
mod row;

pub use csv::{rows_from_path, rows_from_reader, CsvBatchError};
pub use row::{ProposedRow, RawOrderRow, RowIntake};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{CategoryCounts, CompanyId, OrderId, OrderItem, UniformCategory};

/// A bulk submission: the target company plus the proposed rows.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOrderBatch {
    pub company_id: CompanyId,
    #[serde(rename = "orders")]
    pub rows: Vec<RawOrderRow>,
}

/// Why a row failed. Reported per row; no variant ever aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("employee id is missing")]
    MissingEmployeeId,
    #[error("employee {0} not found")]
    EmployeeNotFound(String),
    #[error("employee {employee} belongs to company {actual}, not {expected}")]
    CompanyMismatch {
        employee: String,
        actual: String,
        expected: String,
    },
    #[error("unknown SKU {0}")]
    UnknownSku(String),
    #[error("unknown product {0}")]
    UnknownProduct(String),
    #[error("product {sku} is not available to company {company}")]
    ProductNotLinked { sku: String, company: String },
    #[error("size '{size}' is not offered for {sku} (valid: {valid})")]
    InvalidSize {
        sku: String,
        size: String,
        valid: String,
    },
    #[error("quantity must be a positive whole number, got {0}")]
    NonPositiveQuantity(i64),
    #[error("quantity {0} is outside the supported range")]
    QuantityOutOfRange(i64),
    #[error(
        "requested {requested} {category}(s) but only {remaining} remain \
         (allowance {allowance}, already consumed {consumed})"
    )]
    EligibilityExceeded {
        category: UniformCategory,
        requested: u32,
        remaining: i64,
        allowance: u32,
        consumed: u32,
    },
    #[error("order could not be committed: {0}")]
    Commit(String),
    #[error("{0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Success,
    Failed,
}

/// One outcome per submitted row, echoing the submitted fields for
/// reconciliation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    pub row_number: u32,
    pub employee_id: String,
    pub sku: String,
    pub size: String,
    pub quantity: i64,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RowOutcome {
    pub fn success(row: &ProposedRow, order_id: OrderId) -> Self {
        Self {
            row_number: row.row_number,
            employee_id: row.employee_id.clone(),
            sku: row.sku.clone(),
            size: row.size.clone(),
            quantity: row.quantity,
            status: RowStatus::Success,
            order_id: Some(order_id),
            error: None,
        }
    }

    pub fn failed(row: &ProposedRow, error: &RowError) -> Self {
        Self {
            row_number: row.row_number,
            employee_id: row.employee_id.clone(),
            sku: row.sku.clone(),
            size: row.size.clone(),
            quantity: row.quantity,
            status: RowStatus::Failed,
            order_id: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BulkSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// The full result of a batch: every submitted row exactly once, sorted by
/// row number, plus the summary counts.
#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub results: Vec<RowOutcome>,
    pub summary: BulkSummary,
}

impl BulkOutcome {
    /// Seal a set of per-row outcomes: sort by row number and tally.
    pub fn seal(mut results: Vec<RowOutcome>) -> Self {
        results.sort_by_key(|outcome| outcome.row_number);
        let successful = results
            .iter()
            .filter(|outcome| outcome.status == RowStatus::Success)
            .count();
        let summary = BulkSummary {
            total: results.len(),
            successful,
            failed: results.len() - successful,
        };

        Self { results, summary }
    }
}

/// A row that passed catalog validation: the order line it would become,
/// still tied back to its source row.
#[derive(Debug)]
pub struct CandidateItem {
    pub row: ProposedRow,
    pub item: OrderItem,
}

/// Structural validation and grouping: rejected rows become outcomes
/// immediately, survivors are partitioned by employee so eligibility is
/// checked once per employee per batch.
pub fn group_by_employee(
    rows: Vec<RawOrderRow>,
) -> (BTreeMap<String, Vec<ProposedRow>>, Vec<RowOutcome>) {
    let mut groups: BTreeMap<String, Vec<ProposedRow>> = BTreeMap::new();
    let mut rejected = Vec::new();

    for raw in rows {
        match raw.normalize() {
            RowIntake::Proposed(row) => {
                groups.entry(row.employee_id.clone()).or_default().push(row);
            }
            RowIntake::Rejected { row, reason } => {
                rejected.push(RowOutcome::failed(&row, &reason));
            }
        }
    }

    (groups, rejected)
}

/// Compare a submission's per-category request against what remains of the
/// allowance. Returns an error per over-budget category; accessories are
/// never entitlement-tracked and are skipped.
pub fn over_budget_categories<'a, I>(
    items: I,
    allowance: &CategoryCounts,
    consumed: &CategoryCounts,
) -> Vec<(UniformCategory, RowError)>
where
    I: IntoIterator<Item = &'a OrderItem>,
{
    let mut requested = CategoryCounts::default();
    for item in items {
        requested.add(item.category, item.quantity);
    }

    UniformCategory::TRACKED
        .into_iter()
        .filter_map(|category| {
            let asked = requested.get(category).unwrap_or(0);
            if asked == 0 {
                return None;
            }

            let total = allowance.get(category).unwrap_or(0);
            let used = consumed.get(category).unwrap_or(0);
            // Remaining can go negative when history already exceeds the
            // allowance; never clamp it.
            let remaining = i64::from(total) - i64::from(used);

            (i64::from(asked) > remaining).then(|| {
                (
                    category,
                    RowError::EligibilityExceeded {
                        category,
                        requested: asked,
                        remaining,
                        allowance: total,
                        consumed: used,
                    },
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::domain::ProductId;

    fn raw(row_number: u32, employee_id: &str, sku: &str, quantity: i64) -> RawOrderRow {
        RawOrderRow {
            employee_id: employee_id.to_string(),
            sku: sku.to_string(),
            size: "M".to_string(),
            quantity,
            row_number,
        }
    }

    fn candidate(category: UniformCategory, quantity: u32, row_number: u32) -> CandidateItem {
        CandidateItem {
            row: ProposedRow {
                row_number,
                employee_id: "emp-1".to_string(),
                sku: "SKU".to_string(),
                size: "M".to_string(),
                quantity: i64::from(quantity),
            },
            item: OrderItem {
                product_id: ProductId("p-1".to_string()),
                product_name: "item".to_string(),
                category,
                size: "M".to_string(),
                quantity,
                unit_price: 1000,
            },
        }
    }

    #[test]
    fn grouping_partitions_by_employee_and_rejects_blank_ids() {
        let rows = vec![
            raw(1, "emp-1", "SKU-SHIRT", 1),
            raw(2, "", "SKU-PANT", 1),
            raw(3, "emp-2", "SKU-SHOE", 2),
            raw(4, "emp-1", "SKU-PANT", 1),
        ];

        let (groups, rejected) = group_by_employee(rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["emp-1"].len(), 2);
        assert_eq!(groups["emp-2"].len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].row_number, 2);
        assert_eq!(rejected[0].status, RowStatus::Failed);
    }

    #[test]
    fn over_budget_reports_requested_remaining_allowance_consumed() {
        let allowance = CategoryCounts {
            shirt: 4,
            ..CategoryCounts::default()
        };
        let consumed = CategoryCounts {
            shirt: 1,
            ..CategoryCounts::default()
        };
        let candidates = vec![
            candidate(UniformCategory::Shirt, 3, 1),
            candidate(UniformCategory::Shirt, 2, 2),
        ];

        let over = over_budget_categories(candidates.iter().map(|c| &c.item), &allowance, &consumed);

        assert_eq!(over.len(), 1);
        let (category, error) = &over[0];
        assert_eq!(*category, UniformCategory::Shirt);
        match error {
            RowError::EligibilityExceeded {
                requested,
                remaining,
                allowance,
                consumed,
                ..
            } => {
                assert_eq!(*requested, 5);
                assert_eq!(*remaining, 3);
                assert_eq!(*allowance, 4);
                assert_eq!(*consumed, 1);
            }
            other => panic!("expected eligibility error, got {other}"),
        }
    }

    #[test]
    fn within_budget_categories_are_unaffected_by_over_budget_ones() {
        let allowance = CategoryCounts {
            shirt: 4,
            jacket: 1,
            ..CategoryCounts::default()
        };
        let candidates = vec![
            candidate(UniformCategory::Shirt, 2, 1),
            candidate(UniformCategory::Jacket, 5, 2),
        ];

        let over = over_budget_categories(candidates.iter().map(|c| &c.item), &allowance, &CategoryCounts::default());

        assert_eq!(over.len(), 1);
        assert_eq!(over[0].0, UniformCategory::Jacket);
    }

    #[test]
    fn negative_remaining_counts_as_over() {
        let allowance = CategoryCounts {
            pant: 2,
            ..CategoryCounts::default()
        };
        let consumed = CategoryCounts {
            pant: 3,
            ..CategoryCounts::default()
        };
        let candidates = vec![candidate(UniformCategory::Pant, 1, 1)];

        let over = over_budget_categories(candidates.iter().map(|c| &c.item), &allowance, &consumed);

        assert_eq!(over.len(), 1);
        match &over[0].1 {
            RowError::EligibilityExceeded { remaining, .. } => assert_eq!(*remaining, -1),
            other => panic!("expected eligibility error, got {other}"),
        }
    }

    #[test]
    fn accessories_never_trip_the_budget() {
        let candidates = vec![candidate(UniformCategory::Accessory, 99, 1)];

        let over =
            over_budget_categories(candidates.iter().map(|c| &c.item), &CategoryCounts::default(), &CategoryCounts::default());

        assert!(over.is_empty());
    }

    #[test]
    fn seal_sorts_by_row_number_and_tallies() {
        let rows: Vec<ProposedRow> = [3, 1, 2]
            .iter()
            .map(|n| ProposedRow {
                row_number: *n,
                employee_id: "emp-1".to_string(),
                sku: "SKU".to_string(),
                size: "M".to_string(),
                quantity: 1,
            })
            .collect();
        let outcomes = vec![
            RowOutcome::success(&rows[0], OrderId("ord-000001".to_string())),
            RowOutcome::failed(&rows[1], &RowError::UnknownSku("SKU".to_string())),
            RowOutcome::success(&rows[2], OrderId("ord-000001".to_string())),
        ];

        let sealed = BulkOutcome::seal(outcomes);

        let order: Vec<u32> = sealed.results.iter().map(|o| o.row_number).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(sealed.summary.total, 3);
        assert_eq!(sealed.summary.successful, 2);
        assert_eq!(sealed.summary.failed, 1);
    }
}

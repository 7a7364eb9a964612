use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::RowError;

/// One proposed order line exactly as submitted. Quantity arrives loosely
/// typed (number, numeric string, blank, or absent) and is coerced during
/// deserialization; everything else is normalized in [`RawOrderRow::normalize`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderRow {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub size: String,
    #[serde(default, deserialize_with = "loose_quantity")]
    pub quantity: i64,
    pub row_number: u32,
}

/// A row that survived structural validation, with trimmed fields.
#[derive(Debug, Clone)]
pub struct ProposedRow {
    pub row_number: u32,
    pub employee_id: String,
    pub sku: String,
    pub size: String,
    pub quantity: i64,
}

/// Outcome of the parse-and-normalize step: either a candidate for grouping
/// or a structured rejection that still carries the original fields so the
/// caller can reconcile input to outcome.
#[derive(Debug)]
pub enum RowIntake {
    Proposed(ProposedRow),
    Rejected { row: ProposedRow, reason: RowError },
}

impl RawOrderRow {
    pub fn normalize(self) -> RowIntake {
        let row = ProposedRow {
            row_number: self.row_number,
            employee_id: self.employee_id.trim().to_string(),
            sku: self.sku.trim().to_string(),
            size: self.size.trim().to_string(),
            quantity: self.quantity,
        };

        if row.employee_id.is_empty() {
            return RowIntake::Rejected {
                row,
                reason: RowError::MissingEmployeeId,
            };
        }

        RowIntake::Proposed(row)
    }
}

fn loose_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_quantity(value.as_ref()))
}

/// Non-numeric and missing quantities coerce to zero, which the catalog
/// validation stage then rejects as non-positive.
pub(crate) fn coerce_quantity(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number.as_i64().unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quantity_coerces_numbers_strings_and_garbage() {
        assert_eq!(coerce_quantity(Some(&json!(3))), 3);
        assert_eq!(coerce_quantity(Some(&json!("2"))), 2);
        assert_eq!(coerce_quantity(Some(&json!(" 4 "))), 4);
        assert_eq!(coerce_quantity(Some(&json!("two"))), 0);
        assert_eq!(coerce_quantity(Some(&json!(2.5))), 0);
        assert_eq!(coerce_quantity(Some(&json!(null))), 0);
        assert_eq!(coerce_quantity(None), 0);
    }

    #[test]
    fn row_deserializes_with_loose_quantity_and_missing_fields() {
        let row: RawOrderRow = serde_json::from_value(json!({
            "employeeId": "emp-1",
            "sku": "SKU-SHIRT",
            "quantity": "2",
            "rowNumber": 7
        }))
        .expect("row deserializes");

        assert_eq!(row.quantity, 2);
        assert_eq!(row.size, "");
        assert_eq!(row.row_number, 7);
    }

    #[test]
    fn normalize_trims_fields() {
        let intake = RawOrderRow {
            employee_id: "  emp-1 ".to_string(),
            sku: " SKU-SHIRT ".to_string(),
            size: " M ".to_string(),
            quantity: 1,
            row_number: 1,
        }
        .normalize();

        match intake {
            RowIntake::Proposed(row) => {
                assert_eq!(row.employee_id, "emp-1");
                assert_eq!(row.sku, "SKU-SHIRT");
                assert_eq!(row.size, "M");
            }
            RowIntake::Rejected { reason, .. } => panic!("unexpected rejection: {reason}"),
        }
    }

    #[test]
    fn blank_employee_id_is_rejected_structurally() {
        let intake = RawOrderRow {
            employee_id: "   ".to_string(),
            sku: "SKU-SHIRT".to_string(),
            size: "M".to_string(),
            quantity: 1,
            row_number: 4,
        }
        .normalize();

        match intake {
            RowIntake::Rejected { row, reason } => {
                assert_eq!(row.row_number, 4);
                assert_eq!(row.sku, "SKU-SHIRT");
                assert!(matches!(reason, RowError::MissingEmployeeId));
            }
            RowIntake::Proposed(row) => panic!("expected rejection, got {row:?}"),
        }
    }
}

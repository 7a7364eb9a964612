use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::row::RawOrderRow;

#[derive(Debug, thiserror::Error)]
pub enum CsvBatchError {
    #[error("failed to read batch export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid batch CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse a CSV batch export (`Employee ID,SKU,Size,Quantity` headers) into
/// raw rows. Row numbers are the 1-based data line positions so outcomes can
/// be reconciled against the uploaded file.
pub fn rows_from_reader<R: Read>(reader: R) -> Result<Vec<RawOrderRow>, CsvBatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let line = record?;
        let quantity = line.quantity();
        rows.push(RawOrderRow {
            employee_id: line.employee_id.unwrap_or_default(),
            sku: line.sku.unwrap_or_default(),
            size: line.size.unwrap_or_default(),
            quantity,
            row_number: (index + 1) as u32,
        });
    }

    Ok(rows)
}

pub fn rows_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawOrderRow>, CsvBatchError> {
    let file = std::fs::File::open(path)?;
    rows_from_reader(file)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Employee ID", default, deserialize_with = "empty_string_as_none")]
    employee_id: Option<String>,
    #[serde(rename = "SKU", default, deserialize_with = "empty_string_as_none")]
    sku: Option<String>,
    #[serde(rename = "Size", default, deserialize_with = "empty_string_as_none")]
    size: Option<String>,
    #[serde(rename = "Quantity", default, deserialize_with = "empty_string_as_none")]
    quantity: Option<String>,
}

impl CsvRow {
    fn quantity(&self) -> i64 {
        self.quantity
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

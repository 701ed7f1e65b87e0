//! CSV batch import
//!
//! Turns an uploaded CSV document (header row + records) into registry
//! payloads: one JSON object per row, every cell a string. Empty cells are
//! left out so optional entry fields fall back to their defaults.

use serde_json::{Map, Value};

use crate::registry::RegistryError;

pub fn parse_csv_records(content: &[u8]) -> Result<Vec<Value>, RegistryError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(content);

    let headers = rdr
        .headers()
        .map_err(|e| RegistryError::Csv(format!("CSV header error: {}", e)))?
        .clone();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(RegistryError::Csv("CSV header row is empty".to_string()));
    }

    let mut records = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| RegistryError::Csv(format!("CSV parse error: {}", e)))?;

        let fields: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(name, cell)| !name.is_empty() && !cell.is_empty())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();

        records.push(Value::Object(fields));
    }

    Ok(records)
}

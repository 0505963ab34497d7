//! CSV loading shared by the store constructors

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read every record of a CSV file into typed rows
///
/// Any open or parse failure aborts the load; post-load query code never
/// sees a malformed row.
pub(crate) fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| StoreError::Load {
            path: path.display().to_string(),
            source,
        })?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|source| StoreError::Load {
            path: path.display().to_string(),
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

use crate::core::error::PlateError;
use crate::core::model::CompoundTable;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One line of a `Well,Area` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellAreaRow {
    #[serde(rename = "Well")]
    pub well: String,
    #[serde(rename = "Area")]
    pub area: f64,
}

pub fn write_table(path: &Path, table: &CompoundTable) -> Result<(), PlateError> {
    let mut w = csv::Writer::from_path(path)?;
    // Header is written even for an empty table.
    w.write_record(["Well", "Area"])?;
    for r in &table.rows {
        w.write_record([r.well.to_string(), r.area.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_table(path: &Path) -> Result<Vec<WellAreaRow>, PlateError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

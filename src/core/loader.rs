use crate::core::error::PlateError;
use crate::core::io;
use crate::core::model::WellRecord;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

pub const COL_SAMPLE: &str = "Sample Name";
pub const COL_COMPONENT: &str = "Component Name";
pub const COL_AREA: &str = "Area";

// Tokens read as missing values by common table tooling.
const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadSummary {
    pub kept: usize,
    pub dropped: usize,
}

#[derive(Debug)]
pub struct LoadedReport {
    pub records: Vec<WellRecord>,
    pub summary: LoadSummary,
}

pub fn load_report(path: &Path) -> Result<LoadedReport> {
    let reader = io::open_report(path)?;
    let loaded =
        read_records(reader).with_context(|| format!("failed to read {}", path.display()))?;
    if loaded.summary.dropped > 0 {
        log::warn!(
            "{}: dropped {} incomplete row(s), kept {}",
            path.display(),
            loaded.summary.dropped,
            loaded.summary.kept
        );
    }
    Ok(loaded)
}

/// Reads a tab-separated instrument report. Rows with a missing sample,
/// component or area are dropped; the sample name is cut at the first `-`.
pub fn read_records<R: Read>(reader: R) -> Result<LoadedReport, PlateError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.byte_headers()?.clone();
    let find = |name: &'static str| {
        headers
            .iter()
            .position(|h| String::from_utf8_lossy(h).trim() == name)
            .ok_or(PlateError::MissingColumn(name))
    };
    let i_sample = find(COL_SAMPLE)?;
    let i_component = find(COL_COMPONENT)?;
    let i_area = find(COL_AREA)?;

    let mut records = Vec::new();
    let mut summary = LoadSummary::default();
    for row in csv_reader.byte_records() {
        let row = row?;
        let field = |i: usize| {
            row.get(i)
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .filter(|s| !is_missing(s))
        };
        let parsed = match (field(i_sample), field(i_component), field(i_area)) {
            (Some(sample), Some(compound), Some(area)) => area
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|a| a.is_finite() && *a >= 0.0)
                .map(|area| WellRecord {
                    well: well_from_sample(&sample),
                    compound,
                    area,
                }),
            _ => None,
        };
        match parsed {
            Some(rec) => {
                records.push(rec);
                summary.kept += 1;
            }
            None => summary.dropped += 1,
        }
    }
    Ok(LoadedReport { records, summary })
}

/// `A1-PLATE0042` -> `A1`.
pub fn well_from_sample(sample: &str) -> String {
    sample.split('-').next().unwrap_or("").trim().to_string()
}

fn is_missing(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || MISSING_TOKENS.contains(&t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Sample Name\tSample ID\tComponent Name\tRetention Time\tArea
A1-PLATE01\t1\tCompound X\t0.51\t1520.5
B2-PLATE01\t2\tCompound X\t0.52\t0
C3-PLATE01\t3\tCompound X\t0.50\tN/A
\t4\tCompound X\t0.50\t12
D4-PLATE01\t5\t\t0.50\t12
E5\t6\tInternal Std\t0.61\t88
";

    #[test]
    fn keeps_complete_rows_and_strips_barcode() {
        let loaded = read_records(REPORT.as_bytes()).unwrap();
        assert_eq!(loaded.summary, LoadSummary { kept: 3, dropped: 3 });
        assert_eq!(
            loaded.records[0],
            WellRecord {
                well: "A1".into(),
                compound: "Compound X".into(),
                area: 1520.5
            }
        );
        assert_eq!(loaded.records[1].well, "B2");
        assert_eq!(loaded.records[1].area, 0.0);
        assert_eq!(loaded.records[2].well, "E5");
        assert_eq!(loaded.records[2].compound, "Internal Std");
    }

    #[test]
    fn non_numeric_area_is_dropped() {
        let text = "Sample Name\tComponent Name\tArea\nA1\tX\tabc\nA2\tX\t5\n";
        let loaded = read_records(text.as_bytes()).unwrap();
        assert_eq!(loaded.summary, LoadSummary { kept: 1, dropped: 1 });
        assert_eq!(loaded.records[0].well, "A2");
    }

    #[test]
    fn negative_area_is_dropped() {
        let text = "Sample Name\tComponent Name\tArea\nA1\tX\t-3\nA2\tX\t0\nA3\tX\t4\n";
        let loaded = read_records(text.as_bytes()).unwrap();
        assert_eq!(loaded.summary, LoadSummary { kept: 2, dropped: 1 });
        assert_eq!(loaded.records[0].well, "A2");
        assert_eq!(loaded.records[1].area, 4.0);
    }

    #[test]
    fn short_rows_are_dropped_not_fatal() {
        let text = "Sample Name\tComponent Name\tArea\nA1\tX\n";
        let loaded = read_records(text.as_bytes()).unwrap();
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.summary.dropped, 1);
    }

    #[test]
    fn missing_column_is_reported() {
        let text = "Sample Name\tArea\nA1\t5\n";
        let err = read_records(text.as_bytes()).unwrap_err();
        assert!(matches!(err, PlateError::MissingColumn(COL_COMPONENT)));
    }

    #[test]
    fn sample_split_takes_first_segment() {
        assert_eq!(well_from_sample("P24-ECHO-384"), "P24");
        assert_eq!(well_from_sample("A1"), "A1");
        assert_eq!(well_from_sample("-x"), "");
    }
}

use crate::core::layout::dispense_order;
use crate::core::model::PlateType;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as FmtWrite;
use std::path::Path;

pub const DISPENSE_FILE: &str = "echo384_data.csv";
pub const PLATE_MAP_FILE: &str = "384_well_plate.png";

#[derive(Serialize)]
struct DispenseRow {
    family: &'static str,
    #[serde(rename = "Target_well")]
    target_well: String,
    #[serde(rename = "HIT")]
    hit: &'static str,
}

/// Every 384 well in four-tip dispense order, all marked as hits of family 1.
pub fn write_dispense_list(path: &Path) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for well in dispense_order() {
        w.serialize(DispenseRow {
            family: "1",
            target_well: well.to_string(),
            hit: "TRUE",
        })?;
    }
    w.flush()?;
    Ok(())
}

/// Empty 384-well grid: columns numbered along the top, rows lettered
/// down the left side.
pub fn plate_map_svg() -> Result<String> {
    let plate = PlateType::P384;
    let (w, h) = (1200.0, 800.0);
    let (left, top) = (90.0, 130.0);
    let cell = 40.0;
    let mut out = String::new();
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"Arial, Helvetica, sans-serif\">",
        w, h, w, h
    )?;
    writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#fff\"/>",
        w, h
    )?;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"20\" font-weight=\"bold\" text-anchor=\"middle\">384-well plate</text>",
        left + cell * plate.cols() as f64 / 2.0,
        50.0
    )?;
    for r in 0..plate.rows() {
        for c in 0..plate.cols() {
            writeln!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"#000\"/>",
                left + c as f64 * cell,
                top + r as f64 * cell,
                cell,
                cell
            )?;
        }
    }
    for c in 0..plate.cols() {
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"13\" text-anchor=\"middle\">{}</text>",
            left + (c as f64 + 0.5) * cell,
            top - 10.0,
            c + 1
        )?;
    }
    for r in 0..plate.rows() {
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"13\" text-anchor=\"end\" dominant-baseline=\"central\">{}</text>",
            left - 10.0,
            top + (r as f64 + 0.5) * cell,
            (b'A' + r as u8) as char
        )?;
    }
    writeln!(out, "</svg>")?;
    Ok(out)
}

//! Plate heatmaps: one coloured, annotated cell per well, with a colorbar
//! labelled in both `log10(Area+1)` and raw area.

use crate::core::grid::{PlateGrid, inverse_log_transform};
use crate::report::svg::escape_svg;
use anyhow::Result;
use std::fmt::Write as FmtWrite;

// 16 x 9 inch figure at 100 user units per inch.
const FIG_W: f64 = 1600.0;
const FIG_H: f64 = 900.0;
const LEFT: f64 = 80.0;
const TOP: f64 = 110.0;
const PLOT_W: f64 = 1220.0;
const PLOT_H: f64 = 740.0;
const BAR_GAP: f64 = 30.0;
const BAR_W: f64 = 30.0;

pub const TRANSFORM_LABEL: &str = "log10(Area+1)";

// ColorBrewer YlGnBu, low to high.
const YLGNBU: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xd9),
    (0xed, 0xf8, 0xb1),
    (0xc7, 0xe9, 0xb4),
    (0x7f, 0xcd, 0xbb),
    (0x41, 0xb6, 0xc4),
    (0x1d, 0x91, 0xc0),
    (0x22, 0x5e, 0xa8),
    (0x25, 0x34, 0x94),
    (0x08, 0x1d, 0x58),
];

/// Heatmap title for a table: its base name followed by the transform.
pub fn title_for(base_name: &str) -> String {
    format!("{} {}", base_name, TRANSFORM_LABEL)
}

pub fn heatmap_svg(grid: &PlateGrid, title: &str) -> Result<String> {
    let mut out = String::with_capacity(64 * 1024);
    let rows = grid.rows();
    let cols = grid.cols();
    let cell_w = PLOT_W / cols as f64;
    let cell_h = PLOT_H / rows as f64;
    let (lo, hi) = color_range(grid);

    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"Arial, Helvetica, sans-serif\">",
        FIG_W, FIG_H, FIG_W, FIG_H
    )?;
    writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#fff\"/>",
        FIG_W, FIG_H
    )?;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"22\" font-weight=\"bold\" fill=\"#000\" text-anchor=\"middle\">{}</text>",
        LEFT + PLOT_W / 2.0,
        TOP - 40.0,
        escape_svg(title)
    )?;

    let font = (cell_h * 0.3).clamp(10.0, 18.0);
    for r in 0..rows {
        for c in 0..cols {
            let v = grid.get(r, c);
            let rgb = colormap(normalize(v, lo, hi));
            let x = LEFT + c as f64 * cell_w;
            let y = TOP + r as f64 * cell_h;
            writeln!(
                out,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
                x,
                y,
                cell_w,
                cell_h,
                hex(rgb)
            )?;
            writeln!(
                out,
                "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{:.1}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{:.2}</text>",
                x + cell_w / 2.0,
                y + cell_h / 2.0,
                font,
                annotation_color(rgb),
                v
            )?;
        }
    }

    for r in 0..rows {
        writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"14\" fill=\"#000\" text-anchor=\"end\" dominant-baseline=\"central\">{}</text>",
            LEFT - 8.0,
            TOP + (r as f64 + 0.5) * cell_h,
            (b'A' + r as u8) as char
        )?;
    }
    for c in 0..cols {
        writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"14\" fill=\"#000\" text-anchor=\"middle\">{}</text>",
            LEFT + (c as f64 + 0.5) * cell_w,
            TOP + PLOT_H + 22.0,
            c + 1
        )?;
    }

    draw_colorbar(&mut out, lo, hi)?;
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn draw_colorbar(out: &mut String, lo: f64, hi: f64) -> Result<()> {
    let x = LEFT + PLOT_W + BAR_GAP;
    writeln!(
        out,
        "<defs><linearGradient id=\"cbar\" x1=\"0\" y1=\"1\" x2=\"0\" y2=\"0\">"
    )?;
    for (i, rgb) in YLGNBU.iter().enumerate() {
        writeln!(
            out,
            "<stop offset=\"{:.4}\" stop-color=\"{}\"/>",
            i as f64 / (YLGNBU.len() - 1) as f64,
            hex(*rgb)
        )?;
    }
    writeln!(out, "</linearGradient></defs>")?;
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"url(#cbar)\"/>",
        x, TOP, BAR_W, PLOT_H
    )?;

    for tick in colorbar_ticks(lo, hi) {
        let y = TOP + PLOT_H - normalize(tick, lo, hi) * PLOT_H;
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{:.2}\" x2=\"{}\" y2=\"{:.2}\" stroke=\"#000\" stroke-width=\"1\"/>",
            x + BAR_W,
            y,
            x + BAR_W + 5.0,
            y
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{:.2}\" font-size=\"14\" fill=\"#000\" dominant-baseline=\"central\">{}</text>",
            x + BAR_W + 9.0,
            y,
            escape_svg(&colorbar_label(tick))
        )?;
    }

    let cx = x + BAR_W + 190.0;
    let cy = TOP + PLOT_H / 2.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"#000\" text-anchor=\"middle\" transform=\"rotate(-90 {} {})\">log10 values (original values)</text>",
        cx, cy, cx, cy
    )?;
    Ok(())
}

/// `"2.00 (99)"`: the plotted value and the area it stands for.
pub fn colorbar_label(v: f64) -> String {
    format!("{:.2} ({:.0})", v, inverse_log_transform(v))
}

/// Colour scale limits. A flat plate gets a unit-wide range so every cell
/// maps to the low end.
pub fn color_range(grid: &PlateGrid) -> (f64, f64) {
    let (lo, hi) = grid.range();
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-9 { (lo, lo + 1.0) } else { (lo, hi) }
}

/// Round tick positions inside `[lo, hi]`.
pub fn colorbar_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let (start, step, count) = nice_ticks(lo, hi, 6);
    let eps = step * 1e-6;
    (0..count)
        .map(|i| start + step * i as f64)
        .filter(|v| *v >= lo - eps && *v <= hi + eps)
        .map(|v| if v.abs() < eps { 0.0 } else { v })
        .collect()
}

fn nice_ticks(min: f64, max: f64, ticks: usize) -> (f64, f64, usize) {
    let range = (max - min).abs().max(1e-9);
    let rough = range / (ticks as f64 - 1.0);
    let mag = 10f64.powf(rough.abs().log10().floor());
    let norm = rough / mag;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 2.5 {
        2.5
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag;
    let start = (min / step).floor() * step;
    let end = (max / step).ceil() * step;
    let count = ((end - start) / step).round() as usize + 1;
    (start, step, count)
}

fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
}

pub fn colormap(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0) * (YLGNBU.len() - 1) as f64;
    let i = (t.floor() as usize).min(YLGNBU.len() - 2);
    let f = t - i as f64;
    let (a, b) = (YLGNBU[i], YLGNBU[i + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Dark text on light cells, white on dark ones.
fn annotation_color((r, g, b): (u8, u8, u8)) -> &'static str {
    let lin = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    let lum = 0.2126 * lin(r) + 0.7152 * lin(g) + 0.0722 * lin(b);
    if lum > 0.408 { "#262626" } else { "#ffffff" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::PlateType;
    use crate::core::table::WellAreaRow;

    fn grid(rows: &[(&str, f64)], plate: PlateType) -> PlateGrid {
        let rows: Vec<WellAreaRow> = rows
            .iter()
            .map(|(w, a)| WellAreaRow {
                well: w.to_string(),
                area: *a,
            })
            .collect();
        PlateGrid::from_rows(&rows, plate).unwrap()
    }

    #[test]
    fn colorbar_labels_show_both_scales() {
        assert_eq!(colorbar_label(0.0), "0.00 (0)");
        assert_eq!(colorbar_label(2.0), "2.00 (99)");
        assert_eq!(colorbar_label(0.5), "0.50 (2)");
        assert_eq!(colorbar_label(3.0), "3.00 (999)");
        assert_eq!(colorbar_label(-1.0), "-1.00 (-1)");
    }

    #[test]
    fn ticks_stay_inside_range() {
        let ticks = colorbar_ticks(0.0, 101f64.log10());
        assert_eq!(ticks, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        let ticks = colorbar_ticks(1.2, 4.7);
        assert!(ticks.iter().all(|t| (1.2..=4.7).contains(t)));
        assert!(ticks.len() >= 3);
    }

    #[test]
    fn flat_plate_gets_unit_range() {
        let g = PlateGrid::zeros(PlateType::P96);
        assert_eq!(color_range(&g), (0.0, 1.0));
    }

    #[test]
    fn colormap_endpoints() {
        assert_eq!(colormap(0.0), YLGNBU[0]);
        assert_eq!(colormap(1.0), YLGNBU[8]);
        assert_eq!(colormap(0.5), YLGNBU[4]);
        assert_eq!(annotation_color(YLGNBU[0]), "#262626");
        assert_eq!(annotation_color(YLGNBU[8]), "#ffffff");
    }

    #[test]
    fn svg_has_cell_per_well_and_labels() {
        let g = grid(&[("A1", 100.0), ("H12", 9.0)], PlateType::P96);
        let svg = heatmap_svg(&g, &title_for("run_a1<x>")).unwrap();
        assert_eq!(svg.matches("<rect").count(), 96 + 2);
        assert!(svg.contains(">2.00</text>"));
        assert!(svg.contains(">1.00</text>"));
        assert!(svg.contains("run_a1&lt;x&gt; log10(Area+1)"));
        assert!(svg.contains(">H</text>"));
        assert!(!svg.contains(">I</text>"));
        assert!(svg.contains(">12</text>"));
        assert!(svg.contains("2.00 (99)"));
    }
}

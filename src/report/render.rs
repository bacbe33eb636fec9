use crate::core::grid::PlateGrid;
use crate::core::model::PlateType;
use crate::core::table;
use crate::report::heatmap;
use crate::report::svg::Rasterizer;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
    /// Forces the plate type instead of inferring it from the row count.
    pub plate: Option<PlateType>,
    pub pdf: bool,
}

#[derive(Debug, PartialEq)]
pub enum RenderOutcome {
    Rendered { png: PathBuf, plate: PlateType },
    /// Row count matches neither plate; nothing was drawn.
    InvalidPlate { rows: usize },
}

/// Draws the heatmap for a `Well,Area` table next to it as `<stem>.png`.
pub fn render_csv(
    csv_path: &Path,
    opts: &RenderOptions,
    rasterizer: &Rasterizer,
) -> Result<RenderOutcome> {
    let rows = table::read_table(csv_path)
        .with_context(|| format!("failed to read {}", csv_path.display()))?;
    let plate = match opts.plate.or_else(|| PlateType::from_row_count(rows.len())) {
        Some(p) => p,
        None => return Ok(RenderOutcome::InvalidPlate { rows: rows.len() }),
    };

    let grid = PlateGrid::from_rows(&rows, plate)
        .with_context(|| format!("cannot lay out {} as a {}-well plate", csv_path.display(), plate))?;
    let stem = csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("failed to determine table name")?;
    let svg = heatmap::heatmap_svg(&grid, &heatmap::title_for(stem))?;

    let png = csv_path.with_extension("png");
    rasterizer.write_png(&svg, &png)?;
    if opts.pdf {
        let pdf_path = csv_path.with_extension("pdf");
        let pdf = rasterizer
            .to_pdf(&svg)
            .with_context(|| format!("failed to convert {} to PDF", stem))?;
        fs::write(&pdf_path, pdf)
            .with_context(|| format!("failed to write {}", pdf_path.display()))?;
    }
    Ok(RenderOutcome::Rendered { png, plate })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::plate_wells;
    use crate::core::model::{CompoundTable, WellArea};
    use tempfile::tempdir;

    fn full_table(plate: PlateType) -> CompoundTable {
        CompoundTable {
            rows: plate_wells(plate)
                .into_iter()
                .enumerate()
                .map(|(i, well)| WellArea { well, area: i as f64 })
                .collect(),
        }
    }

    #[test]
    fn renders_inferred_plates() {
        let dir = tempdir().unwrap();
        let raster = Rasterizer::new();
        for plate in [PlateType::P384, PlateType::P96] {
            let csv = dir.path().join(format!("plate_{}.csv", plate));
            table::write_table(&csv, &full_table(plate)).unwrap();
            let opts = RenderOptions { plate: None, pdf: true };
            let outcome = render_csv(&csv, &opts, &raster).unwrap();
            let png = dir.path().join(format!("plate_{}.png", plate));
            assert_eq!(outcome, RenderOutcome::Rendered { png: png.clone(), plate });
            let bytes = fs::read(&png).unwrap();
            assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
            assert!(csv.with_extension("pdf").is_file());
        }
    }

    #[test]
    fn odd_row_count_is_skipped() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("partial.csv");
        let mut t = full_table(PlateType::P96);
        t.rows.truncate(50);
        table::write_table(&csv, &t).unwrap();
        let outcome = render_csv(&csv, &RenderOptions::default(), &Rasterizer::new()).unwrap();
        assert_eq!(outcome, RenderOutcome::InvalidPlate { rows: 50 });
        assert!(!csv.with_extension("png").exists());

        let empty = dir.path().join("empty.csv");
        table::write_table(&empty, &CompoundTable::default()).unwrap();
        let outcome = render_csv(&empty, &RenderOptions::default(), &Rasterizer::new()).unwrap();
        assert_eq!(outcome, RenderOutcome::InvalidPlate { rows: 0 });
    }

    #[test]
    fn forced_plate_rejects_wells_outside_it() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("big.csv");
        table::write_table(&csv, &full_table(PlateType::P384)).unwrap();
        let opts = RenderOptions {
            plate: Some(PlateType::P96),
            pdf: false,
        };
        assert!(render_csv(&csv, &opts, &Rasterizer::new()).is_err());
    }
}

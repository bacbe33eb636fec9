use crate::core::io::report_base_name;
use crate::core::loader::{self, LoadSummary};
use crate::core::model::PlateType;
use crate::core::reshape::{self, CompletionSummary};
use crate::core::table;
use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct ConvertConfig {
    pub out_root: PathBuf,
    pub plate: PlateType,
}

#[derive(Debug)]
pub struct ConvertOutput {
    pub base_name: String,
    pub out_dir: PathBuf,
    /// Every CSV written, compound tables each followed by their quadrants.
    pub tables: Vec<PathBuf>,
    pub load: LoadSummary,
    pub completion: CompletionSummary,
}

/// Loads one report and writes its per-compound and per-quadrant tables into
/// a fresh `<out_root>/<base>/` directory.
pub fn convert_report(input: &Path, cfg: &ConvertConfig) -> Result<ConvertOutput> {
    let t_load = Instant::now();
    let loaded = loader::load_report(input)?;
    log::debug!(
        "stage=load file={} rows={} time={:?}",
        input.display(),
        loaded.summary.kept,
        t_load.elapsed()
    );

    let base_name = report_base_name(input)?;
    let out_dir = create_output_dir(&cfg.out_root, &base_name)?;

    let t_reshape = Instant::now();
    let mut tables = Vec::new();
    let mut completion = CompletionSummary::default();
    let mut stems = HashSet::new();
    for (compound, records) in reshape::group_by_compound(loaded.records) {
        let stem = format!("{}_{}", base_name, reshape::compound_slug(&compound));
        if !stems.insert(stem.clone()) {
            bail!(
                "compound {:?} maps to table name {} already used by another compound",
                compound,
                stem
            );
        }

        let (completed, summary) = reshape::complete(&records, cfg.plate);
        completion.filled += summary.filled;
        completion.outliers += summary.outliers;
        completion.duplicates += summary.duplicates;

        let path = out_dir.join(format!("{}.csv", stem));
        table::write_table(&path, &completed)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tables.push(path);

        if cfg.plate == PlateType::P384 {
            for quad in reshape::split_quadrants(&completed) {
                if !quad.remapped && !quad.table.is_empty() {
                    log::warn!(
                        "{} quadrant {} has {} wells; keeping 384-well labels",
                        compound,
                        quad.quadrant,
                        quad.table.len()
                    );
                }
                let path = out_dir.join(format!("{}_{}.csv", stem, quad.quadrant));
                table::write_table(&path, &quad.table)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tables.push(path);
            }
        }
    }
    log::debug!(
        "stage=reshape file={} tables={} time={:?}",
        input.display(),
        tables.len(),
        t_reshape.elapsed()
    );
    if completion.outliers > 0 || completion.duplicates > 0 {
        log::warn!(
            "{}: dropped {} unexpected and {} duplicate well record(s)",
            input.display(),
            completion.outliers,
            completion.duplicates
        );
    }

    Ok(ConvertOutput {
        base_name,
        out_dir,
        tables,
        load: loaded.summary,
        completion,
    })
}

/// Creates `<out_root>/<base>`. An existing directory is an error so two
/// runs never mix their artifacts.
pub fn create_output_dir(out_root: &Path, base_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_root)
        .with_context(|| format!("failed to create output root {}", out_root.display()))?;
    let dir = out_root.join(base_name);
    match fs::create_dir(&dir) {
        Ok(()) => Ok(dir),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!(
                "output directory {} already exists; remove it before converting again",
                dir.display()
            )
        }
        Err(e) => {
            Err(e).with_context(|| format!("failed to create output dir {}", dir.display()))
        }
    }
}

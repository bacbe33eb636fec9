use crate::cli::args::{Cli, Commands, ConvertArgs, HeatmapArgs, PlateArg, PlateMapArgs, RunArgs};
use crate::core::engine::{self, ConvertConfig};
use crate::core::model::PlateType;
use crate::report;
use crate::report::render::{RenderOptions, RenderOutcome};
use crate::report::svg::Rasterizer;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Convert(args) => convert(args),
        Commands::Heatmap(args) => heatmap(args),
        Commands::PlateMap(args) => plate_map(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let t0 = Instant::now();
    let cfg = convert_config(&args.convert);
    let opts = RenderOptions {
        plate: None,
        pdf: args.pdf,
    };
    let raster = Rasterizer::new();

    let mut failed = 0usize;
    for input in &args.convert.reports {
        println!("Converting {} to csv file...", display_name(input));
        let t_file = Instant::now();
        let output = match engine::convert_report(input, &cfg) {
            Ok(o) => o,
            Err(e) => {
                log::error!("{}: {:#}", input.display(), e);
                failed += 1;
                continue;
            }
        };
        stage_done("convert", t_file);

        let t_render = Instant::now();
        let render_failures = render_tables(&output.tables, &opts, &raster);
        stage_done("render", t_render);

        if args.zip {
            let t_zip = Instant::now();
            if let Err(e) = report::zip::write_bundle(&cfg.out_root, &output.base_name) {
                log::error!("{}: {:#}", input.display(), e);
                failed += 1;
                continue;
            }
            stage_done("zip", t_zip);
        }
        if render_failures > 0 {
            failed += 1;
        }
    }

    log::debug!("stage=total time={}", fmt_dur(t0.elapsed()));
    finish(failed, args.convert.reports.len())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let cfg = convert_config(&args);
    let mut failed = 0usize;
    for input in &args.reports {
        println!("Converting {} to csv file...", display_name(input));
        match engine::convert_report(input, &cfg) {
            Ok(output) => log::info!(
                "{}: {} row(s) kept, {} dropped, {} well(s) zero-filled; {} table(s) in {}",
                input.display(),
                output.load.kept,
                output.load.dropped,
                output.completion.filled,
                output.tables.len(),
                output.out_dir.display()
            ),
            Err(e) => {
                log::error!("{}: {:#}", input.display(), e);
                failed += 1;
            }
        }
    }
    finish(failed, args.reports.len())
}

fn heatmap(args: HeatmapArgs) -> Result<()> {
    let opts = RenderOptions {
        plate: args.plate.map(plate_type),
        pdf: args.pdf,
    };
    let raster = Rasterizer::new();
    let failed = render_tables(&args.tables, &opts, &raster);
    finish(failed, args.tables.len())
}

fn plate_map(args: PlateMapArgs) -> Result<()> {
    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create output dir {}", args.out.display()))?;
    let csv_path = args.out.join(report::plate_map::DISPENSE_FILE);
    report::plate_map::write_dispense_list(&csv_path)?;
    let png_path = args.out.join(report::plate_map::PLATE_MAP_FILE);
    let svg = report::plate_map::plate_map_svg()?;
    Rasterizer::new().write_png(&svg, &png_path)?;
    println!("Wrote {} and {}", csv_path.display(), png_path.display());
    println!("Done!");
    Ok(())
}

/// Draws every table; an odd-sized table is reported and skipped. Returns
/// the number of tables that failed outright.
fn render_tables(tables: &[PathBuf], opts: &RenderOptions, raster: &Rasterizer) -> usize {
    let mut failed = 0usize;
    for csv in tables {
        match report::render::render_csv(csv, opts, raster) {
            Ok(RenderOutcome::Rendered { png, plate }) => {
                println!("Drawing heatmap for {}...", display_name(csv));
                log::debug!("{} ({}-well) -> {}", csv.display(), plate, png.display());
            }
            Ok(RenderOutcome::InvalidPlate { rows }) => {
                log::warn!(
                    "{} has {} rows, not a 384 or 96 plate; skipping heatmap",
                    display_name(csv),
                    rows
                );
            }
            Err(e) => {
                log::error!("{}: {:#}", csv.display(), e);
                failed += 1;
            }
        }
    }
    failed
}

fn convert_config(args: &ConvertArgs) -> ConvertConfig {
    ConvertConfig {
        out_root: args.out.clone(),
        plate: plate_type(args.plate),
    }
}

fn plate_type(arg: PlateArg) -> PlateType {
    match arg {
        PlateArg::P384 => PlateType::P384,
        PlateArg::P96 => PlateType::P96,
    }
}

fn finish(failed: usize, total: usize) -> Result<()> {
    println!("Done!");
    if failed > 0 {
        bail!("{} of {} input(s) failed", failed, total);
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn stage_done(name: &str, t: Instant) {
    log::debug!("stage={} time={}", name, fmt_dur(t.elapsed()));
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "echoms-plates",
    version,
    about = "Echo-MS reports to per-plate CSV tables and well heatmaps"
)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert reports to CSV tables and draw a heatmap for each table
    Run(RunArgs),
    /// Convert reports to CSV tables only
    Convert(ConvertArgs),
    /// Draw heatmaps for existing Well,Area tables
    Heatmap(HeatmapArgs),
    /// Write a blank 384-well plate map and its dispense list
    PlateMap(PlateMapArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Tab-separated instrument reports (.txt, optionally gzipped)
    #[arg(required = true, value_name = "REPORT")]
    pub reports: Vec<PathBuf>,

    #[arg(long, default_value = "results")]
    pub out: PathBuf,

    #[arg(long, value_enum, default_value_t = PlateArg::P384)]
    pub plate: PlateArg,
}

#[derive(Parser)]
pub struct RunArgs {
    #[command(flatten)]
    pub convert: ConvertArgs,

    /// Also write each heatmap as PDF
    #[arg(long, default_value_t = false)]
    pub pdf: bool,

    /// Pack each report's output directory into <out>/<report>.zip
    #[arg(long, default_value_t = false)]
    pub zip: bool,
}

#[derive(Parser)]
pub struct HeatmapArgs {
    #[arg(required = true, value_name = "CSV")]
    pub tables: Vec<PathBuf>,

    /// Plate type; inferred from the row count when omitted
    #[arg(long, value_enum)]
    pub plate: Option<PlateArg>,

    #[arg(long, default_value_t = false)]
    pub pdf: bool,
}

#[derive(Parser)]
pub struct PlateMapArgs {
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PlateArg {
    #[value(name = "384")]
    P384,
    #[value(name = "96")]
    P96,
}

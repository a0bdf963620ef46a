use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

/// Energy-certificate ETL for Catalonia.
#[derive(Parser, Debug)]
#[command(name = "certcat", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch source datasets into the static directory
    Fetch(FetchArgs),

    /// Run the cleaning pipeline and write the output artifacts
    Process(ProcessArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum FetchTarget { Certificates, Income, Municipis, All }

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Which dataset to fetch
    #[arg(value_enum, default_value_t = FetchTarget::All)]
    pub target: FetchTarget,

    /// Directory for fetched source files
    #[arg(long, default_value = "static", value_hint = ValueHint::DirPath)]
    pub static_dir: PathBuf,

    /// Row limit for the certificate download
    #[arg(long, default_value_t = 1_400_000)]
    pub limit: usize,

    /// Overwrite files fetched by an earlier run
    #[arg(long)]
    pub force: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum GradeFormat { Letters, Ordinal }

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum OutlierBound { Percentile, Iqr }

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Directory holding the fetched/static source files
    #[arg(long, default_value = "static", value_hint = ValueHint::DirPath)]
    pub static_dir: PathBuf,

    /// Output directory for the cleaned artifacts
    #[arg(short, long, default_value = "data", value_hint = ValueHint::DirPath)]
    pub out: PathBuf,

    /// Load the municipality dictionary from a previous run instead of comarques.csv
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub municipis: Option<PathBuf>,

    /// Quality-grade handling (letters pass through; ordinal mirrors the legacy cast)
    #[arg(long, value_enum, default_value_t = GradeFormat::Letters)]
    pub grades: GradeFormat,

    /// Emission outlier bound (percentile is current; iqr mirrors the legacy fences)
    #[arg(long, value_enum, default_value_t = OutlierBound::Percentile)]
    pub outliers: OutlierBound,

    /// Aggregate without joining the income-indicator table
    #[arg(long)]
    pub skip_income: bool,

    /// Overwrite existing output artifacts
    #[arg(long)]
    pub force: bool,
}

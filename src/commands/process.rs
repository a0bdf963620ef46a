//! The `process` subcommand: run the pipeline over the fetched sources and
//! write the output artifacts.

use anyhow::{ensure, Context, Result};

use crate::cli::{Cli, GradeFormat, OutlierBound, ProcessArgs};
use crate::common::{extract_zip, find_file_with_extension, read_json_frame, require_dir_exists};
use crate::dict::{MunicipiDict, PobEntry};
use crate::fetch::{INCOME_FILE, POB_FILE, RAW_DATA_FILE};
use crate::output::{self, Artifacts};
use crate::pipeline::{
    aggregate_by_level, encode_categoricals, municipal_income, pivot_income, run_pipeline,
    AggregateLevel, GradePolicy, OutlierPolicy, PipelineOptions,
};
use crate::sections::SectionLayer;

/// Census-section boundary archive as distributed by the cartography
/// institute.
const SECTIONS_ZIP: &str = "bseccenv10sh1f1_20240101_0.zip";
const SECTIONS_DIR: &str = "seccions-censals";
const COMARQUES_CSV: &str = "comarques.csv";

pub fn run(cli: &Cli, args: &ProcessArgs) -> Result<()> {
    require_dir_exists(&args.static_dir)?;

    let mut dict = match &args.municipis {
        Some(path) => MunicipiDict::load_json(path)?,
        None => MunicipiDict::from_comarques_csv(&args.static_dir.join(COMARQUES_CSV))?,
    };
    ensure!(!dict.is_empty(), "municipality dictionary came out empty");

    // population joins in when the fetched file is around
    if args.municipis.is_none() {
        let pob_path = args.static_dir.join(POB_FILE);
        if pob_path.exists() {
            let text = std::fs::read_to_string(&pob_path)
                .with_context(|| format!("read {}", pob_path.display()))?;
            let entries: Vec<PobEntry> = serde_json::from_str(&text)
                .with_context(|| format!("parse {}", pob_path.display()))?;
            let merged = dict.merge_population(&entries);
            if cli.verbose > 0 {
                eprintln!("[process] population merged for {merged} municipalities");
            }
        }
    }

    let sections_dir = args.static_dir.join(SECTIONS_DIR);
    extract_zip(&args.static_dir.join(SECTIONS_ZIP), &sections_dir)?;
    let shp_path = find_file_with_extension(&sections_dir, "shp")?;
    let layer = SectionLayer::from_shapefile(&shp_path)?;
    if cli.verbose > 0 {
        eprintln!("[process] section layer: {} polygons", layer.len());
    }

    let raw = read_json_frame(&args.static_dir.join(RAW_DATA_FILE))?;

    let opts = PipelineOptions {
        grades: match args.grades {
            GradeFormat::Letters => GradePolicy::Letters,
            GradeFormat::Ordinal => GradePolicy::LegacyOrdinal,
        },
        outliers: match args.outliers {
            OutlierBound::Percentile => OutlierPolicy::Percentile,
            OutlierBound::Iqr => OutlierPolicy::LegacyIqr,
        },
        verbose: cli.verbose,
    };
    let cleaned = run_pipeline(&raw, &layer, &dict, &opts)?;

    let (encoded, labels) = encode_categoricals(&cleaned)?;

    let income = if args.skip_income {
        None
    } else {
        let path = args.static_dir.join(INCOME_FILE);
        let flat = read_json_frame(&path).with_context(|| {
            format!(
                "income table missing: {} (fetch it or pass --skip-income)",
                path.display()
            )
        })?;
        Some(pivot_income(&flat)?)
    };
    let municipal = match &income {
        Some(income) => Some(municipal_income(income)?),
        None => None,
    };

    let sections = aggregate_by_level(&cleaned, AggregateLevel::Section, income.as_ref())?;
    let municipalities =
        aggregate_by_level(&cleaned, AggregateLevel::Municipality, municipal.as_ref())?;
    let comarques = aggregate_by_level(&cleaned, AggregateLevel::Comarca, None)?;

    let artifacts = Artifacts {
        certificates: encoded,
        labels,
        sections,
        municipalities,
        comarques,
        dict,
    };
    output::write_outputs(&args.out, &artifacts, args.force, cli.verbose)?;

    println!("Wrote pipeline outputs to {}", args.out.display());
    Ok(())
}

//! The cleaning pipeline: raw certificate records in, analysis-ready
//! record and aggregate frames out.

pub(crate) mod columns;

mod aggregate;
mod codes;
mod encode;
mod geocode;
mod labels;
mod normalize;
mod outliers;

pub use aggregate::{aggregate_by_level, municipal_income, pivot_income, AggregateLevel};
pub use encode::{encode_categoricals, LabelMapping};
pub use outliers::OutlierPolicy;

use anyhow::Result;
use polars::prelude::DataFrame;

use crate::{dict::MunicipiDict, sections::SectionLayer};

/// How energy and emission quality grades come out of the cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GradePolicy {
    /// Keep the letter grades, nulling anything outside A..G.
    #[default]
    Letters,
    /// Map letters to their 1..7 ordinal, as earlier dataset revisions did.
    LegacyOrdinal,
}

#[derive(Clone, Debug, Default)]
pub struct PipelineOptions {
    pub grades: GradePolicy,
    pub outliers: OutlierPolicy,
    pub verbose: u8,
}

/// Run the record-level pipeline: validity filter, spatial join, schema
/// normalization, code regeneration, label unification and outlier removal.
/// The result feeds both the categorical encoder and the aggregators.
pub fn run_pipeline(
    raw: &DataFrame,
    layer: &SectionLayer,
    dict: &MunicipiDict,
    opts: &PipelineOptions,
) -> Result<DataFrame> {
    let stage = |name: &str, before: usize, df: &DataFrame| {
        if opts.verbose > 0 {
            eprintln!("[pipeline] {}: {} -> {} rows", name, before, df.height());
        }
    };

    let df = normalize::drop_invalid_rows(raw)?;
    stage("validity", raw.height(), &df);

    let df = geocode::geocode_records(&df, layer)?;
    let df = normalize::rename_columns(&df)?;
    let df = normalize::reduce_columns(&df)?;

    let before = df.height();
    let df = normalize::cast_columns(&df, opts.grades)?;
    stage("cast", before, &df);

    let df = codes::regenerate_codes(&df, dict)?;
    let df = labels::unify_labels(&df)?;

    let before = df.height();
    let df = outliers::filter_outliers(&df, opts.outliers)?;
    stage("outliers", before, &df);

    Ok(df)
}

#![doc = "certcat public API"]
mod common;
mod dict;
mod fetch;
mod output;
mod pipeline;
mod sections;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use dict::{Municipi, MunicipiDict, PobEntry};

#[doc(inline)]
pub use sections::{Geometries, SectionLayer};

#[doc(inline)]
pub use pipeline::{
    AggregateLevel, GradePolicy, LabelMapping, OutlierPolicy, PipelineOptions,
    aggregate_by_level, encode_categoricals, municipal_income, pivot_income, run_pipeline,
};

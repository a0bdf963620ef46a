mod csv;
mod json;
mod parquet;
mod write;

pub(crate) use csv::*;
pub(crate) use json::*;
pub(crate) use parquet::*;
pub(crate) use write::*;

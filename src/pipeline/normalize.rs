//! Schema normalization: row validity, renames, projection, type coercion.

use anyhow::{ensure, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::common::zero_pad;

use super::{columns, GradePolicy};

/// Parse a column to f64 whatever its source dtype; unparseable values
/// become null.
pub(crate) fn parse_f64_column(col: &Column) -> Result<Float64Chunked> {
    let name = col.name().clone();
    let series = col.as_materialized_series();
    match series.dtype() {
        DataType::String => {
            let parsed: Float64Chunked = series.str()?
                .into_iter()
                .map(|opt| opt.and_then(|s| s.trim().parse::<f64>().ok()))
                .collect();
            Ok(parsed.with_name(name))
        }
        DataType::Null => Ok(Float64Chunked::full_null(name, series.len())),
        _ => Ok(series.cast(&DataType::Float64)?.f64()?.clone()),
    }
}

/// Parse a column to i64 whatever its source dtype; unparseable values
/// become null.
pub(crate) fn parse_i64_column(col: &Column) -> Result<Int64Chunked> {
    let name = col.name().clone();
    let series = col.as_materialized_series();
    match series.dtype() {
        DataType::String => {
            let parsed: Int64Chunked = series.str()?
                .into_iter()
                .map(|opt| opt.and_then(|s| s.trim().parse::<i64>().ok()))
                .collect();
            Ok(parsed.with_name(name))
        }
        DataType::Null => Ok(Int64Chunked::full_null(name, series.len())),
        _ => Ok(series.cast(&DataType::Int64)?.i64()?.clone()),
    }
}

/// Lenient date parsing across schema revisions: ISO datetime first, then
/// plain dates with day-first variants.
pub(crate) fn parse_date_dayfirst(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

fn month_start(d: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(d.year(), d.month(), 1).unwrap_or(d)
}

/// Drop rows lacking coordinates or an entry date, the precondition of the
/// geocoding step. Coordinate columns come back parsed to f64.
pub(crate) fn drop_invalid_rows(df: &DataFrame) -> Result<DataFrame> {
    let utm_x = parse_f64_column(df.column(columns::UTM_X)?)?;
    let utm_y = parse_f64_column(df.column(columns::UTM_Y)?)?;
    let date_ok = df.column(columns::DATA_ENTRADA)?.as_materialized_series().is_not_null();

    let mask = utm_x.is_not_null() & utm_y.is_not_null() & date_ok;

    let mut out = df.clone();
    out.replace_or_add(columns::UTM_X.into(), utm_x.into_series())?;
    out.replace_or_add(columns::UTM_Y.into(), utm_y.into_series())?;
    Ok(out.filter(&mask)?)
}

/// Fold legacy column names into canonical ones where present.
pub(crate) fn rename_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    for (from, to) in columns::RENAMINGS {
        if out.column(from).is_ok() {
            out.rename(from, to.into())?;
        }
    }
    Ok(out)
}

/// Project onto the canonical column set. A listed column missing after the
/// renames means the upstream schema drifted; that aborts the run.
pub(crate) fn reduce_columns(df: &DataFrame) -> Result<DataFrame> {
    for name in columns::COLUMNS_IN_USE {
        ensure!(df.column(name).is_ok(), "[normalize] missing required column: {}", name);
    }
    Ok(df.select(columns::COLUMNS_IN_USE)?)
}

/// Coerce columns to their target types, dropping rows that fail the
/// invariants (unparseable codes, dates, or section identifiers).
pub(crate) fn cast_columns(df: &DataFrame, grades: GradePolicy) -> Result<DataFrame> {
    let mut out = df.clone();

    // geographic codes: unparseable values null the row out
    for name in [columns::CODI_PROVINCIA, columns::CODI_POBLACIO, columns::CODI_COMARCA] {
        let parsed = parse_i64_column(out.column(name)?)?;
        let mask = parsed.is_not_null();
        out.replace_or_add(name.into(), parsed.into_series())?;
        out = out.filter(&mask)?;
    }

    // entry dates, floored to the first of their month
    {
        let raw = out.column(columns::DATA_ENTRADA)?.cast(&DataType::String)?;
        let dates = DateChunked::from_naive_date_options(
            columns::DATA_ENTRADA.into(),
            raw.str()?
                .into_iter()
                .map(|opt| opt.and_then(parse_date_dayfirst).map(month_start)),
        );
        let mask = dates.is_not_null();
        out.replace_or_add(columns::DATA_ENTRADA.into(), dates.into_series())?;
        out = out.filter(&mask)?;
    }

    // section identifier, re-rendered as the 11-character zero-padded form
    {
        let raw = out.column(columns::MUNDISSEC)?.cast(&DataType::String)?;
        let padded: StringChunked = raw.str()?
            .into_iter()
            .map(|opt| opt.map(|s| zero_pad(s, 11)))
            .collect();
        let padded = padded.with_name(columns::MUNDISSEC.into());
        let mask = padded.is_not_null();
        out.replace_or_add(columns::MUNDISSEC.into(), padded.into_series())?;
        out = out.filter(&mask)?;
    }

    // metric columns keep their nulls
    for name in [columns::METRES, columns::EMISSIONS, columns::ENERGIA, columns::COST] {
        let parsed = parse_f64_column(out.column(name)?)?;
        out.replace_or_add(name.into(), parsed.into_series())?;
    }

    // a reported cost of exactly 0 alongside positive primary energy is a
    // data-entry artifact; null it out
    {
        let cost = out.column(columns::COST)?.f64()?.clone();
        let energia = out.column(columns::ENERGIA)?.f64()?.clone();
        let corrected: Float64Chunked = cost.into_iter()
            .zip(energia.into_iter())
            .map(|(c, e)| match (c, e) {
                (Some(c), Some(e)) if c == 0.0 && e > 0.0 => None,
                (c, _) => c,
            })
            .collect();
        let corrected = corrected.with_name(columns::COST.into());
        out.replace_or_add(columns::COST.into(), corrected.into_series())?;
    }

    // quality grades per policy; anything outside A..G becomes null
    for name in [columns::QUAL_ENERGIA, columns::QUAL_EMISSIONS] {
        let raw = out.column(name)?.cast(&DataType::String)?;
        match grades {
            GradePolicy::Letters => {
                let cleaned: StringChunked = raw.str()?
                    .into_iter()
                    .map(|opt| opt.and_then(|s| {
                        let s = s.trim();
                        columns::grade_ordinal(s).map(|_| s.to_string())
                    }))
                    .collect();
                let cleaned = cleaned.with_name(name.into());
                out.replace_or_add(name.into(), cleaned.into_series())?;
            }
            GradePolicy::LegacyOrdinal => {
                let ordinals: Int64Chunked = raw.str()?
                    .into_iter()
                    .map(|opt| opt.and_then(|s| columns::grade_ordinal(s.trim())))
                    .collect();
                let ordinals = ordinals.with_name(name.into());
                out.replace_or_add(name.into(), ordinals.into_series())?;
            }
        }
    }

    Ok(out)
}

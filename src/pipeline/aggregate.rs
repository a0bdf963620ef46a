//! Aggregated datasets per geographic level, with income indicators joined in.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use polars::prelude::*;

use super::columns;
use super::normalize::{parse_f64_column, parse_i64_column};
use crate::common::code_prefix;

/// Geographic grain of an aggregated output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateLevel {
    Section,
    Municipality,
    Comarca,
}

impl AggregateLevel {
    /// Column of the cleaned record frame the groups come from.
    pub(crate) fn source_column(self) -> &'static str {
        match self {
            AggregateLevel::Section => columns::MUNDISSEC,
            AggregateLevel::Municipality => columns::CODI_POBLACIO,
            AggregateLevel::Comarca => columns::CODI_COMARCA,
        }
    }

    /// Name the group key carries in the output.
    pub(crate) fn key_column(self) -> &'static str {
        match self {
            AggregateLevel::Section => columns::MUNDISSEC,
            AggregateLevel::Municipality => columns::CODIMUNI,
            AggregateLevel::Comarca => columns::CODICOMAR,
        }
    }
}

/// Quality grades as numbers: letter grades map to their 1..7 ordinal,
/// already numeric grades pass through. Anything else is null.
fn grade_ordinal_column(col: &Column, name: &str) -> Result<Float64Chunked> {
    match col.dtype() {
        DataType::String => {
            let ordinals: Float64Chunked = col.str()?
                .into_iter()
                .map(|opt| opt.and_then(|s| columns::grade_ordinal(s.trim()).map(|v| v as f64)))
                .collect();
            Ok(ordinals.with_name(name.into()))
        }
        _ => Ok(col.cast(&DataType::Float64)?.f64()?.clone().with_name(name.into())),
    }
}

/// Aggregate cleaned records to one row per geographic unit: the record count
/// plus emission, quality, energy, surface and cost statistics. Rows without
/// a group key are left out, so the counts over all groups add up to the
/// attributable records.
///
/// When an income frame is given it must carry the level's key column; the
/// join is a full outer one, so units present on only one side survive with
/// nulls on the other.
pub fn aggregate_by_level(
    df: &DataFrame,
    level: AggregateLevel,
    income: Option<&DataFrame>,
) -> Result<DataFrame> {
    let source = level.source_column();
    let key = level.key_column();

    let mut work = df.clone();

    let energia_ord = grade_ordinal_column(df.column(columns::QUAL_ENERGIA)?, "qual_energia_ord")?;
    work.replace_or_add("qual_energia_ord".into(), energia_ord.into_series())?;
    let emissions_ord =
        grade_ordinal_column(df.column(columns::QUAL_EMISSIONS)?, "qual_emissions_ord")?;
    work.replace_or_add("qual_emissions_ord".into(), emissions_ord.into_series())?;

    // per-record emission total needs both factors
    let totals: Float64Chunked = df.column(columns::EMISSIONS)?.f64()?
        .into_iter()
        .zip(df.column(columns::METRES)?.f64()?.into_iter())
        .map(|(e, m)| match (e, m) {
            (Some(e), Some(m)) => Some(e * m),
            _ => None,
        })
        .collect();
    let totals = totals.with_name("emissions_totals".into());
    work.replace_or_add("emissions_totals".into(), totals.into_series())?;

    let mask = work.column(source)?.as_materialized_series().is_not_null();
    let work = work.filter(&mask)?;

    let mut out = work.lazy()
        .group_by([col(source)])
        .agg([
            len().alias("count"),
            col(columns::EMISSIONS).mean().alias("mean_emissions"),
            col(columns::EMISSIONS).sum().alias("sum_emissions"),
            col("emissions_totals").sum().alias("total_emissions"),
            col("qual_energia_ord").mean().alias("mean_energy_qual"),
            col("qual_emissions_ord").mean().alias("mean_emissions_qual"),
            col(columns::ENERGIA).sum().alias("total_energy"),
            col(columns::ENERGIA).mean().alias("mean_energy"),
            col(columns::METRES).sum().alias("total_surface"),
            col(columns::METRES).mean().alias("mean_surface"),
            col(columns::COST).sum().alias("total_cost"),
            col(columns::COST).mean().alias("mean_cost"),
        ])
        .collect()?;

    if source != key {
        out.rename(source, key.into())?;
    }

    if let Some(income) = income {
        out = out.lazy()
            .join(
                income.clone().lazy(),
                [col(key)],
                [col(key)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .collect()?;
    }

    Ok(out.sort([key], SortMultipleOptions::default())?)
}

/// Pivot the flat income table into one row per census section with one
/// column per 2022 indicator. Duplicate series for the same cell average out.
pub fn pivot_income(flat: &DataFrame) -> Result<DataFrame> {
    let mundissec = flat.column(columns::MUNDISSEC)?.str()?.clone();
    let indicador = flat.column("indicador")?.str()?.clone();
    let year = parse_i64_column(flat.column("any")?)?;
    let valor = parse_f64_column(flat.column("valor")?)?;

    let mut cells: BTreeMap<String, BTreeMap<String, (f64, usize)>> = BTreeMap::new();
    for i in 0..flat.height() {
        let (code, ind, y, v) =
            match (mundissec.get(i), indicador.get(i), year.get(i), valor.get(i)) {
                (Some(code), Some(ind), Some(y), Some(v)) => (code, ind, y, v),
                _ => continue,
            };
        if y != 2022 {
            continue;
        }
        let slot = cells.entry(code.to_string())
            .or_default()
            .entry(format!("{ind}_2022"))
            .or_insert((0.0, 0usize));
        slot.0 += v;
        slot.1 += 1;
    }

    let names: BTreeSet<String> = cells.values().flat_map(|row| row.keys().cloned()).collect();

    let codes: Vec<&str> = cells.keys().map(String::as_str).collect();
    let mut cols = vec![Column::new(columns::MUNDISSEC.into(), codes)];
    for name in &names {
        let values: Vec<Option<f64>> = cells.values()
            .map(|row| row.get(name).map(|&(sum, count)| sum / count as f64))
            .collect();
        cols.push(Column::new(name.as_str().into(), values));
    }
    Ok(DataFrame::new(cols)?)
}

/// Average section-level income indicators up to municipalities, keyed by
/// the six-digit municipality code.
pub fn municipal_income(income: &DataFrame) -> Result<DataFrame> {
    let keys = income.column(columns::MUNDISSEC)?.str()?.clone();
    let value_names: Vec<String> = income.get_column_names().iter()
        .filter(|name| name.as_str() != columns::MUNDISSEC)
        .map(|name| name.to_string())
        .collect();

    let munis: BTreeSet<&str> = keys.into_iter().flatten().map(|code| code_prefix(code, 6)).collect();

    let mut cols = vec![Column::new(
        columns::CODIMUNI.into(),
        munis.iter().copied().collect::<Vec<_>>(),
    )];
    for name in &value_names {
        let values = parse_f64_column(income.column(name)?)?;
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for (code, value) in keys.into_iter().zip(values.into_iter()) {
            if let (Some(code), Some(value)) = (code, value) {
                let slot = sums.entry(code_prefix(code, 6)).or_insert((0.0, 0usize));
                slot.0 += value;
                slot.1 += 1;
            }
        }
        let means: Vec<Option<f64>> = munis.iter()
            .map(|muni| sums.get(muni).map(|&(sum, count)| sum / count as f64))
            .collect();
        cols.push(Column::new(name.as_str().into(), means));
    }
    Ok(DataFrame::new(cols)?)
}

//! Removal of statistically extreme emission rows.

use anyhow::Result;
use polars::prelude::*;

use super::columns;

/// Which bound cuts the emissions tail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutlierPolicy {
    /// Drop negative emissions, then everything above the 97.5th percentile.
    #[default]
    Percentile,
    /// Decile fence of earlier revisions: keep rows strictly below
    /// `Q3 + 1.5 * (Q3 - Q1)` with Q1/Q3 the 10th/90th percentiles.
    LegacyIqr,
}

/// Filter emission outliers. Quantiles are computed over the population the
/// bound applies to, so the percentile policy takes them after the negative
/// rows are gone. Rows with null emissions fail every comparison and drop.
pub(crate) fn filter_outliers(df: &DataFrame, policy: OutlierPolicy) -> Result<DataFrame> {
    match policy {
        OutlierPolicy::Percentile => {
            let nonneg = {
                let mask: BooleanChunked = df.column(columns::EMISSIONS)?.f64()?
                    .into_iter()
                    .map(|v| v.map_or(false, |v| v >= 0.0))
                    .collect();
                df.filter(&mask)?
            };
            match emissions_quantile(&nonneg, 0.975)? {
                Some(bound) => {
                    let mask: BooleanChunked = nonneg.column(columns::EMISSIONS)?.f64()?
                        .into_iter()
                        .map(|v| v.map_or(false, |v| v <= bound))
                        .collect();
                    Ok(nonneg.filter(&mask)?)
                }
                None => Ok(nonneg),
            }
        }
        OutlierPolicy::LegacyIqr => {
            let q1 = emissions_quantile(df, 0.10)?;
            let q3 = emissions_quantile(df, 0.90)?;
            match (q1, q3) {
                (Some(q1), Some(q3)) => {
                    let upper = q3 + 1.5 * (q3 - q1);
                    let mask: BooleanChunked = df.column(columns::EMISSIONS)?.f64()?
                        .into_iter()
                        .map(|v| v.map_or(false, |v| v < upper))
                        .collect();
                    Ok(df.filter(&mask)?)
                }
                _ => Ok(df.clone()),
            }
        }
    }
}

/// Linear-interpolation quantile of the emissions column, null when the
/// population is empty.
fn emissions_quantile(df: &DataFrame, q: f64) -> Result<Option<f64>> {
    let out = df.clone().lazy()
        .select([col(columns::EMISSIONS).quantile(lit(q), QuantileMethod::Linear)])
        .collect()?;
    Ok(out.column(columns::EMISSIONS)?.f64()?.get(0))
}

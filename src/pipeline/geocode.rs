//! Spatial join of certificate coordinates against the section layer.

use anyhow::Result;
use geo::Point;
use polars::prelude::*;

use crate::sections::SectionLayer;

use super::columns;

/// Attach section-layer attributes to every record whose point falls inside
/// a polygon. Left-join semantics: records outside every polygon are kept
/// with null geocode fields. Attribute columns already present on the record
/// side are left alone.
pub(crate) fn geocode_records(df: &DataFrame, layer: &SectionLayer) -> Result<DataFrame> {
    let utm_x = df.column(columns::UTM_X)?.f64()?;
    let utm_y = df.column(columns::UTM_Y)?.f64()?;

    let hits: IdxCa = utm_x.into_iter()
        .zip(utm_y.into_iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => layer.geoms().locate(Point::new(x, y)).map(|i| i as IdxSize),
            _ => None,
        })
        .collect();

    let mut out = df.clone();
    for attr in layer.attrs().get_columns() {
        if df.column(attr.name()).is_ok() {
            continue;
        }
        out.with_column(attr.as_materialized_series().take(&hits)?)?;
    }
    Ok(out)
}

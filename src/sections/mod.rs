//! Census-section polygon layer.

mod geom;

pub use geom::Geometries;

use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use geo::MultiPolygon;
use polars::{frame::DataFrame, prelude::Column};
use shapefile::{dbase::{FieldValue, Record}, Reader, Shape};

use crate::{common::shp_to_geo, pipeline::columns};

/// Census-section polygons with one attribute row per polygon.
///
/// The attribute table always carries the section identifier; any further
/// DBF fields present in the layer snapshot (the climate zone, where the
/// layer provides it) ride along and are attached during geocoding.
pub struct SectionLayer {
    geoms: Geometries,
    attrs: DataFrame,
}

impl SectionLayer {
    /// Build a layer from parallel shape and attribute rows.
    pub fn new(shapes: Vec<MultiPolygon<f64>>, attrs: DataFrame) -> Result<Self> {
        ensure!(
            shapes.len() == attrs.height(),
            "[sections] {} shapes for {} attribute rows",
            shapes.len(),
            attrs.height()
        );
        Ok(Self { geoms: Geometries::new(shapes), attrs })
    }

    /// Loads layer geometries and attributes from a given .shp file path.
    pub fn from_shapefile(path: &Path) -> Result<Self> {
        /// Coerce a generic shape into an owned multipolygon, raising error if different shape
        fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>> {
            match shape {
                Shape::Polygon(polygon) => Ok(shp_to_geo(&polygon)),
                other => bail!("found non-Polygon shape in layer: {:?}", other.shapetype()),
            }
        }

        /// Convert a vector of records to a DataFrame
        fn records_to_dataframe(records: Vec<Record>) -> Result<DataFrame> {
            /// Get the value of a character field from a Record
            fn get_character_field(record: &Record, field: &str) -> Result<String> {
                match record.get(field) {
                    Some(FieldValue::Character(Some(s))) => Ok(s.trim().to_string()),
                    _ => bail!("missing or invalid character field: {}", field),
                }
            }

            /// Get a character field that may be absent or blank
            fn get_optional_field(record: &Record, field: &str) -> Option<String> {
                match record.get(field) {
                    Some(FieldValue::Character(Some(s))) if !s.trim().is_empty() => {
                        Some(s.trim().to_string())
                    }
                    _ => None,
                }
            }

            let mut columns = vec![Column::new(
                columns::MUNDISSEC.into(),
                records.iter()
                    .map(|record| get_character_field(record, columns::MUNDISSEC))
                    .collect::<Result<Vec<_>>>()?,
            )];
            // only some layer snapshots carry the climate zone
            if records.iter().any(|record| record.get(columns::ZONA).is_some()) {
                columns.push(Column::new(
                    columns::ZONA.into(),
                    records.iter()
                        .map(|record| get_optional_field(record, columns::ZONA))
                        .collect::<Vec<_>>(),
                ));
            }
            Ok(DataFrame::new(columns)?)
        }

        let mut reader = Reader::from_path(path)
            .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

        let size = reader.shape_count()?;

        let mut shapes: Vec<MultiPolygon<f64>> = Vec::with_capacity(size);
        let mut records: Vec<Record> = Vec::with_capacity(size);
        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result.context("Error reading shape+record")?;
            shapes.push(shape_to_multipolygon(shape)?);
            records.push(record);
        }

        Self::new(shapes, records_to_dataframe(records)?)
    }

    pub fn geoms(&self) -> &Geometries { &self.geoms }

    pub fn attrs(&self) -> &DataFrame { &self.attrs }

    pub fn len(&self) -> usize { self.geoms.len() }

    pub fn is_empty(&self) -> bool { self.geoms.is_empty() }
}

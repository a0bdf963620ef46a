//! Dense integer encoding of categorical columns.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::columns;

/// Per-field lookup from encoded value back to the original label.
///
/// Serialized alongside the record output so downstream consumers can decode
/// without re-deriving the class order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMapping(pub BTreeMap<String, BTreeMap<u32, String>>);

impl LabelMapping {
    pub fn decode(&self, field: &str, code: u32) -> Option<&str> {
        self.0.get(field)?.get(&code).map(String::as_str)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Replace each categorical column with dense codes assigned alphabetically
/// from zero. Nulls are folded into a "not defined" class first, so every row
/// carries a code. Columns missing from the frame are skipped.
pub fn encode_categoricals(df: &DataFrame) -> Result<(DataFrame, LabelMapping)> {
    let mut out = df.clone();
    let mut mapping = LabelMapping::default();

    for field in columns::COLUMNS_TO_ENCODE {
        if df.column(field).is_err() {
            continue;
        }
        let values = df.column(field)?.cast(&DataType::String)?;
        let filled: Vec<String> = values.str()?
            .into_iter()
            .map(|v| v.unwrap_or(columns::NOT_DEFINED).to_string())
            .collect();

        let classes: BTreeSet<&str> = filled.iter().map(String::as_str).collect();
        let codes: BTreeMap<&str, u32> = classes.iter()
            .enumerate()
            .map(|(i, &label)| (label, i as u32))
            .collect();

        let encoded: Vec<u32> = filled.iter().map(|label| codes[label.as_str()]).collect();
        let encoded = UInt32Chunked::from_vec(field.into(), encoded);
        out.replace_or_add(field.into(), encoded.into_series())?;

        let reverse: BTreeMap<u32, String> = codes.iter()
            .map(|(&label, &code)| (code, label.to_string()))
            .collect();
        mapping.0.insert(field.to_string(), reverse);
    }

    Ok((out, mapping))
}

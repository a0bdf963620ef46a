use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::{SerReader, SerWriter}, prelude::JsonWriter};

/// Reads a Polars DataFrame from a JSON file holding an array of records.
pub(crate) fn read_json_frame(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::json] Failed to read JSON file: {}", path.display()))?;
    let reader = BufReader::new(file);
    Ok(polars::io::json::JsonReader::new(reader).finish()?)
}

/// Writes a DataFrame as a JSON array of records into bytes.
pub(crate) fn write_json_frame_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    JsonWriter::new(&mut out)
        .with_json_format(polars::io::json::JsonFormat::Json)
        .finish(&mut df.clone())
        .context("[io::json] Failed to write JSON to bytes")?;
    Ok(out)
}

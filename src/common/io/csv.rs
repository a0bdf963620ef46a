//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader}};

/// Reads a CSV file with every column kept as String.
///
/// Geographic codes carry leading zeros, so dtype inference would corrupt them.
pub(crate) fn read_csv_untyped(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv] Failed to read CSV from {:?}", path))
}

/// Reads semicolon-separated bytes with every column kept as String,
/// skipping `skip_rows` leading lines before the header.
pub(crate) fn read_ssv_bytes(bytes: &[u8], skip_rows: usize) -> Result<DataFrame> {
    let cursor = Cursor::new(bytes);
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(skip_rows)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|po| po.with_separator(b';'));
    CsvReader::new(cursor)
        .with_options(options)
        .finish()
        .context("[io::csv] Failed to read semicolon-separated bytes")
}

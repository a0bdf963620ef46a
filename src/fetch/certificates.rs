//! Certificate records from the Catalan open-data portal.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{download_big_file, RAW_DATA_FILE};

const CERTIFICATES_URL: &str = "https://analisi.transparenciacatalunya.cat/resource/j6ii-t3w2.json";

/// Download the raw certificate dump. The portal caps responses at 1000 rows
/// unless an explicit `$limit` is passed, so one generous limit pulls the
/// whole dataset in a single request.
pub(crate) fn fetch_certificates(
    static_dir: &Path,
    limit: usize,
    force: bool,
    verbose: u8,
) -> Result<PathBuf> {
    let url = format!("{CERTIFICATES_URL}?$limit={limit}");
    let out_path = static_dir.join(RAW_DATA_FILE);

    if verbose > 0 { eprintln!("[fetch:certificates] {url} -> {}", out_path.display()); }
    download_big_file(&url, &out_path, force)?;

    Ok(out_path)
}

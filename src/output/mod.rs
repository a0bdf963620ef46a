//! Output artifacts: rendered in memory, hashed, then written atomically.

mod manifest;

use std::{collections::BTreeMap, io::Write, path::Path};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;

use crate::common::{
    ensure_dir_exists, write_json_frame_bytes, write_parquet_bytes, PendingWrite,
};
use crate::dict::MunicipiDict;
use crate::pipeline::LabelMapping;

use manifest::{file_hash, FileHash, Manifest};

pub(crate) const CERTIFICATES_FILE: &str = "certificats.parquet";
pub(crate) const LABELS_FILE: &str = "labels.json";
pub(crate) const SECTIONS_FILE: &str = "seccen.json";
pub(crate) const MUNICIPALITIES_FILE: &str = "mun.json";
pub(crate) const COMARQUES_FILE: &str = "com.json";
pub(crate) const DICT_FILE: &str = "municipis.json";
pub(crate) const MANIFEST_FILE: &str = "manifest.json";

/// Everything one pipeline run produces.
pub(crate) struct Artifacts {
    pub(crate) certificates: DataFrame,
    pub(crate) labels: LabelMapping,
    pub(crate) sections: DataFrame,
    pub(crate) municipalities: DataFrame,
    pub(crate) comarques: DataFrame,
    pub(crate) dict: MunicipiDict,
}

/// Write every artifact plus the manifest describing them. All buffers are
/// rendered and hashed before the first byte reaches disk, and every file
/// goes through a temp-file rename, so a failure part way leaves no partial
/// output behind.
pub(crate) fn write_outputs(
    out_dir: &Path,
    artifacts: &Artifacts,
    force: bool,
    verbose: u8,
) -> Result<()> {
    ensure_dir_exists(out_dir)?;

    let mut files: Vec<(&str, Vec<u8>)> = vec![
        (CERTIFICATES_FILE, write_parquet_bytes(&artifacts.certificates)?),
        (LABELS_FILE, artifacts.labels.to_json_bytes()?),
        (SECTIONS_FILE, write_json_frame_bytes(&artifacts.sections)?),
        (MUNICIPALITIES_FILE, write_json_frame_bytes(&artifacts.municipalities)?),
        (COMARQUES_FILE, write_json_frame_bytes(&artifacts.comarques)?),
        (DICT_FILE, artifacts.dict.to_json_bytes()?),
    ];

    let mut counts = BTreeMap::new();
    counts.insert("certificates".to_string(), artifacts.certificates.height());
    counts.insert("sections".to_string(), artifacts.sections.height());
    counts.insert("municipalities".to_string(), artifacts.municipalities.height());
    counts.insert("comarques".to_string(), artifacts.comarques.height());
    counts.insert("municipis".to_string(), artifacts.dict.len());

    let hashes: BTreeMap<String, FileHash> = files.iter()
        .map(|(name, bytes)| {
            let hash = FileHash { sha256: file_hash(bytes), bytes: bytes.len() as u64 };
            (name.to_string(), hash)
        })
        .collect();
    let manifest = Manifest {
        version: "1".into(),
        crs: "EPSG:25831".into(),
        counts,
        files: hashes,
    };
    files.push((MANIFEST_FILE, manifest.to_json_bytes()?));

    // stage everything before persisting anything
    let mut pending = Vec::with_capacity(files.len());
    for (name, bytes) in &files {
        let mut sink = PendingWrite::open(&out_dir.join(name), force)?;
        sink.write_all(bytes).with_context(|| format!("write {name}"))?;
        pending.push(sink);
    }
    for mut sink in pending {
        sink.finalize()?;
    }

    if verbose > 0 {
        eprintln!("[output] wrote {} artifacts to {}", files.len(), out_dir.display());
    }
    Ok(())
}

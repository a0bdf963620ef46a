//! Run manifest with per-file checksums.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Manifest {
    pub(crate) version: String,
    pub(crate) crs: String,
    pub(crate) counts: BTreeMap<String, usize>,
    pub(crate) files: BTreeMap<String, FileHash>,
}

impl Manifest {
    pub(crate) fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FileHash {
    pub(crate) sha256: String,
    pub(crate) bytes: u64,
}

pub(crate) fn file_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

//! Blocking HTTP plumbing shared by the fetchers.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::common::PendingWrite;

pub(crate) fn client() -> Result<Client> {
    Ok(Client::builder()
        .user_agent("certcat/0.1")
        .timeout(Duration::from_secs(120))
        .build()?)
}

pub(crate) fn get_text(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} returned error status"))?;
    resp.text().with_context(|| format!("read body of {url}"))
}

/// Download a large response straight to disk through an atomic rename.
pub(crate) fn download_big_file(url: &str, out_path: &Path, force: bool) -> Result<()> {
    let mut sink = PendingWrite::open(out_path, force)?;

    let mut resp = reqwest::blocking::get(url)
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} returned error status"))?;

    std::io::copy(&mut resp, &mut sink).with_context(|| format!("write {}", out_path.display()))?;

    sink.finalize()?;
    Ok(())
}

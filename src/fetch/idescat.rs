//! Census-section register and municipal population from the Idescat APIs.

use std::{collections::BTreeMap, thread, time::Duration};

use anyhow::{Context, Result};
use polars::prelude::*;
use reqwest::blocking::Client;
use serde_json::Value;

use super::get_text;
use crate::common::{read_ssv_bytes, zero_pad};
use crate::dict::PobEntry;
use crate::pipeline::columns;

const SECTIONS_URL: &str = "https://www.idescat.cat/codis/?cin=0&nom=&ambit=a&cic=0&codi=&pobi=&pobf=&id=50&n=24&inf=c&t=01-01-2024&f=ssv";

const POB_URL: &str = "https://api.idescat.cat/pob/v1/cerca.json";

/// Census-section register, with the 11-digit section code assembled from the
/// padded municipality and district/section columns.
pub(crate) fn fetch_sections_lookup(client: &Client) -> Result<DataFrame> {
    let body = get_text(client, SECTIONS_URL)?;
    let mut df = read_ssv_bytes(body.as_bytes(), 3)
        .context("parse the census-section register")?;

    let muni = df.column("Codi municipi")?.str()?.clone();
    let districte = df.column("Districte/Secció")?.str()?.clone();
    let mundissec: StringChunked = muni.into_iter()
        .zip(districte.into_iter())
        .map(|(m, d)| match (m, d) {
            (Some(m), Some(d)) => Some(format!("{}{}", zero_pad(m, 6), zero_pad(d, 5))),
            _ => None,
        })
        .collect();
    let mundissec = mundissec.with_name(columns::MUNDISSEC.into());
    df.replace_or_add(columns::MUNDISSEC.into(), mundissec.into_series())?;
    Ok(df)
}

/// Lookup from the short section code some income tables key by (the sixth
/// digit from the right dropped) back to the full code. The first section to
/// claim a short code keeps it.
pub(crate) fn short_code_map(lookup: &DataFrame) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    let codes = lookup.column(columns::MUNDISSEC)?.str()?;
    for code in codes.into_iter().flatten() {
        if code.len() < 6 {
            continue;
        }
        let cut = code.len() - 6;
        if let (Some(head), Some(tail)) = (code.get(..cut), code.get(cut + 1..)) {
            map.entry(format!("{head}{tail}")).or_insert_with(|| code.to_string());
        }
    }
    Ok(map)
}

/// Walk the paginated municipal population search, fifty entries at a time,
/// until a page comes back empty.
pub(crate) fn fetch_municipal_population(client: &Client, verbose: u8) -> Result<Vec<PobEntry>> {
    let mut entries = Vec::new();
    let mut posicio = 0usize;
    loop {
        let url = format!("{POB_URL}?p=tipus/mun;posicio/{posicio}");
        if verbose > 0 { eprintln!("[fetch:municipis] {url}"); }
        let body = get_text(client, &url)?;
        let page: Value = serde_json::from_str(&body)
            .with_context(|| format!("parse population page at position {posicio}"))?;

        let page_entries = match page.pointer("/feed/entry").and_then(Value::as_array) {
            Some(list) if !list.is_empty() => list,
            _ => break,
        };
        for entry in page_entries {
            if let Some(pob) = entry_to_pob(entry) {
                entries.push(pob);
            }
        }

        posicio += 50;
        thread::sleep(Duration::from_millis(300));
    }
    Ok(entries)
}

/// One feed entry to a population row. The total-population observation is
/// the one flagged `SEX == "T"`; entries without a municipality code are
/// dropped.
fn entry_to_pob(entry: &Value) -> Option<PobEntry> {
    fn as_code(v: &Value) -> Option<String> {
        match v {
            Value::String(s) => Some(zero_pad(s, 6)),
            Value::Number(n) => n.as_i64().map(|n| format!("{n:06}")),
            _ => None,
        }
    }
    fn as_count(v: &Value) -> Option<i64> {
        match v {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    let nom = entry.get("title")?.as_str()?.to_string();
    let section = entry.pointer("/cross:DataSet/cross:Section")?;
    let codi = section.get("AREA").and_then(as_code)?;
    let poblacio = section.get("cross:Obs")
        .and_then(Value::as_array)
        .and_then(|obs| {
            obs.iter()
                .find(|o| o.get("SEX").and_then(Value::as_str) == Some("T"))
                .and_then(|o| o.get("OBS_VALUE").and_then(as_count))
        });

    Some(PobEntry { nom, codi, poblacio })
}

//! Household income indicators from the INE statistics API.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::*;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::get_text;
use crate::pipeline::columns;

/// Experimental household-income tables, one per indicator family.
const INCOME_TABLE_CODES: [u32; 4] = [30896, 31079, 31016, 31223];

const INE_URL: &str = "https://servicios.ine.es/wstempus/js/ES/DATOS_TABLA";

#[derive(Debug, Deserialize)]
struct IneSeries {
    #[serde(rename = "MetaData", default)]
    meta: Vec<IneMeta>,
    #[serde(rename = "Data", default)]
    data: Vec<IneDatum>,
}

#[derive(Debug, Deserialize)]
struct IneMeta {
    #[serde(rename = "T3_Variable")]
    variable: Option<String>,
    #[serde(rename = "Codigo")]
    codigo: Option<String>,
    #[serde(rename = "Nombre")]
    nombre: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IneDatum {
    #[serde(rename = "Anyo")]
    year: Option<i64>,
    #[serde(rename = "Valor")]
    value: Option<f64>,
}

/// Pull every income table and flatten its census-section series into
/// (section, indicator, year, value) rows.
pub(crate) fn fetch_income(
    client: &Client,
    short_codes: &BTreeMap<String, String>,
    verbose: u8,
) -> Result<DataFrame> {
    let mut sections: Vec<String> = Vec::new();
    let mut indicators: Vec<String> = Vec::new();
    let mut years: Vec<Option<i64>> = Vec::new();
    let mut values: Vec<Option<f64>> = Vec::new();

    for code in INCOME_TABLE_CODES {
        let url = format!("{INE_URL}/{code}?tip=AM");
        if verbose > 0 { eprintln!("[fetch:income] {url}"); }
        let body = get_text(client, &url)?;
        let series: Vec<IneSeries> = serde_json::from_str(&body)
            .with_context(|| format!("parse INE table {code}"))?;
        flatten_series(&series, short_codes, &mut sections, &mut indicators, &mut years, &mut values);
    }

    Ok(DataFrame::new(vec![
        Column::new(columns::MUNDISSEC.into(), sections),
        Column::new("indicador".into(), indicators),
        Column::new("any".into(), years),
        Column::new("valor".into(), values),
    ])?)
}

/// Keep the series whose leading metadata names a census section; expand
/// short section codes through the lookup, and take the indicator name from
/// the accounting-balance metadata entry.
fn flatten_series(
    series: &[IneSeries],
    short_codes: &BTreeMap<String, String>,
    sections: &mut Vec<String>,
    indicators: &mut Vec<String>,
    years: &mut Vec<Option<i64>>,
    values: &mut Vec<Option<f64>>,
) {
    for serie in series {
        let head = match serie.meta.first() {
            Some(head) if head.variable.as_deref() == Some("Secciones") => head,
            _ => continue,
        };
        let codigo = match head.codigo.as_deref() {
            Some(codigo) => codigo,
            None => continue,
        };
        let mundissec = short_codes.get(codigo).cloned().unwrap_or_else(|| codigo.to_string());

        let indicator = serie.meta.iter()
            .find(|m| m.variable.as_deref() == Some("SALDOS CONTABLES"))
            .and_then(|m| m.nombre.clone());
        let indicator = match indicator {
            Some(indicator) => indicator,
            None => continue,
        };

        for datum in &serie.data {
            sections.push(mundissec.clone());
            indicators.push(indicator.clone());
            years.push(datum.year);
            values.push(datum.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{flatten_series, IneSeries};

    const SAMPLE: &str = r#"[
        {
            "MetaData": [
                {"T3_Variable": "Secciones", "Codigo": "0801901001", "Nombre": "Barcelona seccion 01001"},
                {"T3_Variable": "SALDOS CONTABLES", "Codigo": "RNMP", "Nombre": "Renta neta media por persona"}
            ],
            "Data": [
                {"Anyo": 2022, "Valor": 16000.0},
                {"Anyo": 2021, "Valor": 15500.0}
            ]
        },
        {
            "MetaData": [
                {"T3_Variable": "Municipios", "Codigo": "08019", "Nombre": "Barcelona"}
            ],
            "Data": [{"Anyo": 2022, "Valor": 1.0}]
        }
    ]"#;

    #[test]
    fn section_series_flatten_through_the_short_code_map() {
        let series: Vec<IneSeries> = serde_json::from_str(SAMPLE).unwrap();
        let mut short_codes = BTreeMap::new();
        short_codes.insert("0801901001".to_string(), "08019301001".to_string());

        let (mut s, mut i, mut y, mut v) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        flatten_series(&series, &short_codes, &mut s, &mut i, &mut y, &mut v);

        // the municipality-level series stays out
        assert_eq!(s, vec!["08019301001", "08019301001"]);
        assert_eq!(i[0], "Renta neta media por persona");
        assert_eq!(y, vec![Some(2022), Some(2021)]);
        assert_eq!(v, vec![Some(16000.0), Some(15500.0)]);
    }

    #[test]
    fn unknown_short_codes_pass_through_unchanged() {
        let series: Vec<IneSeries> = serde_json::from_str(SAMPLE).unwrap();
        let short_codes = BTreeMap::new();

        let (mut s, mut i, mut y, mut v) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
        flatten_series(&series, &short_codes, &mut s, &mut i, &mut y, &mut v);

        assert_eq!(s[0], "0801901001");
    }
}

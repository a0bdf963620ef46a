//! Geographic code regeneration from the section identifier.

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::*;

use crate::{common::code_prefix, dict::MunicipiDict};

use super::columns;

/// Regenerate the code hierarchy from the 11-digit section code: the
/// municipality code is its first 6 characters, the province code the first
/// 2 (string-prefix contract). Comarca codes and display names come from the
/// reference dictionary; unresolvable municipalities keep their rows under
/// sentinel values. The climate zone is replaced by the per-municipality
/// consensus value.
pub(crate) fn regenerate_codes(df: &DataFrame, dict: &MunicipiDict) -> Result<DataFrame> {
    let mundissec = df.column(columns::MUNDISSEC)?.str()?.clone();

    let municipality: StringChunked = mundissec.into_iter()
        .map(|opt| opt.map(|s| code_prefix(s, 6).to_string()))
        .collect();

    let province: StringChunked = municipality.into_iter()
        .map(|opt| opt.map(|s| code_prefix(s, 2).to_string()))
        .collect();

    let comarca_codes: StringChunked = municipality.into_iter()
        .map(|opt| opt.map(|codi| match dict.get(codi) {
            Some(m) => m.codi_comarca.clone(),
            None => columns::SENTINEL_CODE.to_string(),
        }))
        .collect();

    let municipi_names: StringChunked = municipality.into_iter()
        .map(|opt| opt.map(|codi| match dict.get(codi) {
            Some(m) => m.nom.clone(),
            None => columns::SENTINEL_NAME.to_string(),
        }))
        .collect();

    let comarca_names: StringChunked = municipality.into_iter()
        .map(|opt| opt.map(|codi| match dict.get(codi) {
            Some(m) => m.comarca.clone(),
            None => columns::SENTINEL_NAME.to_string(),
        }))
        .collect();

    let province_names: StringChunked = province.into_iter()
        .map(|opt| opt.map(|codi| {
            columns::province_name(codi).unwrap_or(columns::SENTINEL_NAME).to_string()
        }))
        .collect();

    // municipality-level consensus overwrites per-record climate noise
    let zones = df.column(columns::ZONA)?.cast(&DataType::String)?;
    let modes = municipality_zone_modes(&municipality, zones.str()?);
    let zona: StringChunked = municipality.into_iter()
        .map(|opt| opt.and_then(|codi| modes.get(codi).cloned()))
        .collect();

    let mut out = df.clone();
    out.replace_or_add(columns::CODI_POBLACIO.into(), municipality.with_name(columns::CODI_POBLACIO.into()).into_series())?;
    out.replace_or_add(columns::CODI_COMARCA.into(), comarca_codes.with_name(columns::CODI_COMARCA.into()).into_series())?;
    out.replace_or_add(columns::CODI_PROVINCIA.into(), province.with_name(columns::CODI_PROVINCIA.into()).into_series())?;
    out.replace_or_add(columns::MUNICIPI.into(), municipi_names.with_name(columns::MUNICIPI.into()).into_series())?;
    out.replace_or_add(columns::COMARCA.into(), comarca_names.with_name(columns::COMARCA.into()).into_series())?;
    out.replace_or_add(columns::PROVINCIA.into(), province_names.with_name(columns::PROVINCIA.into()).into_series())?;
    out.replace_or_add(columns::ZONA.into(), zona.with_name(columns::ZONA.into()).into_series())?;
    Ok(out)
}

/// Mode of the climate zone per municipality, ties resolved in favor of the
/// value encountered first in frame order. Municipalities without a non-null
/// zone get no entry.
fn municipality_zone_modes(
    municipality: &StringChunked,
    zones: &StringChunked,
) -> HashMap<String, String> {
    // zone counts per municipality, kept in encounter order
    let mut counts: HashMap<String, Vec<(String, usize)>> = HashMap::new();
    for (muni, zone) in municipality.into_iter().zip(zones.into_iter()) {
        if let (Some(muni), Some(zone)) = (muni, zone) {
            let entry = counts.entry(muni.to_string()).or_default();
            match entry.iter_mut().find(|(z, _)| z.as_str() == zone) {
                Some((_, n)) => *n += 1,
                None => entry.push((zone.to_string(), 1)),
            }
        }
    }

    let mut modes = HashMap::new();
    for (muni, zone_counts) in counts {
        let mut best: Option<(&String, usize)> = None;
        for (zone, n) in &zone_counts {
            if best.map_or(true, |(_, bn)| *n > bn) {
                best = Some((zone, *n));
            }
        }
        if let Some((zone, _)) = best {
            modes.insert(muni, zone.clone());
        }
    }
    modes
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataFrame};

    use super::regenerate_codes;
    use crate::dict::MunicipiDict;

    fn dict() -> MunicipiDict {
        let df = DataFrame::new(vec![
            Column::new("Nivell".into(), ["Comarca", "Municipi"]),
            Column::new("Codi".into(), ["13", "80193"]),
            Column::new("Nom".into(), ["Comarca X", "Vila A"]),
        ]).unwrap();
        MunicipiDict::from_frame(&df).unwrap()
    }

    fn frame(mundissec: &[&str], zones: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![
            Column::new("MUNDISSEC".into(), mundissec),
            Column::new("zona_climatica".into(), zones),
            Column::new("codi_poblacio".into(), vec![0i64; mundissec.len()]),
            Column::new("codi_comarca".into(), vec![0i64; mundissec.len()]),
            Column::new("codi_provincia".into(), vec![0i64; mundissec.len()]),
        ]).unwrap()
    }

    #[test]
    fn regenerates_the_code_hierarchy() {
        let out = regenerate_codes(&frame(&["08019301001"], &[Some("C2")]), &dict()).unwrap();
        assert_eq!(out.column("codi_poblacio").unwrap().str().unwrap().get(0), Some("080193"));
        assert_eq!(out.column("codi_comarca").unwrap().str().unwrap().get(0), Some("13"));
        assert_eq!(out.column("codi_provincia").unwrap().str().unwrap().get(0), Some("08"));
        assert_eq!(out.column("municipi").unwrap().str().unwrap().get(0), Some("Vila A"));
        assert_eq!(out.column("comarca").unwrap().str().unwrap().get(0), Some("Comarca X"));
        assert_eq!(out.column("provincia").unwrap().str().unwrap().get(0), Some("Barcelona"));
    }

    #[test]
    fn unknown_municipality_keeps_row_under_sentinels() {
        let out = regenerate_codes(&frame(&["25001201001"], &[None]), &dict()).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(out.column("codi_comarca").unwrap().str().unwrap().get(0), Some("0"));
        assert_eq!(out.column("municipi").unwrap().str().unwrap().get(0), Some("unknown"));
        assert_eq!(out.column("comarca").unwrap().str().unwrap().get(0), Some("unknown"));
        assert_eq!(out.column("provincia").unwrap().str().unwrap().get(0), Some("Lleida"));
    }

    #[test]
    fn derivation_is_idempotent() {
        let once = regenerate_codes(&frame(&["08019301001", "08019302005"], &[Some("C2"), Some("C2")]), &dict()).unwrap();
        let twice = regenerate_codes(&once, &dict()).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn string_prefix_matches_integer_division() {
        let section = "08019301001";
        let out = regenerate_codes(&frame(&[section], &[None]), &dict()).unwrap();
        let muni = out.column("codi_poblacio").unwrap().str().unwrap().get(0).unwrap().to_string();
        let prov = out.column("codi_provincia").unwrap().str().unwrap().get(0).unwrap().to_string();

        // the legacy floor-division derivation of earlier revisions
        let as_int: u64 = section.parse().unwrap();
        assert_eq!(muni, format!("{:06}", as_int / 100_000));
        assert_eq!(prov, format!("{:02}", as_int / 100_000 / 10_000));
    }

    #[test]
    fn climate_zone_is_the_municipality_mode() {
        let out = regenerate_codes(
            &frame(
                &["08019301001", "08019301002", "08019301003"],
                &[Some("A"), Some("A"), Some("B")],
            ),
            &dict(),
        ).unwrap();
        let zones = out.column("zona_climatica").unwrap().str().unwrap();
        for i in 0..3 {
            assert_eq!(zones.get(i), Some("A"));
        }
    }

    #[test]
    fn climate_tie_goes_to_first_encountered() {
        let out = regenerate_codes(
            &frame(
                &["08019301001", "08019301002", "08019301003", "08019301004"],
                &[Some("B"), Some("A"), Some("A"), Some("B")],
            ),
            &dict(),
        ).unwrap();
        assert_eq!(out.column("zona_climatica").unwrap().str().unwrap().get(0), Some("B"));
    }

    #[test]
    fn all_null_zones_stay_null() {
        let out = regenerate_codes(&frame(&["08019301001", "08019301002"], &[None, None]), &dict()).unwrap();
        let zones = out.column("zona_climatica").unwrap();
        assert_eq!(zones.null_count(), 2);
    }
}

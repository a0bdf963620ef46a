//! Canonical column names and fixed vocabularies of the certificate table.

pub(crate) const UTM_X: &str = "utm_x";
pub(crate) const UTM_Y: &str = "utm_y";
pub(crate) const DATA_ENTRADA: &str = "data_entrada";
pub(crate) const MUNDISSEC: &str = "MUNDISSEC";
pub(crate) const CODI_POBLACIO: &str = "codi_poblacio";
pub(crate) const CODI_COMARCA: &str = "codi_comarca";
pub(crate) const CODI_PROVINCIA: &str = "codi_provincia";
pub(crate) const METRES: &str = "metres_cadastre";
pub(crate) const EMISSIONS: &str = "emissions_de_co2";
pub(crate) const ENERGIA: &str = "energia_primaria";
pub(crate) const COST: &str = "cost_energia";
pub(crate) const QUAL_ENERGIA: &str = "qual_energia";
pub(crate) const QUAL_EMISSIONS: &str = "qual_emissions";
pub(crate) const MOTIU: &str = "motiu";
pub(crate) const US_EDIFICI: &str = "us_edifici";
pub(crate) const EINA: &str = "eina";
pub(crate) const ZONA: &str = "zona_climatica";

/// Display-name columns backfilled from the reference dictionary.
pub(crate) const MUNICIPI: &str = "municipi";
pub(crate) const COMARCA: &str = "comarca";
pub(crate) const PROVINCIA: &str = "provincia";

/// Key columns of the aggregated datasets, matching the map-tileset ids.
pub(crate) const CODIMUNI: &str = "CODIMUNI";
pub(crate) const CODICOMAR: &str = "CODICOMAR";

/// Legacy column names folded into canonical ones, applied only when the
/// source column is present (the raw schema varies by revision).
pub(crate) const RENAMINGS: [(&str, &str); 6] = [
    ("qualificaci_de_consum_d", QUAL_ENERGIA),
    ("qualificaci_emissions", QUAL_EMISSIONS),
    ("motiu_de_la_certificacio", MOTIU),
    ("eina_de_certificacio", EINA),
    ("consum_d_energia_prim_ria", ENERGIA),
    ("cost_anual_d_energia", COST),
];

/// Projection applied after renaming; a missing column here is schema drift
/// and aborts the run.
pub(crate) const COLUMNS_IN_USE: [&str; 15] = [
    CODI_POBLACIO,
    CODI_COMARCA,
    CODI_PROVINCIA,
    MUNDISSEC,
    METRES,
    EMISSIONS,
    ENERGIA,
    COST,
    QUAL_ENERGIA,
    QUAL_EMISSIONS,
    DATA_ENTRADA,
    MOTIU,
    US_EDIFICI,
    EINA,
    ZONA,
];

/// Free-text fields mapped to dense integers for the record-level output.
pub(crate) const COLUMNS_TO_ENCODE: [&str; 3] = [EINA, MOTIU, US_EDIFICI];

/// Label substituted for null categorical values before encoding.
pub(crate) const NOT_DEFINED: &str = "not defined";

/// Sentinels for geography that the reference dictionary cannot resolve.
pub(crate) const SENTINEL_CODE: &str = "0";
pub(crate) const SENTINEL_NAME: &str = "unknown";

/// Ordinal equivalence of the quality letter grades.
pub(crate) fn grade_ordinal(grade: &str) -> Option<i64> {
    match grade {
        "A" => Some(1),
        "B" => Some(2),
        "C" => Some(3),
        "D" => Some(4),
        "E" => Some(5),
        "F" => Some(6),
        "G" => Some(7),
        _ => None,
    }
}

/// Province display names keyed by the 2-digit province code.
pub(crate) fn province_name(code: &str) -> Option<&'static str> {
    match code {
        "08" => Some("Barcelona"),
        "17" => Some("Girona"),
        "25" => Some("Lleida"),
        "43" => Some("Tarragona"),
        _ => None,
    }
}

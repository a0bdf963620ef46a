//! Canonicalization of bilingual and legacy free-text labels.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use polars::prelude::*;

use super::columns;

/// One rewrite rule: any of `variants` in `field` becomes `canonical`.
pub(crate) struct LabelRule {
    pub(crate) field: &'static str,
    pub(crate) canonical: &'static str,
    pub(crate) variants: &'static [&'static str],
}

/// Rules are applied in listed order; when variant lists overlap, the last
/// matching rule wins.
pub(crate) const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        field: columns::US_EDIFICI,
        canonical: "Terciari",
        variants: &["Terciario"],
    },
    LabelRule {
        field: columns::US_EDIFICI,
        canonical: "Bloc d'habitatges",
        variants: &["Bloque de viviendas"],
    },
    LabelRule {
        field: columns::US_EDIFICI,
        canonical: "Bloc d'habitatges plurifamiliar",
        variants: &["Bloque de viviendas plurifamiliar"],
    },
    LabelRule {
        field: columns::US_EDIFICI,
        canonical: "Habitatge unifamiliar",
        variants: &["Vivienda unifamiliar", "Habitatge Unifamiliar"],
    },
    LabelRule {
        field: columns::US_EDIFICI,
        canonical: "Habitatge individual en bloc d'habitatges",
        variants: &["Vivienda individual en bloque de viviendas"],
    },
    LabelRule {
        field: columns::MOTIU,
        canonical: "Lloguer",
        variants: &["Alquiler"],
    },
    LabelRule {
        field: columns::MOTIU,
        canonical: "Sol·licitud d'ajuts",
        variants: &["Solicitud de ayudas"],
    },
    LabelRule {
        field: columns::MOTIU,
        canonical: "Compravenda",
        variants: &["Compra o Venda", "Compra o Venta"],
    },
    LabelRule {
        field: columns::MOTIU,
        canonical: "Certificació voluntària",
        variants: &["Certificación voluntaria", "Certificació voluntaria"],
    },
    LabelRule {
        field: columns::MOTIU,
        canonical: "Altres (cap de les anteriores opcions)",
        variants: &[
            "Otros (ninguna de las anteriores opciones)",
            "Nova construcció o gran rehabilitació",
            "Nova construcció",
            "Nueva construcción",
            "Nueva construcción  o gran rehabilitación",
            "Nova construcció - ampliació amb entitat jurídica independent",
            "Nueva construcción - ampliación con entidad jurídica independiente",
            "Renovació (en cas de caducitat de l'antic certificat energètic)",
            "Renovación (en caso de caducidad del antiguo certificado energético)",
            "Edifici existent de l\u{2019}administració pública",
            "Edifici existent de l¿administració pública",
            "Edificio existente de la administración pública",
            "Edificis o parts d\u{2019}edificis on es realitzin reformes o ampliacions",
            "Edificis o parts d¿edificis on es realitzin reformes o ampliacions",
            "Edificios o partes de edificis en los que se realicen reformas o ampliaciones",
            "Complement a informe d\u{2019}avaluació de l\u{2019}edifici (IEE) o a inspecció tècnica de l\u{2019}edifici (ITE)",
            "Complement a informe d¿avaluació de l¿edifici (IEE) o a inspecció tècnica de l¿edifici (ITE)",
            "Complemento al informe de evaluación del edificio (IEE) o a inspección técnica del edificio (ITE)",
            "Complement a informe davaluació de l\u{2019}edifici (IEE) o a inspecció tècnica de l\u{2019}edifici (ITE)",
            "Edificis o parts d\u{2019}edificis (+500 m2) amb ús administratiu, sanitari, comercial, docent, restauració",
            "Edificis o parts d¿edificis (+500 m2) amb ús administratiu, sanitari, comercial, docent, restauració",
            "Edificios o partes de edificios (+500 m2) de uso administrativo, sanitario, comercial, docente, restauración...",
            "Edificis o parts d'edificis (+500 m2) amb ús administratiu, sanitari, comercial, docent, restauració",
            "Informe d'avaluació de l'Edifici (IEE)",
            "Informe de evaluación del Edificio (IEE)",
        ],
    },
];

/// Rewrite every variant label to its canonical form.
pub(crate) fn unify_labels(df: &DataFrame) -> Result<DataFrame> {
    apply_rules(df, LABEL_RULES)
}

fn apply_rules(df: &DataFrame, rules: &[LabelRule]) -> Result<DataFrame> {
    // one flat table per field, later rules overwriting earlier entries for
    // the same variant; values are rewritten in a single pass so a rewrite
    // never feeds another rule
    let mut tables: BTreeMap<&str, HashMap<&str, &str>> = BTreeMap::new();
    for rule in rules {
        let table = tables.entry(rule.field).or_default();
        for variant in rule.variants {
            table.insert(variant, rule.canonical);
        }
    }

    let mut out = df.clone();
    for (field, table) in &tables {
        let rewritten: StringChunked = out.column(field)?.str()?
            .into_iter()
            .map(|opt| opt.map(|s| table.get(s).copied().unwrap_or(s).to_string()))
            .collect();
        let rewritten = rewritten.with_name((*field).into());
        out.replace_or_add((*field).into(), rewritten.into_series())?;
    }
    Ok(out)
}

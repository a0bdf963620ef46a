// Integration tests for the full cleaning pipeline over a synthetic section
// layer: validity filter, spatial join, code regeneration, label
// unification, encoding and the per-level aggregates.

use certcat::{
    aggregate_by_level, encode_categoricals, run_pipeline, AggregateLevel, GradePolicy,
    MunicipiDict, OutlierPolicy, PipelineOptions, SectionLayer,
};
use chrono::NaiveDate;
use geo::{LineString, MultiPolygon, Polygon};
use polars::prelude::{Column, DataFrame};

fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]),
        vec![],
    )
    .into()
}

fn layer() -> SectionLayer {
    let attrs = DataFrame::new(vec![Column::new(
        "MUNDISSEC".into(),
        ["08019301001", "08019301002"],
    )])
    .unwrap();
    SectionLayer::new(vec![square(0.0, 0.0, 10.0), square(20.0, 20.0, 10.0)], attrs).unwrap()
}

fn dict() -> MunicipiDict {
    let df = DataFrame::new(vec![
        Column::new("Nivell".into(), ["Comarca", "Municipi"]),
        Column::new("Codi".into(), ["13", "80193"]),
        Column::new("Nom".into(), ["Barcelonès", "Barcelona"]),
    ])
    .unwrap();
    MunicipiDict::from_frame(&df).unwrap()
}

/// Three raw records as the portal serves them (everything a string): two
/// locatable ones and one without coordinates. The third exercises the
/// validity filter, the first two the legacy renames and label variants.
fn raw_records() -> DataFrame {
    DataFrame::new(vec![
        Column::new("utm_x".into(), [Some("5.0"), Some("25.0"), None]),
        Column::new("utm_y".into(), [Some("5.0"), Some("25.0"), Some("5.0")]),
        Column::new(
            "data_entrada".into(),
            [
                "2015-03-12T00:00:00.000",
                "2019-07-05T00:00:00.000",
                "2020-01-15T00:00:00.000",
            ],
        ),
        Column::new("codi_poblacio".into(), ["80193", "80193", "80193"]),
        Column::new("codi_comarca".into(), ["13", "13", "13"]),
        Column::new("codi_provincia".into(), ["8", "8", "8"]),
        Column::new("metres_cadastre".into(), ["100", "200", "300"]),
        Column::new("emissions_de_co2".into(), ["40", "40", "40"]),
        Column::new("consum_d_energia_prim_ria".into(), ["150", "250", "350"]),
        Column::new("cost_anual_d_energia".into(), ["600", "900", "1200"]),
        Column::new("qualificaci_de_consum_d".into(), ["A", "B", "C"]),
        Column::new("qualificaci_emissions".into(), ["B", "C", "D"]),
        Column::new(
            "motiu_de_la_certificacio".into(),
            ["Alquiler", "Lloguer", "Venda"],
        ),
        Column::new(
            "us_edifici".into(),
            ["Vivienda unifamiliar", "Habitatge unifamiliar", "Terciari"],
        ),
        Column::new("eina_de_certificacio".into(), ["CE3X", "CE3X", "CEX"]),
        Column::new("zona_climatica".into(), ["C2", "C2", "D1"]),
    ])
    .unwrap()
}

fn options() -> PipelineOptions {
    PipelineOptions {
        grades: GradePolicy::Letters,
        outliers: OutlierPolicy::Percentile,
        verbose: 0,
    }
}

#[test]
fn pipeline_cleans_and_regenerates_geography() {
    let cleaned = run_pipeline(&raw_records(), &layer(), &dict(), &options()).unwrap();

    // the record without coordinates is gone
    assert_eq!(cleaned.height(), 2);

    let sections = cleaned.column("MUNDISSEC").unwrap().str().unwrap();
    assert_eq!(sections.get(0), Some("08019301001"));
    assert_eq!(sections.get(1), Some("08019301002"));

    // the code hierarchy comes from the section id, not the raw columns
    let municipality = cleaned.column("codi_poblacio").unwrap().str().unwrap();
    assert_eq!(municipality.get(0), Some("080193"));
    let comarca = cleaned.column("codi_comarca").unwrap().str().unwrap();
    assert_eq!(comarca.get(0), Some("13"));
    let province = cleaned.column("codi_provincia").unwrap().str().unwrap();
    assert_eq!(province.get(0), Some("08"));

    let noms = cleaned.column("municipi").unwrap().str().unwrap();
    assert_eq!(noms.get(0), Some("Barcelona"));
    let comarques = cleaned.column("comarca").unwrap().str().unwrap();
    assert_eq!(comarques.get(0), Some("Barcelonès"));
    let provincies = cleaned.column("provincia").unwrap().str().unwrap();
    assert_eq!(provincies.get(1), Some("Barcelona"));

    // entry dates floor to the month start
    let dates: Vec<_> = cleaned
        .column("data_entrada")
        .unwrap()
        .date()
        .unwrap()
        .as_date_iter()
        .collect();
    assert_eq!(dates[0], NaiveDate::from_ymd_opt(2015, 3, 1));
    assert_eq!(dates[1], NaiveDate::from_ymd_opt(2019, 7, 1));

    // Spanish label variants fold into the canonical Catalan ones
    let motiu = cleaned.column("motiu").unwrap().str().unwrap();
    assert_eq!(motiu.get(0), Some("Lloguer"));
    assert_eq!(motiu.get(1), Some("Lloguer"));
    let us = cleaned.column("us_edifici").unwrap().str().unwrap();
    assert_eq!(us.get(0), Some("Habitatge unifamiliar"));

    // letter grades pass through untouched
    let qual = cleaned.column("qual_energia").unwrap().str().unwrap();
    assert_eq!(qual.get(0), Some("A"));
    assert_eq!(qual.get(1), Some("B"));

    // both records share the municipality climate zone
    let zona = cleaned.column("zona_climatica").unwrap().str().unwrap();
    assert_eq!(zona.get(0), Some("C2"));
    assert_eq!(zona.get(1), Some("C2"));
}

#[test]
fn encoded_output_round_trips_through_the_label_mapping() {
    let cleaned = run_pipeline(&raw_records(), &layer(), &dict(), &options()).unwrap();
    let (encoded, labels) = encode_categoricals(&cleaned).unwrap();

    for field in ["eina", "motiu", "us_edifici"] {
        let originals = cleaned.column(field).unwrap().str().unwrap();
        let codes = encoded.column(field).unwrap().u32().unwrap();
        for (original, code) in originals.into_iter().zip(codes.into_iter()) {
            let decoded = labels.decode(field, code.unwrap()).unwrap();
            assert_eq!(Some(decoded), original);
        }
    }
}

#[test]
fn aggregates_preserve_the_record_count_per_level() {
    let cleaned = run_pipeline(&raw_records(), &layer(), &dict(), &options()).unwrap();

    let com = aggregate_by_level(&cleaned, AggregateLevel::Comarca, None).unwrap();
    assert_eq!(com.height(), 1);
    assert_eq!(com.column("CODICOMAR").unwrap().str().unwrap().get(0), Some("13"));
    assert_eq!(com.column("count").unwrap().u32().unwrap().get(0), Some(2));

    let mun = aggregate_by_level(&cleaned, AggregateLevel::Municipality, None).unwrap();
    assert_eq!(mun.height(), 1);
    assert_eq!(mun.column("CODIMUNI").unwrap().str().unwrap().get(0), Some("080193"));

    let sec = aggregate_by_level(&cleaned, AggregateLevel::Section, None).unwrap();
    let total: u32 = sec.column("count").unwrap().u32().unwrap().into_iter().flatten().sum();
    assert_eq!(total as usize, cleaned.height());
}

#[test]
fn section_aggregate_outer_joins_the_income_indicators() {
    let cleaned = run_pipeline(&raw_records(), &layer(), &dict(), &options()).unwrap();

    let income = DataFrame::new(vec![
        Column::new("MUNDISSEC".into(), ["08019301001", "43999999999"]),
        Column::new("renda_2022".into(), [16000.0, 12000.0]),
    ])
    .unwrap();
    let sec = aggregate_by_level(&cleaned, AggregateLevel::Section, Some(&income)).unwrap();

    // two observed sections plus the income-only one
    assert_eq!(sec.height(), 3);
    let renda = sec.column("renda_2022").unwrap().f64().unwrap();
    assert_eq!(renda.get(0), Some(16000.0));
    assert_eq!(renda.get(1), None);
    let count = sec.column("count").unwrap().u32().unwrap();
    assert_eq!(count.get(2), None);
}

//! Reference dictionary of municipalities and their comarques.
//!
//! Built from the Idescat administrative table, where each "Comarca" row is
//! followed by the "Municipi" rows it contains. The dictionary resolves a
//! 6-digit municipality code to names and the parent comarca code.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};

use crate::common::{read_csv_untyped, zero_pad};

/// One municipality entry of the reference dictionary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Municipi {
    pub codi: String,
    pub nom: String,
    pub codi_comarca: String,
    pub comarca: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poblacio: Option<i64>,
}

/// One municipality row of the Idescat population service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PobEntry {
    pub nom: String,
    pub codi: String,
    pub poblacio: Option<i64>,
}

/// Lookup from 6-digit municipality code to [`Municipi`].
#[derive(Clone, Debug, Default)]
pub struct MunicipiDict {
    entries: BTreeMap<String, Municipi>,
}

impl MunicipiDict {
    /// Build the dictionary from the comarques CSV table.
    pub fn from_comarques_csv(path: &Path) -> Result<Self> {
        let df = read_csv_untyped(path)
            .with_context(|| format!("[dict] Failed to read comarques table {}", path.display()))?;
        Self::from_frame(&df)
    }

    /// Build the dictionary by folding over {Nivell, Codi, Nom} rows.
    ///
    /// Comarca rows update the running comarca; municipality rows attach to
    /// it. Municipality rows before the first comarca row have no parent and
    /// are skipped, matching the upstream ordering contract.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let nivells = df.column("Nivell")?.str()?;
        let codis = df.column("Codi")?.str()?;
        let noms = df.column("Nom")?.str()?;

        let mut entries = BTreeMap::new();
        let mut current: Option<(String, String)> = None; // (codi_comarca, comarca)
        for i in 0..df.height() {
            let (nivell, codi, nom) = match (nivells.get(i), codis.get(i), noms.get(i)) {
                (Some(a), Some(b), Some(c)) => (a, b, c),
                _ => continue,
            };
            match nivell {
                "Comarca" => current = Some((zero_pad(codi, 2), nom.to_string())),
                "Municipi" => {
                    if let Some((codi_comarca, comarca)) = &current {
                        let codi = zero_pad(codi, 6);
                        entries.insert(codi.clone(), Municipi {
                            codi,
                            nom: nom.to_string(),
                            codi_comarca: codi_comarca.clone(),
                            comarca: comarca.clone(),
                            poblacio: None,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(Self { entries })
    }

    /// Load a previously persisted dictionary dump.
    pub fn load_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("[dict] Failed to read dictionary {}", path.display()))?;
        let list: Vec<Municipi> = serde_json::from_str(&text)
            .with_context(|| format!("[dict] Failed to parse dictionary {}", path.display()))?;
        let entries = list.into_iter().map(|m| (m.codi.clone(), m)).collect();
        Ok(Self { entries })
    }

    /// Serialize the dictionary as a JSON array of municipality records.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let list: Vec<&Municipi> = self.entries.values().collect();
        Ok(serde_json::to_vec_pretty(&list)?)
    }

    /// Look up a municipality by its 6-digit code.
    pub fn get(&self, codi: &str) -> Option<&Municipi> {
        self.entries.get(codi)
    }

    /// Attach population counts from the Idescat population service.
    /// Returns the number of municipalities matched.
    pub fn merge_population(&mut self, entries: &[PobEntry]) -> usize {
        let mut merged = 0;
        for pob in entries {
            if let Some(municipi) = self.entries.get_mut(&zero_pad(&pob.codi, 6)) {
                municipi.poblacio = pob.poblacio;
                merged += 1;
            }
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = &Municipi> {
        self.entries.values()
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataFrame};

    use super::{MunicipiDict, PobEntry};

    fn comarques_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Nivell".into(), ["Comarca", "Municipi", "Municipi", "Comarca", "Municipi"]),
            Column::new("Codi".into(), ["13", "80193", "81013", "2", "250019"]),
            Column::new("Nom".into(), ["Comarca X", "Vila A", "Vila B", "Comarca Y", "Vila C"]),
        ]).unwrap()
    }

    #[test]
    fn attaches_municipalities_to_running_comarca() {
        let dict = MunicipiDict::from_frame(&comarques_frame()).unwrap();
        assert_eq!(dict.len(), 3);

        let vila_a = dict.get("080193").unwrap();
        assert_eq!(vila_a.nom, "Vila A");
        assert_eq!(vila_a.codi_comarca, "13");
        assert_eq!(vila_a.comarca, "Comarca X");

        let vila_c = dict.get("250019").unwrap();
        assert_eq!(vila_c.codi_comarca, "02");
        assert_eq!(vila_c.comarca, "Comarca Y");
    }

    #[test]
    fn skips_municipality_before_any_comarca() {
        let df = DataFrame::new(vec![
            Column::new("Nivell".into(), ["Municipi", "Comarca", "Municipi"]),
            Column::new("Codi".into(), ["80193", "13", "81013"]),
            Column::new("Nom".into(), ["Orphan", "Comarca X", "Vila B"]),
        ]).unwrap();
        let dict = MunicipiDict::from_frame(&df).unwrap();
        assert_eq!(dict.len(), 1);
        assert!(dict.get("080193").is_none());
        assert!(dict.get("081013").is_some());
    }

    #[test]
    fn merges_population_by_code() {
        let mut dict = MunicipiDict::from_frame(&comarques_frame()).unwrap();
        let merged = dict.merge_population(&[
            PobEntry { nom: "Vila A".into(), codi: "80193".into(), poblacio: Some(1_620_343) },
            PobEntry { nom: "Elsewhere".into(), codi: "999999".into(), poblacio: Some(1) },
        ]);
        assert_eq!(merged, 1);
        assert_eq!(dict.get("080193").unwrap().poblacio, Some(1_620_343));
        assert_eq!(dict.get("081013").unwrap().poblacio, None);
    }

    #[test]
    fn json_dump_roundtrips() {
        let mut dict = MunicipiDict::from_frame(&comarques_frame()).unwrap();
        dict.merge_population(&[PobEntry { nom: "Vila A".into(), codi: "080193".into(), poblacio: Some(10) }]);

        let bytes = dict.to_json_bytes().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("municipis.json");
        std::fs::write(&path, &bytes).unwrap();

        let reloaded = MunicipiDict::load_json(&path).unwrap();
        assert_eq!(reloaded.len(), dict.len());
        assert_eq!(reloaded.get("080193").unwrap(), dict.get("080193").unwrap());
    }
}

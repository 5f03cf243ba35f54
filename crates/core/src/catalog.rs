//! The ordered list of drugs analysed by the batch report.
//!
//! The catalog is static configuration: either the built-in antihypertensive list or a YAML file
//! loaded once at startup, e.g.
//!
//! ```yaml
//! - drug_class: ACE Inhibitor
//!   name: Lisinopril
//! - drug_class: ARB
//!   name: Losartan
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CatalogError;

/// A drug name together with the class it is reported under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    #[serde(rename = "drugClass", alias = "drug_class")]
    pub drug_class: String,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(drug_class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            drug_class: drug_class.into(),
            name: name.into(),
        }
    }
}

/// Ordered, non-empty drug catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrugCatalog {
    entries: Vec<CatalogEntry>,
}

impl DrugCatalog {
    /// Build a catalog from entries, rejecting empty catalogs and blank names.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, entry) in entries.iter().enumerate() {
            if entry.drug_class.trim().is_empty() {
                return Err(CatalogError::BlankField {
                    index,
                    field: "drug_class",
                });
            }
            if entry.name.trim().is_empty() {
                return Err(CatalogError::BlankField {
                    index,
                    field: "name",
                });
            }
        }
        Ok(Self { entries })
    }

    /// The five common blood-pressure drug classes.
    pub fn antihypertensives() -> Self {
        Self {
            entries: vec![
                CatalogEntry::new("ACE Inhibitor", "Lisinopril"),
                CatalogEntry::new("ARB", "Losartan"),
                CatalogEntry::new("Calcium Channel Blocker", "Amlodipine"),
                CatalogEntry::new("Beta-Blocker", "Metoprolol"),
                CatalogEntry::new("Diuretic", "Hydrochlorothiazide"),
            ],
        }
    }

    /// Parse a YAML sequence of `{drug_class, name}` entries.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> =
            serde_yaml::from_str(yaml).map_err(CatalogError::YamlDeserialization)?;
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(CatalogError::FileRead)?;
        Self::from_yaml_str(&contents)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DrugCatalog {
    fn default() -> Self {
        Self::antihypertensives()
    }
}

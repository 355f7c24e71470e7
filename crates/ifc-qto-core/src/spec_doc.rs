// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validation specification document
//!
//! A JSON document naming what a batch run should measure and check:
//!
//! ```json
//! {
//!   "name": "Structural concrete",
//!   "tracked_types": ["IfcBeam", "IfcColumn", "IfcSlab", "IfcPile"],
//!   "quantity_kinds": ["volume"],
//!   "required_categories": ["IfcSpecification"],
//!   "min_spaces": 2
//! }
//! ```
//!
//! Every key is optional. Unknown keys and unusable values are rejected,
//! since a run against a mistyped specification would report misleading
//! results.

use crate::error::{QtoError, Result};
use crate::quantity::QuantityKind;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_name() -> String {
    "default".to_string()
}

fn default_tracked_types() -> Vec<String> {
    ["IfcBeam", "IfcColumn", "IfcSlab", "IfcPile"]
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn default_quantity_kinds() -> Vec<QuantityKind> {
    vec![QuantityKind::Volume]
}

fn default_min_spaces() -> usize {
    2
}

/// What a batch run measures and checks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationSpec {
    #[serde(default = "default_name")]
    pub name: String,

    /// Element types whose quantities are resolved and totalled
    #[serde(default = "default_tracked_types")]
    pub tracked_types: Vec<String>,

    #[serde(default = "default_quantity_kinds")]
    pub quantity_kinds: Vec<QuantityKind>,

    /// Additional entity categories whose presence is counted
    #[serde(default)]
    pub required_categories: Vec<String>,

    /// Fewest spaces a compliant model may have
    #[serde(default = "default_min_spaces")]
    pub min_spaces: usize,
}

impl Default for ValidationSpec {
    fn default() -> Self {
        Self {
            name: default_name(),
            tracked_types: default_tracked_types(),
            quantity_kinds: default_quantity_kinds(),
            required_categories: Vec::new(),
            min_spaces: default_min_spaces(),
        }
    }
}

impl ValidationSpec {
    /// Load and validate a specification document
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| QtoError::SpecIo {
            path: path.to_path_buf(),
            source,
        })?;
        let spec: Self = serde_json::from_str(&content).map_err(|source| QtoError::SpecParse {
            path: path.to_path_buf(),
            source,
        })?;
        spec.validate()?;
        log::info!(
            "specification '{}': {} tracked types, {} categories",
            spec.name,
            spec.tracked_types.len(),
            spec.required_categories.len()
        );
        Ok(spec)
    }

    /// Parse and validate a specification from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(content)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Reject values a run cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.tracked_types.is_empty() {
            return Err(QtoError::invalid_spec("tracked_types is empty"));
        }
        if self.quantity_kinds.is_empty() {
            return Err(QtoError::invalid_spec("quantity_kinds is empty"));
        }
        check_names("tracked_types", &self.tracked_types)?;
        check_names("required_categories", &self.required_categories)?;

        let mut kinds = FxHashSet::default();
        for kind in &self.quantity_kinds {
            if !kinds.insert(*kind) {
                return Err(QtoError::invalid_spec(format!(
                    "quantity_kinds lists '{}' twice",
                    kind
                )));
            }
        }
        Ok(())
    }
}

/// Entity names must look like IFC class names and appear once
fn check_names(key: &str, names: &[String]) -> Result<()> {
    let mut seen = FxHashSet::default();
    for name in names {
        let valid = name.len() > 3
            && name.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case("ifc"))
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(QtoError::invalid_spec(format!(
                "{} entry '{}' is not an IFC entity name",
                key, name
            )));
        }
        if !seen.insert(name.to_ascii_uppercase()) {
            return Err(QtoError::invalid_spec(format!("{} lists '{}' twice", key, name)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec = ValidationSpec::from_json("{}").unwrap();
        assert_eq!(spec, ValidationSpec::default());
        assert_eq!(spec.tracked_types, vec!["IfcBeam", "IfcColumn", "IfcSlab", "IfcPile"]);
        assert_eq!(spec.quantity_kinds, vec![QuantityKind::Volume]);
        assert_eq!(spec.min_spaces, 2);
    }

    #[test]
    fn test_full_document() {
        let spec = ValidationSpec::from_json(
            r#"{
                "name": "Bridges",
                "tracked_types": ["IfcPile", "IfcBeam"],
                "quantity_kinds": ["volume", "area"],
                "required_categories": ["IfcSpecification", "IfcRoad"],
                "min_spaces": 0
            }"#,
        )
        .unwrap();
        assert_eq!(spec.name, "Bridges");
        assert_eq!(spec.quantity_kinds, vec![QuantityKind::Volume, QuantityKind::Area]);
        assert_eq!(spec.required_categories.len(), 2);
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(ValidationSpec::from_json("not json").is_err());
        assert!(ValidationSpec::from_json(r#"{"tracked": []}"#).is_err());
        assert!(ValidationSpec::from_json(r#"{"tracked_types": []}"#).is_err());
        assert!(ValidationSpec::from_json(r#"{"quantity_kinds": ["mass"]}"#).is_err());
        assert!(ValidationSpec::from_json(r#"{"tracked_types": ["Beam"]}"#).is_err());
        assert!(ValidationSpec::from_json(r#"{"required_categories": ["IfcSite.RefLatitude"]}"#).is_err());
        assert!(ValidationSpec::from_json(r#"{"tracked_types": ["IfcBeam", "IFCBEAM"]}"#).is_err());
        assert!(ValidationSpec::from_json(r#"{"min_spaces": -1}"#).is_err());
    }

    #[test]
    fn test_load_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = ValidationSpec::load(&missing).unwrap_err();
        assert!(matches!(err, QtoError::SpecIo { .. }));
        assert!(err.to_string().contains("absent.json"));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert!(matches!(
            ValidationSpec::load(&broken).unwrap_err(),
            QtoError::SpecParse { .. }
        ));
    }
}

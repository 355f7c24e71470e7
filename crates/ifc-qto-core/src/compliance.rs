// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compliance validation
//!
//! Checks the spatial backbone of a model (project, building, storeys,
//! spaces), its geographic reference and address, and the presence of any
//! additional categories a specification asks for. Every check runs; one
//! failing check leaves a neutral value in its field and never hides the
//! others.

use crate::coordinates::{find_postal_address, format_postal_address, site_coordinates};
use crate::spec_doc::ValidationSpec;
use crate::support::{FieldSupport, UnsupportedField};
use ifc_qto_model::{EntityResolver, EntityResolverExt, IfcModel, IfcType};

/// Field names the validator always requests
pub const PROJECT: &str = "IfcProject";
pub const BUILDING: &str = "IfcBuilding";
pub const STOREY: &str = "IfcBuildingStorey";
pub const SPACE: &str = "IfcSpace";
pub const LATITUDE: &str = "IfcSite.RefLatitude";
pub const LONGITUDE: &str = "IfcSite.RefLongitude";
pub const ELEVATION: &str = "IfcSite.RefElevation";
pub const ADDRESS: &str = "IfcPostalAddress";
pub const DISCIPLINES: &str = "IfcRelAssignsToGroup";

/// RelatingGroup of IfcRelAssignsToGroup
const RELATING_GROUP: usize = 6;
/// Name and ObjectType of a group
const GROUP_NAME: usize = 2;
const GROUP_OBJECT_TYPE: usize = 4;

/// A reported field, keeping "missing" apart from "not expressible"
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<T> {
    Present(T),
    /// The entity that would carry the value does not exist
    NotFound,
    /// The entity exists but the value is missing or undecodable
    Unavailable,
    /// The model's schema cannot express the field
    Unsupported(String),
}

impl<T> FieldValue<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            FieldValue::Present(v) => Some(v),
            _ => None,
        }
    }

    fn from_option(value: Option<T>) -> Self {
        value.map_or(FieldValue::Unavailable, FieldValue::Present)
    }
}

/// Presence count of one additional category
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub count: FieldValue<usize>,
}

/// Per-file validation record
#[derive(Clone, Debug, PartialEq)]
pub struct ComplianceResult {
    pub schema: String,
    pub project_count: FieldValue<usize>,
    pub building_count: FieldValue<usize>,
    pub storey_count: FieldValue<usize>,
    pub space_count: FieldValue<usize>,
    /// Threshold `space_count` is judged against
    pub min_spaces: usize,
    pub latitude: FieldValue<f64>,
    pub longitude: FieldValue<f64>,
    pub elevation: FieldValue<f64>,
    pub address: FieldValue<String>,
    /// Names of the groups elements are assigned to, first seen first
    pub disciplines: FieldValue<Vec<String>>,
    pub categories: Vec<CategoryCount>,
    /// Every requested field the schema lacks, with the schema as reason
    pub unsupported: Vec<UnsupportedField>,
}

impl ComplianceResult {
    /// Exactly one project
    pub fn project_ok(&self) -> bool {
        self.project_count.value() == Some(&1)
    }

    /// Exactly one building
    pub fn building_ok(&self) -> bool {
        self.building_count.value() == Some(&1)
    }

    pub fn spaces_compliant(&self) -> bool {
        self.space_count
            .value()
            .is_some_and(|count| *count >= self.min_spaces)
    }

    /// Count of an additional category, if it was requested
    pub fn category(&self, name: &str) -> Option<&FieldValue<usize>> {
        self.categories
            .iter()
            .find(|c| c.category.eq_ignore_ascii_case(name))
            .map(|c| &c.count)
    }
}

/// Runs the compliance checks of one specification
#[derive(Clone, Debug)]
pub struct ComplianceValidator {
    min_spaces: usize,
    categories: Vec<String>,
}

impl ComplianceValidator {
    pub fn new(spec: &ValidationSpec) -> Self {
        Self {
            min_spaces: spec.min_spaces,
            categories: spec.required_categories.clone(),
        }
    }

    /// Fields to run through the support filter before validating
    pub fn requested_fields(&self) -> Vec<String> {
        [
            PROJECT, BUILDING, STOREY, SPACE, LATITUDE, LONGITUDE, ELEVATION, ADDRESS,
            DISCIPLINES,
        ]
        .iter()
        .map(|f| f.to_string())
        .chain(self.categories.iter().cloned())
        .collect()
    }

    /// Validate one model against the support computed for its schema
    pub fn validate(&self, model: &dyn IfcModel, support: &FieldSupport) -> ComplianceResult {
        let schema = model.metadata().schema().as_str().to_string();
        let resolver = model.resolver();

        let count = |field: &str| -> FieldValue<usize> {
            match support.reason(field) {
                Some(reason) => FieldValue::Unsupported(reason.to_string()),
                None => FieldValue::Present(resolver.count_by_type(&IfcType::parse(field))),
            }
        };

        let project_count = count(PROJECT);
        let building_count = count(BUILDING);
        let storey_count = count(STOREY);
        let space_count = count(SPACE);

        let (latitude, longitude, elevation) = match site_coordinates(resolver) {
            Some(coords) => (
                FieldValue::from_option(coords.latitude),
                FieldValue::from_option(coords.longitude),
                FieldValue::from_option(coords.elevation),
            ),
            None => (FieldValue::NotFound, FieldValue::NotFound, FieldValue::NotFound),
        };
        let gate = |field: &str, value: FieldValue<f64>| match support.reason(field) {
            Some(reason) => FieldValue::Unsupported(reason.to_string()),
            None => value,
        };

        let address = match support.reason(ADDRESS) {
            Some(reason) => FieldValue::Unsupported(reason.to_string()),
            None => match find_postal_address(resolver) {
                Ok(Some(entity)) => {
                    let text = format_postal_address(&entity);
                    if text.is_empty() {
                        FieldValue::Unavailable
                    } else {
                        FieldValue::Present(text)
                    }
                }
                Ok(None) => FieldValue::NotFound,
                Err(e) => {
                    log::warn!("address check failed: {}", e);
                    FieldValue::Unavailable
                }
            },
        };

        let disciplines = match support.reason(DISCIPLINES) {
            Some(reason) => FieldValue::Unsupported(reason.to_string()),
            None => assigned_disciplines(resolver),
        };

        let categories = self
            .categories
            .iter()
            .map(|category| CategoryCount {
                category: category.clone(),
                count: count(category.as_str()),
            })
            .collect();

        ComplianceResult {
            schema,
            project_count,
            building_count,
            storey_count,
            space_count,
            min_spaces: self.min_spaces,
            latitude: gate(LATITUDE, latitude),
            longitude: gate(LONGITUDE, longitude),
            elevation: gate(ELEVATION, elevation),
            address,
            disciplines,
            categories,
            unsupported: support.unsupported.clone(),
        }
    }
}

/// Distinct group names reached through IfcRelAssignsToGroup
///
/// A group without a Name falls back to its ObjectType. Assignments that
/// cannot be followed are skipped with a warning.
fn assigned_disciplines(resolver: &dyn EntityResolver) -> FieldValue<Vec<String>> {
    let relations = resolver.entities_by_type(&IfcType::IfcRelAssignsToGroup);
    if relations.is_empty() {
        return FieldValue::NotFound;
    }

    let mut names: Vec<String> = Vec::new();
    for relation in relations {
        let group = match resolver.follow_ref(&relation, RELATING_GROUP) {
            Ok(Some(group)) => group,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("group assignment {}: {}", relation.id, e);
                continue;
            }
        };
        let name = group
            .get_string(GROUP_NAME)
            .or_else(|| group.get_string(GROUP_OBJECT_TYPE))
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if let Some(name) = name {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }

    if names.is_empty() {
        FieldValue::Unavailable
    } else {
        FieldValue::Present(names)
    }
}

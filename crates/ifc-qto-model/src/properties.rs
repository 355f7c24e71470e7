// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property and quantity access for IFC entities

use crate::{EntityId, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar value carried by a property
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl PropertyValue {
    /// Numeric view of the value; text and booleans are not numbers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Real(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Real(r) => write!(f, "{}", r),
            PropertyValue::Text(s) => f.write_str(s),
        }
    }
}

/// A single property value with optional unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    /// Unit of measurement (if applicable)
    pub unit: Option<String>,
}

impl Property {
    /// Create a new property
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
            unit: None,
        }
    }

    /// Create a property with unit
    pub fn with_unit(name: impl Into<String>, value: PropertyValue, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: Some(unit.into()),
        }
    }
}

/// A property set containing multiple properties
///
/// Property sets are owned by the model and may be shared by many entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    /// Property set name (e.g., "Pset_BeamCommon")
    pub name: String,
    pub properties: Vec<Property>,
}

impl PropertySet {
    /// Create a new property set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property to this set
    pub fn add(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Get a property by exact name
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Quantity types supported in IFC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityType {
    /// Linear measurement (IfcQuantityLength)
    Length,
    /// Area measurement (IfcQuantityArea)
    Area,
    /// Volume measurement (IfcQuantityVolume)
    Volume,
    /// Count (IfcQuantityCount)
    Count,
    /// Weight/mass measurement (IfcQuantityWeight)
    Weight,
    /// Time measurement (IfcQuantityTime)
    Time,
}

impl QuantityType {
    /// Get default unit for this quantity type
    pub fn default_unit(&self) -> &'static str {
        match self {
            QuantityType::Length => "m",
            QuantityType::Area => "m²",
            QuantityType::Volume => "m³",
            QuantityType::Count => "",
            QuantityType::Weight => "kg",
            QuantityType::Time => "s",
        }
    }
}

/// A quantity value with type and unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Quantity name (e.g. "NetVolume")
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub quantity_type: QuantityType,
}

impl Quantity {
    /// Create a new quantity with the default unit of its type
    pub fn new(name: impl Into<String>, value: f64, quantity_type: QuantityType) -> Self {
        Self {
            name: name.into(),
            value,
            unit: quantity_type.default_unit().to_string(),
            quantity_type,
        }
    }

    /// Format the value with unit
    pub fn formatted(&self) -> String {
        if self.unit.is_empty() {
            format!("{}", self.value)
        } else {
            format!("{} {}", self.value, self.unit)
        }
    }
}

/// Property and quantity reader trait
///
/// Property sets come from IfcPropertySet entities linked via
/// IfcRelDefinesByProperties; quantities come from IfcElementQuantity entities
/// linked the same way.
///
/// Reads are fallible: a relationship that points at a missing or malformed
/// definition yields an error instead of a silently shortened list, so callers
/// can tell "no data" from "broken data".
pub trait PropertyReader: Send + Sync {
    /// Get all property sets associated with an entity
    fn property_sets(&self, id: EntityId) -> Result<Vec<PropertySet>>;

    /// Get all quantities associated with an entity, in set order
    fn quantities(&self, id: EntityId) -> Result<Vec<Quantity>>;

    /// Get a specific property by exact name
    ///
    /// Searches all property sets for the entity and returns the first
    /// property with the matching name.
    fn get_property(&self, id: EntityId, name: &str) -> Result<Option<Property>> {
        Ok(self
            .property_sets(id)?
            .into_iter()
            .flat_map(|pset| pset.properties)
            .find(|p| p.name == name))
    }

    /// Get entity's GlobalId (GUID)
    fn global_id(&self, id: EntityId) -> Option<String>;

    /// Get entity's Name attribute
    fn name(&self, id: EntityId) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_numeric_view() {
        assert_eq!(PropertyValue::Real(2.5).as_f64(), Some(2.5));
        assert_eq!(PropertyValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(PropertyValue::Text("2.5".into()).as_f64(), None);
        assert_eq!(PropertyValue::Boolean(true).as_f64(), None);
    }

    #[test]
    fn test_quantity_formatting() {
        let q = Quantity::new("NetVolume", 1.5, QuantityType::Volume);
        assert_eq!(q.formatted(), "1.5 m³");
        let c = Quantity::new("Count", 4.0, QuantityType::Count);
        assert_eq!(c.formatted(), "4");
    }
}

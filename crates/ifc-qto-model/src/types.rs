// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for IFC data representation
//!
//! This module defines the fundamental types shared by model backends, the
//! geometry evaluator and the take-off engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe entity identifier
///
/// Wraps the raw IFC entity ID (e.g., #123 becomes EntityId(123))
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

macro_rules! ifc_types {
    ($( $(#[$meta:meta])* $variant:ident => $upper:literal ),* $(,)?) => {
        /// IFC entity type enumeration
        ///
        /// Covers the entity types the take-off engine inspects. Unknown types
        /// are captured with their upper-cased type name.
        #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        #[serde(into = "String", from = "String")]
        pub enum IfcType {
            $( $(#[$meta])* $variant, )*
            /// Unknown type - stores the upper-cased type name
            Unknown(String),
        }

        impl IfcType {
            /// Parse a type name string into an IfcType (case-insensitive)
            pub fn parse(s: &str) -> Self {
                let upper = s.trim().to_ascii_uppercase();
                match upper.as_str() {
                    $( $upper => IfcType::$variant, )*
                    _ => IfcType::Unknown(upper),
                }
            }

            /// Upper-case STEP name (e.g. "IFCBEAM")
            pub fn name(&self) -> &str {
                match self {
                    $( IfcType::$variant => $upper, )*
                    IfcType::Unknown(s) => s,
                }
            }

            /// Schema-style class name (e.g. "IfcBeam")
            pub fn display_name(&self) -> &str {
                match self {
                    $( IfcType::$variant => stringify!($variant), )*
                    IfcType::Unknown(s) => s,
                }
            }
        }
    };
}

ifc_types! {
    // Spatial structure
    IfcProject => "IFCPROJECT",
    IfcSite => "IFCSITE",
    IfcBuilding => "IFCBUILDING",
    IfcBuildingStorey => "IFCBUILDINGSTOREY",
    IfcSpace => "IFCSPACE",
    IfcSpatialZone => "IFCSPATIALZONE",

    // Building elements
    IfcWall => "IFCWALL",
    IfcWallStandardCase => "IFCWALLSTANDARDCASE",
    IfcCurtainWall => "IFCCURTAINWALL",
    IfcSlab => "IFCSLAB",
    IfcSlabStandardCase => "IFCSLABSTANDARDCASE",
    IfcRoof => "IFCROOF",
    IfcBeam => "IFCBEAM",
    IfcBeamStandardCase => "IFCBEAMSTANDARDCASE",
    IfcColumn => "IFCCOLUMN",
    IfcColumnStandardCase => "IFCCOLUMNSTANDARDCASE",
    IfcDoor => "IFCDOOR",
    IfcWindow => "IFCWINDOW",
    IfcStair => "IFCSTAIR",
    IfcRamp => "IFCRAMP",
    IfcRailing => "IFCRAILING",
    IfcCovering => "IFCCOVERING",
    IfcPlate => "IFCPLATE",
    IfcMember => "IFCMEMBER",
    IfcFooting => "IFCFOOTING",
    IfcPile => "IFCPILE",
    IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
    IfcReinforcingBar => "IFCREINFORCINGBAR",
    IfcTendon => "IFCTENDON",
    IfcCivilElement => "IFCCIVILELEMENT",
    IfcGeographicElement => "IFCGEOGRAPHICELEMENT",

    // Geometry
    IfcExtrudedAreaSolid => "IFCEXTRUDEDAREASOLID",
    IfcTriangulatedFaceSet => "IFCTRIANGULATEDFACESET",
    IfcFacetedBrep => "IFCFACETEDBREP",
    IfcBooleanClippingResult => "IFCBOOLEANCLIPPINGRESULT",
    IfcMappedItem => "IFCMAPPEDITEM",
    IfcRepresentationMap => "IFCREPRESENTATIONMAP",
    IfcShapeRepresentation => "IFCSHAPEREPRESENTATION",
    IfcProductDefinitionShape => "IFCPRODUCTDEFINITIONSHAPE",

    // Profiles
    IfcRectangleProfileDef => "IFCRECTANGLEPROFILEDEF",
    IfcRectangleHollowProfileDef => "IFCRECTANGLEHOLLOWPROFILEDEF",
    IfcCircleProfileDef => "IFCCIRCLEPROFILEDEF",
    IfcCircleHollowProfileDef => "IFCCIRCLEHOLLOWPROFILEDEF",
    IfcArbitraryClosedProfileDef => "IFCARBITRARYCLOSEDPROFILEDEF",
    IfcArbitraryProfileDefWithVoids => "IFCARBITRARYPROFILEDEFWITHVOIDS",

    // Curves, points and directions
    IfcPolyline => "IFCPOLYLINE",
    IfcIndexedPolyCurve => "IFCINDEXEDPOLYCURVE",
    IfcCartesianPoint => "IFCCARTESIANPOINT",
    IfcCartesianPointList2D => "IFCCARTESIANPOINTLIST2D",
    IfcCartesianPointList3D => "IFCCARTESIANPOINTLIST3D",
    IfcDirection => "IFCDIRECTION",
    IfcAxis2Placement3D => "IFCAXIS2PLACEMENT3D",
    IfcCartesianTransformationOperator3D => "IFCCARTESIANTRANSFORMATIONOPERATOR3D",

    // Topology
    IfcClosedShell => "IFCCLOSEDSHELL",
    IfcFace => "IFCFACE",
    IfcFaceBound => "IFCFACEBOUND",
    IfcFaceOuterBound => "IFCFACEOUTERBOUND",
    IfcPolyLoop => "IFCPOLYLOOP",

    // Relationships
    IfcRelAggregates => "IFCRELAGGREGATES",
    IfcRelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
    IfcRelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
    IfcRelAssignsToGroup => "IFCRELASSIGNSTOGROUP",

    // Properties and quantities
    IfcPropertySet => "IFCPROPERTYSET",
    IfcPropertySingleValue => "IFCPROPERTYSINGLEVALUE",
    IfcPropertyEnumeratedValue => "IFCPROPERTYENUMERATEDVALUE",
    IfcElementQuantity => "IFCELEMENTQUANTITY",
    IfcQuantityLength => "IFCQUANTITYLENGTH",
    IfcQuantityArea => "IFCQUANTITYAREA",
    IfcQuantityVolume => "IFCQUANTITYVOLUME",
    IfcQuantityCount => "IFCQUANTITYCOUNT",
    IfcQuantityWeight => "IFCQUANTITYWEIGHT",
    IfcQuantityTime => "IFCQUANTITYTIME",

    // Units
    IfcUnitAssignment => "IFCUNITASSIGNMENT",
    IfcSIUnit => "IFCSIUNIT",
    IfcConversionBasedUnit => "IFCCONVERSIONBASEDUNIT",
    IfcMeasureWithUnit => "IFCMEASUREWITHUNIT",

    // Groups
    IfcGroup => "IFCGROUP",
    IfcZone => "IFCZONE",
    IfcSystem => "IFCSYSTEM",
    IfcDistributionSystem => "IFCDISTRIBUTIONSYSTEM",

    // Actors and addresses
    IfcPostalAddress => "IFCPOSTALADDRESS",

    // IFC4x3 infrastructure
    IfcAlignment => "IFCALIGNMENT",
    IfcFacility => "IFCFACILITY",
    IfcRoad => "IFCROAD",
    IfcBridge => "IFCBRIDGE",
    IfcRailway => "IFCRAILWAY",
    IfcCourse => "IFCCOURSE",
    IfcPavement => "IFCPAVEMENT",
    IfcKerb => "IFCKERB",
    IfcBorehole => "IFCBOREHOLE",
    IfcEarthworksCut => "IFCEARTHWORKSCUT",
    IfcEarthworksFill => "IFCEARTHWORKSFILL",
    IfcDeepFoundation => "IFCDEEPFOUNDATION",
}

impl FromStr for IfcType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for IfcType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<IfcType> for String {
    fn from(t: IfcType) -> Self {
        t.name().to_string()
    }
}

impl Default for IfcType {
    fn default() -> Self {
        IfcType::Unknown(String::new())
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decoded attribute value
///
/// Represents any value that can appear in an IFC entity's attribute list.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    EntityRef(EntityId),
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    List(Vec<AttributeValue>),
    /// Typed value like IFCLABEL('text')
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_string(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_float(),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_integer(),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_bool(),
            _ => None,
        }
    }

    /// Try to get as enum string
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Short name of the value kind, used in type mismatch reports
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Derived => "derived",
            AttributeValue::EntityRef(_) => "reference",
            AttributeValue::Bool(_) => "boolean",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Float(_) => "real",
            AttributeValue::String(_) => "string",
            AttributeValue::Enum(_) => "enumeration",
            AttributeValue::List(_) => "list",
            AttributeValue::TypedValue(_, _) => "typed value",
        }
    }
}

/// Decoded IFC entity
///
/// Represents a fully decoded IFC entity with its ID, type, and attribute values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedEntity {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub ifc_type: IfcType,
    /// Attribute values in schema order
    #[serde(default)]
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    /// Create an entity from its parts
    pub fn new(id: impl Into<EntityId>, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id: id.into(),
            ifc_type,
            attributes,
        }
    }

    /// Get attribute at index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference at index
    pub fn get_ref(&self, index: usize) -> Option<EntityId> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get string at index
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// Get float at index
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    /// Get integer at index
    pub fn get_integer(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(|v| v.as_integer())
    }

    /// Get list at index
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Get enum string at index
    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    /// Get list of entity references at index
    pub fn get_refs(&self, index: usize) -> Option<Vec<EntityId>> {
        self.get_list(index)
            .map(|list| list.iter().filter_map(|v| v.as_entity_ref()).collect())
    }
}

/// Schema dialect a model declares in its header
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SchemaVersion {
    Ifc2x3,
    Ifc4,
    Ifc4x3,
    /// Any other declared identifier, upper-cased
    Other(String),
}

impl SchemaVersion {
    /// Parse a header schema identifier such as "IFC2X3" or "IFC4X3_ADD2"
    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "IFC2X3" | "IFC2X3_TC1" => SchemaVersion::Ifc2x3,
            "IFC4" | "IFC4_ADD1" | "IFC4_ADD2" | "IFC4_ADD2_TC1" => SchemaVersion::Ifc4,
            s if s.starts_with("IFC4X3") => SchemaVersion::Ifc4x3,
            _ => SchemaVersion::Other(upper),
        }
    }

    /// Canonical identifier
    pub fn as_str(&self) -> &str {
        match self {
            SchemaVersion::Ifc2x3 => "IFC2X3",
            SchemaVersion::Ifc4 => "IFC4",
            SchemaVersion::Ifc4x3 => "IFC4X3",
            SchemaVersion::Other(s) => s,
        }
    }
}

impl From<String> for SchemaVersion {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<SchemaVersion> for String {
    fn from(v: SchemaVersion) -> Self {
        v.as_str().to_string()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model metadata extracted from the file header
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    /// IFC schema version (e.g., "IFC2X3", "IFC4", "IFC4X3")
    pub schema_version: String,
    /// Originating system (CAD application)
    pub originating_system: Option<String>,
    pub file_name: Option<String>,
    pub author: Option<String>,
    pub organization: Option<String>,
    pub timestamp: Option<String>,
}

impl ModelMetadata {
    /// Declared schema as a typed version
    pub fn schema(&self) -> SchemaVersion {
        SchemaVersion::parse(&self.schema_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parse_roundtrip() {
        assert_eq!(IfcType::parse("IfcBeam"), IfcType::IfcBeam);
        assert_eq!(IfcType::parse("IFCBUILDINGSTOREY"), IfcType::IfcBuildingStorey);
        assert_eq!(IfcType::IfcPile.name(), "IFCPILE");
        assert_eq!(IfcType::IfcPile.display_name(), "IfcPile");
    }

    #[test]
    fn test_unknown_type_is_uppercased() {
        let t = IfcType::parse("IfcSpecification");
        assert_eq!(t, IfcType::Unknown("IFCSPECIFICATION".to_string()));
        assert_eq!(t, IfcType::parse("ifcspecification"));
    }

    #[test]
    fn test_schema_version_parse() {
        assert_eq!(SchemaVersion::parse("ifc2x3"), SchemaVersion::Ifc2x3);
        assert_eq!(SchemaVersion::parse("IFC4"), SchemaVersion::Ifc4);
        assert_eq!(SchemaVersion::parse("IFC4X3_ADD2"), SchemaVersion::Ifc4x3);
        assert_eq!(
            SchemaVersion::parse("IFC5"),
            SchemaVersion::Other("IFC5".to_string())
        );
    }

    #[test]
    fn test_entity_json_shape() {
        let json = r#"{"id": 7, "type": "IfcBeam", "attributes": ["null", {"string": "B1"}, {"entity_ref": 3}]}"#;
        let entity: DecodedEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.id, EntityId(7));
        assert_eq!(entity.ifc_type, IfcType::IfcBeam);
        assert!(entity.get(0).unwrap().is_null());
        assert_eq!(entity.get_string(1), Some("B1"));
        assert_eq!(entity.get_ref(2), Some(EntityId(3)));
    }
}

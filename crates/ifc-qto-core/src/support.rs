// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema-aware field support
//!
//! A field is either an entity name (`IfcSpace`) or an entity attribute
//! (`IfcSite.RefLatitude`). Which fields exist depends on the schema a model
//! declares, so every request is checked against a static capability table
//! once per file. Unsupported fields are kept with the schema as the reason.

use ifc_qto_model::SchemaVersion;
use rustc_hash::FxHashSet;
use serde::Serialize;

const IFC2X3: u8 = 0b001;
const IFC4: u8 = 0b010;
const IFC4X3: u8 = 0b100;
const ALL: u8 = IFC2X3 | IFC4 | IFC4X3;
const SINCE_IFC4: u8 = IFC4 | IFC4X3;
const BEFORE_IFC4X3: u8 = IFC2X3 | IFC4;

/// Upper-cased field names and the schemas defining them
static FIELDS: &[(&str, u8)] = &[
    // Spatial structure
    ("IFCPROJECT", ALL),
    ("IFCSITE", ALL),
    ("IFCBUILDING", ALL),
    ("IFCBUILDINGSTOREY", ALL),
    ("IFCSPACE", ALL),
    ("IFCSPATIALZONE", SINCE_IFC4),
    ("IFCFACILITY", IFC4X3),
    // Building elements
    ("IFCBEAM", ALL),
    ("IFCCOLUMN", ALL),
    ("IFCSLAB", ALL),
    ("IFCPILE", ALL),
    ("IFCWALL", ALL),
    ("IFCCURTAINWALL", ALL),
    ("IFCROOF", ALL),
    ("IFCDOOR", ALL),
    ("IFCWINDOW", ALL),
    ("IFCSTAIR", ALL),
    ("IFCRAMP", ALL),
    ("IFCRAILING", ALL),
    ("IFCCOVERING", ALL),
    ("IFCPLATE", ALL),
    ("IFCMEMBER", ALL),
    ("IFCFOOTING", ALL),
    ("IFCBUILDINGELEMENTPROXY", ALL),
    ("IFCREINFORCINGBAR", ALL),
    ("IFCTENDON", ALL),
    ("IFCWALLSTANDARDCASE", BEFORE_IFC4X3),
    ("IFCBEAMSTANDARDCASE", IFC4),
    ("IFCCOLUMNSTANDARDCASE", IFC4),
    ("IFCSLABSTANDARDCASE", IFC4),
    ("IFCCIVILELEMENT", SINCE_IFC4),
    ("IFCGEOGRAPHICELEMENT", SINCE_IFC4),
    // Infrastructure
    ("IFCALIGNMENT", IFC4X3),
    ("IFCROAD", IFC4X3),
    ("IFCBRIDGE", IFC4X3),
    ("IFCRAILWAY", IFC4X3),
    ("IFCCOURSE", IFC4X3),
    ("IFCPAVEMENT", IFC4X3),
    ("IFCKERB", IFC4X3),
    ("IFCBOREHOLE", IFC4X3),
    ("IFCEARTHWORKSCUT", IFC4X3),
    ("IFCEARTHWORKSFILL", IFC4X3),
    ("IFCDEEPFOUNDATION", IFC4X3),
    // Groups, addresses, relationships
    ("IFCGROUP", ALL),
    ("IFCZONE", ALL),
    ("IFCSYSTEM", ALL),
    ("IFCDISTRIBUTIONSYSTEM", SINCE_IFC4),
    ("IFCPOSTALADDRESS", ALL),
    ("IFCRELASSIGNSTOGROUP", ALL),
    ("IFCRELDEFINESBYPROPERTIES", ALL),
    ("IFCELEMENTQUANTITY", ALL),
    // Attributes
    ("IFCPROJECT.UNITSINCONTEXT", ALL),
    ("IFCSITE.REFLATITUDE", ALL),
    ("IFCSITE.REFLONGITUDE", ALL),
    ("IFCSITE.REFELEVATION", ALL),
    ("IFCSITE.SITEADDRESS", ALL),
    ("IFCBUILDING.BUILDINGADDRESS", ALL),
    ("IFCBUILDINGSTOREY.ELEVATION", ALL),
    ("IFCSPACE.INTERIOROREXTERIORSPACE", IFC2X3),
    ("IFCSPACE.PREDEFINEDTYPE", SINCE_IFC4),
    ("IFCSPACE.ELEVATIONWITHFLOORING", ALL),
    ("IFCPILE.CONSTRUCTIONTYPE", BEFORE_IFC4X3),
    ("IFCPILE.PREDEFINEDTYPE", ALL),
];

fn schema_bit(schema: &SchemaVersion) -> u8 {
    match schema {
        SchemaVersion::Ifc2x3 => IFC2X3,
        SchemaVersion::Ifc4 => IFC4,
        SchemaVersion::Ifc4x3 => IFC4X3,
        SchemaVersion::Other(_) => 0,
    }
}

/// Normalized lookup key: trimmed and upper-cased
fn field_key(field: &str) -> String {
    field.trim().to_ascii_uppercase()
}

/// Fields recognized by one schema
#[derive(Clone, Debug)]
pub struct SchemaCapabilities {
    schema: SchemaVersion,
    fields: FxHashSet<&'static str>,
}

impl SchemaCapabilities {
    /// Capability table for `schema`; empty for schemas outside the table
    pub fn for_schema(schema: &SchemaVersion) -> Self {
        let bit = schema_bit(schema);
        let fields = FIELDS
            .iter()
            .filter(|(_, schemas)| schemas & bit != 0)
            .map(|(name, _)| *name)
            .collect();
        Self {
            schema: schema.clone(),
            fields,
        }
    }

    pub fn schema(&self) -> &SchemaVersion {
        &self.schema
    }

    /// Case-insensitive membership test
    pub fn supports(&self, field: &str) -> bool {
        self.fields.contains(field_key(field).as_str())
    }
}

/// A requested field the model's schema does not define
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnsupportedField {
    pub field: String,
    /// Declared schema of the model
    pub reason: String,
}

/// Requested fields partitioned by schema support
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldSupport {
    /// Supported fields, in request order
    pub supported: Vec<String>,
    /// Unsupported fields, in request order
    pub unsupported: Vec<UnsupportedField>,
}

impl FieldSupport {
    pub fn is_supported(&self, field: &str) -> bool {
        let key = field_key(field);
        self.supported.iter().any(|f| field_key(f) == key)
    }

    /// Reason a field is unsupported, if it was requested and rejected
    pub fn reason(&self, field: &str) -> Option<&str> {
        let key = field_key(field);
        self.unsupported
            .iter()
            .find(|u| field_key(&u.field) == key)
            .map(|u| u.reason.as_str())
    }
}

/// Partition `requested` into fields `schema` defines and fields it does not
///
/// Duplicates (ignoring case) are reported once, at their first position.
pub fn filter_supported<S: AsRef<str>>(schema: &SchemaVersion, requested: &[S]) -> FieldSupport {
    let capabilities = SchemaCapabilities::for_schema(schema);
    let mut seen = FxHashSet::default();
    let mut support = FieldSupport::default();

    for field in requested {
        let field = field.as_ref().trim();
        if field.is_empty() || !seen.insert(field_key(field)) {
            continue;
        }
        if capabilities.supports(field) {
            support.supported.push(field.to_string());
        } else {
            support.unsupported.push(UnsupportedField {
                field: field.to_string(),
                reason: schema.as_str().to_string(),
            });
        }
    }

    if !support.unsupported.is_empty() {
        log::debug!(
            "schema {}: {} of {} requested fields unsupported",
            schema,
            support.unsupported.len(),
            seen.len()
        );
    }
    support
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_case_removed_in_ifc4x3() {
        let fields = ["IfcWallStandardCase", "IfcWall"];
        let ifc4 = filter_supported(&SchemaVersion::Ifc4, &fields);
        assert_eq!(ifc4.supported, vec!["IfcWallStandardCase", "IfcWall"]);

        let ifc4x3 = filter_supported(&SchemaVersion::Ifc4x3, &fields);
        assert_eq!(ifc4x3.supported, vec!["IfcWall"]);
        assert_eq!(ifc4x3.reason("IfcWallStandardCase"), Some("IFC4X3"));
    }

    #[test]
    fn test_infrastructure_only_in_ifc4x3() {
        let fields = ["IfcRoad", "IfcBridge", "IfcPile"];
        let ifc2x3 = filter_supported(&SchemaVersion::Ifc2x3, &fields);
        assert_eq!(ifc2x3.supported, vec!["IfcPile"]);
        assert_eq!(
            ifc2x3.unsupported,
            vec![
                UnsupportedField {
                    field: "IfcRoad".into(),
                    reason: "IFC2X3".into()
                },
                UnsupportedField {
                    field: "IfcBridge".into(),
                    reason: "IFC2X3".into()
                },
            ]
        );
        assert!(filter_supported(&SchemaVersion::Ifc4x3, &fields).unsupported.is_empty());
    }

    #[test]
    fn test_specification_is_never_supported() {
        for schema in [SchemaVersion::Ifc2x3, SchemaVersion::Ifc4, SchemaVersion::Ifc4x3] {
            let support = filter_supported(&schema, &["IfcSpecification"]);
            assert!(support.supported.is_empty());
            assert_eq!(support.reason("IfcSpecification"), Some(schema.as_str()));
        }
    }

    #[test]
    fn test_attribute_fields() {
        let fields = ["IfcSpace.InteriorOrExteriorSpace", "IfcSite.RefLatitude"];
        let ifc2x3 = filter_supported(&SchemaVersion::Ifc2x3, &fields);
        assert_eq!(ifc2x3.supported.len(), 2);
        let ifc4 = filter_supported(&SchemaVersion::Ifc4, &fields);
        assert_eq!(ifc4.reason("ifcspace.interiororexteriorspace"), Some("IFC4"));
    }

    #[test]
    fn test_unknown_schema_rejects_everything() {
        let schema = SchemaVersion::parse("IFC5_ALPHA");
        let support = filter_supported(&schema, &["IfcProject", "IfcBeam"]);
        assert!(support.supported.is_empty());
        assert_eq!(support.reason("IfcBeam"), Some("IFC5_ALPHA"));
    }

    #[test]
    fn test_case_insensitive_and_deduplicated() {
        let support = filter_supported(&SchemaVersion::Ifc4, &["IFCBEAM", "IfcBeam", " ifcbeam "]);
        assert_eq!(support.supported, vec!["IFCBEAM"]);
        assert!(support.is_supported("IfcBeam"));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SnapshotModel - IfcModel implementation over a decoded entity graph

use crate::properties::PropertyReaderImpl;
use crate::resolver::ResolverImpl;
use crate::units::extract_unit_scale;

use ifc_qto_model::{
    DecodedEntity, EntityResolver, IfcModel, ModelError, ModelMetadata, PropertyReader, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// On-disk form of a snapshot: header metadata plus the decoded entities
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub metadata: ModelMetadata,
    pub entities: Vec<DecodedEntity>,
}

/// Loaded snapshot implementing the `IfcModel` trait
pub struct SnapshotModel {
    resolver: Arc<ResolverImpl>,
    properties: Arc<PropertyReaderImpl>,
    /// Unit scale (file units to meters)
    unit_scale: f64,
    metadata: ModelMetadata,
}

impl SnapshotModel {
    /// Index a snapshot document
    ///
    /// A snapshot without a schema declaration is rejected: every downstream
    /// capability decision depends on it.
    pub fn from_document(document: SnapshotDocument) -> Result<Self> {
        if document.metadata.schema_version.trim().is_empty() {
            return Err(ModelError::format("snapshot declares no schema version"));
        }

        let resolver = Arc::new(ResolverImpl::new(document.entities)?);
        let unit_scale = extract_unit_scale(resolver.as_ref());
        let properties = Arc::new(PropertyReaderImpl::new(resolver.clone()));

        Ok(Self {
            resolver,
            properties,
            unit_scale,
            metadata: document.metadata,
        })
    }

    /// Parse snapshot JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let document: SnapshotDocument = serde_json::from_str(content)?;
        Self::from_document(document)
    }
}

impl IfcModel for SnapshotModel {
    fn resolver(&self) -> &dyn EntityResolver {
        self.resolver.as_ref()
    }

    fn properties(&self) -> &dyn PropertyReader {
        self.properties.as_ref()
    }

    fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_qto_model::{EntityId, IfcType, SchemaVersion};

    const TEST_SNAPSHOT: &str = r#"{
        "metadata": { "schema_version": "IFC2X3", "file_name": "test.ifc" },
        "entities": [
            { "id": 1, "type": "IFCPROJECT", "attributes": [
                {"string": "guid"}, "null", {"string": "Test Project"},
                "null", "null", "null", "null", "null", {"entity_ref": 2} ] },
            { "id": 2, "type": "IFCUNITASSIGNMENT", "attributes": [ {"list": [ {"entity_ref": 3} ]} ] },
            { "id": 3, "type": "IFCSIUNIT", "attributes": [
                "derived", {"enum": "LENGTHUNIT"}, {"enum": "MILLI"}, {"enum": "METRE"} ] },
            { "id": 10, "type": "IFCBEAM", "attributes": [ {"string": "guid8"}, "null", {"string": "Beam 1"} ] },
            { "id": 11, "type": "IFCQUANTITYVOLUME", "attributes": [
                {"string": "NetVolume"}, "null", "null", {"float": 1.25} ] },
            { "id": 12, "type": "IFCELEMENTQUANTITY", "attributes": [
                {"string": "qguid"}, "null", {"string": "Qto_BeamBaseQuantities"}, "null", "null",
                {"list": [ {"entity_ref": 11} ]} ] },
            { "id": 13, "type": "IFCRELDEFINESBYPROPERTIES", "attributes": [
                {"string": "rguid"}, "null", "null", "null",
                {"list": [ {"entity_ref": 10} ]}, {"entity_ref": 12} ] }
        ]
    }"#;

    #[test]
    fn test_parse_model() {
        let model = SnapshotModel::from_json(TEST_SNAPSHOT).unwrap();

        assert_eq!(model.metadata().schema(), SchemaVersion::Ifc2x3);
        assert_eq!(model.metadata().file_name, Some("test.ifc".to_string()));
        assert!((model.unit_scale() - 0.001).abs() < 1e-10);

        let beams = model.resolver().entities_by_type(&IfcType::IfcBeam);
        assert_eq!(beams.len(), 1);
        assert_eq!(model.properties().name(EntityId(10)), Some("Beam 1".into()));
    }

    #[test]
    fn test_quantities_follow_relationship() {
        let model = SnapshotModel::from_json(TEST_SNAPSHOT).unwrap();
        let quantities = model.properties().quantities(EntityId(10)).unwrap();
        assert_eq!(quantities.len(), 1);
        assert_eq!(quantities[0].name, "NetVolume");
        assert_eq!(quantities[0].value, 1.25);
        assert!(model.properties().property_sets(EntityId(10)).unwrap().is_empty());
    }

    #[test]
    fn test_missing_schema_rejected() {
        let err = SnapshotModel::from_json(r#"{"metadata": {}, "entities": []}"#);
        assert!(matches!(err, Err(ModelError::InvalidFormat(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            SnapshotModel::from_json("{ not json"),
            Err(ModelError::Json(_))
        ));
    }
}

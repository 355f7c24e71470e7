// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Programmatic snapshot construction
//!
//! Builds entity graphs with the attribute layouts the readers expect, so
//! fixtures do not have to spell out positional attributes by hand.

use crate::model::{SnapshotDocument, SnapshotModel};
use ifc_qto_model::{
    AttributeValue as A, DecodedEntity, EntityId, IfcType, ModelMetadata, QuantityType, Result,
};

/// Incremental builder for [`SnapshotModel`]s
pub struct SnapshotBuilder {
    metadata: ModelMetadata,
    next_id: u32,
    entities: Vec<DecodedEntity>,
}

impl SnapshotBuilder {
    /// Start an empty snapshot declaring `schema`
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            metadata: ModelMetadata {
                schema_version: schema.into(),
                ..Default::default()
            },
            next_id: 1,
            entities: Vec::new(),
        }
    }

    /// Add an entity with explicit attributes
    pub fn add(&mut self, ifc_type: IfcType, attributes: Vec<A>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(DecodedEntity::new(id, ifc_type, attributes));
        id
    }

    /// Add a rooted product (GlobalId, OwnerHistory, Name, ... Tag)
    pub fn element(&mut self, ifc_type: IfcType, name: &str) -> EntityId {
        let guid = format!("{}-{}", ifc_type.display_name(), self.next_id);
        self.add(
            ifc_type,
            vec![
                A::String(guid),
                A::Null,
                A::String(name.to_string()),
                A::Null,
                A::Null,
                A::Null,
                A::Null,
                A::Null,
            ],
        )
    }

    /// Overwrite one attribute slot, padding with nulls as needed
    pub fn set_attribute(&mut self, id: EntityId, index: usize, value: A) {
        if let Some(entity) = self.entities.iter_mut().find(|e| e.id == id) {
            if entity.attributes.len() <= index {
                entity.attributes.resize(index + 1, A::Null);
            }
            entity.attributes[index] = value;
        }
    }

    /// Add an IfcPropertySet of IfcPropertySingleValue entries
    pub fn property_set(&mut self, name: &str, properties: &[(&str, A)]) -> EntityId {
        let refs = properties
            .iter()
            .map(|(prop_name, value)| {
                A::EntityRef(self.add(
                    IfcType::IfcPropertySingleValue,
                    vec![A::String(prop_name.to_string()), A::Null, value.clone(), A::Null],
                ))
            })
            .collect();
        self.add(
            IfcType::IfcPropertySet,
            vec![
                A::String(format!("pset-{}", self.next_id)),
                A::Null,
                A::String(name.to_string()),
                A::Null,
                A::List(refs),
            ],
        )
    }

    /// Add an IfcElementQuantity of simple quantities
    pub fn quantity_set(&mut self, name: &str, quantities: &[(&str, QuantityType, f64)]) -> EntityId {
        let refs = quantities
            .iter()
            .map(|(qty_name, kind, value)| {
                let ifc_type = match kind {
                    QuantityType::Length => IfcType::IfcQuantityLength,
                    QuantityType::Area => IfcType::IfcQuantityArea,
                    QuantityType::Volume => IfcType::IfcQuantityVolume,
                    QuantityType::Count => IfcType::IfcQuantityCount,
                    QuantityType::Weight => IfcType::IfcQuantityWeight,
                    QuantityType::Time => IfcType::IfcQuantityTime,
                };
                A::EntityRef(self.add(
                    ifc_type,
                    vec![A::String(qty_name.to_string()), A::Null, A::Null, A::Float(*value)],
                ))
            })
            .collect();
        self.add(
            IfcType::IfcElementQuantity,
            vec![
                A::String(format!("qto-{}", self.next_id)),
                A::Null,
                A::String(name.to_string()),
                A::Null,
                A::Null,
                A::List(refs),
            ],
        )
    }

    /// Attach a property or quantity definition to objects
    pub fn relate(&mut self, objects: &[EntityId], definition: EntityId) -> EntityId {
        self.add(
            IfcType::IfcRelDefinesByProperties,
            vec![
                A::String(format!("rel-{}", self.next_id)),
                A::Null,
                A::Null,
                A::Null,
                A::List(objects.iter().map(|id| A::EntityRef(*id)).collect()),
                A::EntityRef(definition),
            ],
        )
    }

    /// Assign objects to a group of `group_type` named `name`
    pub fn group(&mut self, group_type: IfcType, name: &str, objects: &[EntityId]) -> EntityId {
        let group = self.element(group_type, name);
        // RelatingGroup at index 6
        self.add(
            IfcType::IfcRelAssignsToGroup,
            vec![
                A::String(format!("rel-{}", self.next_id)),
                A::Null,
                A::Null,
                A::Null,
                A::List(objects.iter().map(|id| A::EntityRef(*id)).collect()),
                A::Null,
                A::EntityRef(group),
            ],
        );
        group
    }

    /// Give a product a body representation made of `items`
    pub fn representation(&mut self, product: EntityId, items: &[EntityId]) -> EntityId {
        let shape = self.add(
            IfcType::IfcShapeRepresentation,
            vec![
                A::Null,
                A::String("Body".to_string()),
                A::String("SweptSolid".to_string()),
                A::List(items.iter().map(|id| A::EntityRef(*id)).collect()),
            ],
        );
        let definition = self.add(
            IfcType::IfcProductDefinitionShape,
            vec![A::Null, A::Null, A::List(vec![A::EntityRef(shape)])],
        );
        // Representation at index 6
        self.set_attribute(product, 6, A::EntityRef(definition));
        definition
    }

    /// Finish into the serializable document form
    pub fn document(self) -> SnapshotDocument {
        SnapshotDocument {
            metadata: self.metadata,
            entities: self.entities,
        }
    }

    /// Finish into an indexed model
    pub fn build(self) -> Result<SnapshotModel> {
        SnapshotModel::from_document(self.document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_qto_model::{IfcModel, PropertyValue};

    #[test]
    fn test_builder_property_roundtrip() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let pset = b.property_set(
            "Pset_Custom",
            &[("Length", A::Float(4.0)), ("Material", A::String("C30".into()))],
        );
        b.relate(&[beam], pset);
        let model = b.build().unwrap();

        let psets = model.properties().property_sets(beam).unwrap();
        assert_eq!(psets.len(), 1);
        assert_eq!(psets[0].name, "Pset_Custom");
        assert_eq!(psets[0].get("Length").unwrap().value, PropertyValue::Real(4.0));
        assert_eq!(
            psets[0].get("Material").unwrap().value,
            PropertyValue::Text("C30".into())
        );
    }

    #[test]
    fn test_shared_property_set() {
        let mut b = SnapshotBuilder::new("IFC4");
        let b1 = b.element(IfcType::IfcBeam, "B1");
        let b2 = b.element(IfcType::IfcBeam, "B2");
        let qto = b.quantity_set("Qto", &[("NetVolume", QuantityType::Volume, 2.0)]);
        b.relate(&[b1, b2], qto);
        let model = b.build().unwrap();

        for beam in [b1, b2] {
            let q = model.properties().quantities(beam).unwrap();
            assert_eq!(q[0].value, 2.0);
        }
    }

    #[test]
    fn test_dangling_definition_is_an_error() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        b.relate(&[beam], EntityId(999));
        let model = b.build().unwrap();

        assert!(model.properties().property_sets(beam).is_err());
        assert!(model.properties().quantities(beam).is_err());
    }

    #[test]
    fn test_malformed_property_list_is_an_error() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let pset = b.property_set("Pset", &[("Volume", A::Float(1.0))]);
        b.set_attribute(pset, 4, A::String("oops".into()));
        b.relate(&[beam], pset);
        let model = b.build().unwrap();

        assert!(model.properties().property_sets(beam).is_err());
    }

    #[test]
    fn test_group_assignment() {
        let mut b = SnapshotBuilder::new("IFC4");
        let wall = b.element(IfcType::IfcWall, "W1");
        let system = b.group(IfcType::IfcSystem, "Structure", &[wall]);
        let model = b.build().unwrap();

        let rels = model.resolver().entities_by_type(&IfcType::IfcRelAssignsToGroup);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].get_ref(6), Some(system));
        assert_eq!(model.resolver().get(system).unwrap().get_string(2), Some("Structure"));
    }
}

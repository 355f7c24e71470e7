// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PropertyReader trait implementation

use ifc_qto_model::{
    AttributeValue, DecodedEntity, EntityId, EntityResolver, IfcType, ModelError, Property,
    PropertyReader, PropertySet, PropertyValue, Quantity, QuantityType, Result,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A definition reference that could not be classified when the index was built
#[derive(Clone, Copy, Debug)]
struct DanglingDefinition {
    relation: EntityId,
    attribute: usize,
}

/// Property reader implementation
///
/// Walks IfcRelDefinesByProperties once at construction and caches, per
/// object, which property sets and element quantities define it.
pub struct PropertyReaderImpl {
    resolver: Arc<dyn EntityResolver>,
    /// Cache: entity ID -> property set IDs
    pset_cache: FxHashMap<u32, Vec<EntityId>>,
    /// Cache: entity ID -> quantity set IDs
    qset_cache: FxHashMap<u32, Vec<EntityId>>,
    /// Cache: entity ID -> relationship whose definition does not resolve
    dangling: FxHashMap<u32, DanglingDefinition>,
}

impl PropertyReaderImpl {
    /// Create a new property reader
    pub fn new(resolver: Arc<dyn EntityResolver>) -> Self {
        let mut pset_cache: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut qset_cache: FxHashMap<u32, Vec<EntityId>> = FxHashMap::default();
        let mut dangling: FxHashMap<u32, DanglingDefinition> = FxHashMap::default();

        for rel in resolver.entities_by_type(&IfcType::IfcRelDefinesByProperties) {
            // RelatedObjects at index 4, RelatingPropertyDefinition at index 5
            let related_ids = match rel.get_refs(4) {
                Some(ids) => ids,
                None => {
                    log::debug!("{}: RelatedObjects is not a list, skipped", rel.id);
                    continue;
                }
            };

            let Some(definition_id) = rel.get_ref(5) else {
                log::debug!("{}: no RelatingPropertyDefinition, skipped", rel.id);
                continue;
            };

            let cache = match resolver.get(definition_id).map(|d| d.ifc_type.clone()) {
                Some(IfcType::IfcPropertySet) => &mut pset_cache,
                Some(IfcType::IfcElementQuantity) => &mut qset_cache,
                Some(_) => continue,
                None => {
                    for related_id in related_ids {
                        dangling.insert(
                            related_id.0,
                            DanglingDefinition {
                                relation: rel.id,
                                attribute: 5,
                            },
                        );
                    }
                    continue;
                }
            };

            for related_id in related_ids {
                cache.entry(related_id.0).or_default().push(definition_id);
            }
        }

        for ids in pset_cache.values_mut().chain(qset_cache.values_mut()) {
            ids.sort_unstable();
        }

        Self {
            resolver,
            pset_cache,
            qset_cache,
            dangling,
        }
    }

    fn check_dangling(&self, id: EntityId) -> Result<()> {
        match self.dangling.get(&id.0) {
            Some(d) => Err(ModelError::InvalidReference {
                entity: d.relation,
                attribute: d.attribute,
            }),
            None => Ok(()),
        }
    }

    /// Resolve the entity list held in `index` of `owner`
    fn member_entities(&self, owner: &DecodedEntity, index: usize) -> Result<Vec<Arc<DecodedEntity>>> {
        let refs = match owner.get(index) {
            Some(AttributeValue::List(list)) => list,
            Some(AttributeValue::Null) | None => return Ok(Vec::new()),
            Some(other) => {
                return Err(ModelError::type_mismatch(owner.id, index, "list", other.kind()))
            }
        };

        refs.iter()
            .map(|item| {
                let id = item.as_entity_ref().ok_or_else(|| {
                    ModelError::type_mismatch(owner.id, index, "reference", item.kind())
                })?;
                self.resolver.get(id).ok_or(ModelError::InvalidReference {
                    entity: owner.id,
                    attribute: index,
                })
            })
            .collect()
    }

    /// Extract properties from a property set entity
    fn extract_properties(&self, pset: &DecodedEntity) -> Result<Vec<Property>> {
        // HasProperties at index 4
        Ok(self
            .member_entities(pset, 4)?
            .iter()
            .filter_map(|prop| extract_single_property(prop))
            .collect())
    }

    /// Extract quantities from an element quantity entity
    fn extract_quantities(&self, qset: &DecodedEntity) -> Result<Vec<Quantity>> {
        // Quantities at index 5
        self.member_entities(qset, 5)?
            .iter()
            .filter_map(|qty| extract_single_quantity(qty).transpose())
            .collect()
    }
}

/// Extract a single property from an IfcProperty entity
///
/// Properties without a value carry no information and are dropped.
fn extract_single_property(prop: &DecodedEntity) -> Option<Property> {
    // Name at index 0
    let name = prop.get_string(0)?.to_string();

    let value = match prop.ifc_type {
        // NominalValue at index 2
        IfcType::IfcPropertySingleValue => property_value(prop.get(2)?)?,
        // EnumerationValues at index 2
        IfcType::IfcPropertyEnumeratedValue => {
            let values = prop
                .get_list(2)?
                .iter()
                .filter_map(property_value)
                .map(|v| v.to_string())
                .collect::<Vec<_>>();
            if values.is_empty() {
                return None;
            }
            PropertyValue::Text(values.join(", "))
        }
        _ => return None,
    };

    Some(Property::new(name, value))
}

/// Extract a single quantity from an IfcPhysicalQuantity entity
///
/// Returns `Ok(None)` for quantity kinds that are not simple quantities and an
/// error when a simple quantity has no numeric value slot.
fn extract_single_quantity(qty: &DecodedEntity) -> Result<Option<Quantity>> {
    let quantity_type = match qty.ifc_type {
        IfcType::IfcQuantityLength => QuantityType::Length,
        IfcType::IfcQuantityArea => QuantityType::Area,
        IfcType::IfcQuantityVolume => QuantityType::Volume,
        IfcType::IfcQuantityCount => QuantityType::Count,
        IfcType::IfcQuantityWeight => QuantityType::Weight,
        IfcType::IfcQuantityTime => QuantityType::Time,
        _ => return Ok(None),
    };

    // Name at index 0, value at index 3
    let name = qty.get_string(0).unwrap_or_default().to_string();
    let value = match qty.get(3) {
        Some(attr) => attr.as_float().ok_or_else(|| {
            ModelError::type_mismatch(qty.id, 3, "number", attr.kind())
        })?,
        None => {
            return Err(ModelError::MissingAttribute {
                entity: qty.id,
                attribute: 3,
            })
        }
    };

    Ok(Some(Quantity::new(name, value, quantity_type)))
}

/// Convert a measure attribute into a property value
fn property_value(attr: &AttributeValue) -> Option<PropertyValue> {
    match attr {
        AttributeValue::Bool(b) => Some(PropertyValue::Boolean(*b)),
        AttributeValue::Integer(i) => Some(PropertyValue::Integer(*i)),
        AttributeValue::Float(f) => Some(PropertyValue::Real(*f)),
        AttributeValue::String(s) => Some(PropertyValue::Text(s.clone())),
        AttributeValue::Enum(e) => match attr.as_bool() {
            Some(b) => Some(PropertyValue::Boolean(b)),
            None => Some(PropertyValue::Text(e.clone())),
        },
        AttributeValue::TypedValue(_, args) => args.first().and_then(property_value),
        _ => None,
    }
}

impl PropertyReader for PropertyReaderImpl {
    fn property_sets(&self, id: EntityId) -> Result<Vec<PropertySet>> {
        self.check_dangling(id)?;

        let Some(pset_ids) = self.pset_cache.get(&id.0) else {
            return Ok(Vec::new());
        };

        let mut result = Vec::with_capacity(pset_ids.len());
        for pset_id in pset_ids {
            let Some(pset) = self.resolver.get(*pset_id) else {
                continue;
            };
            // Name at index 2
            let name = pset.get_string(2).unwrap_or("Unknown").to_string();
            let properties = self.extract_properties(&pset)?;
            if !properties.is_empty() {
                result.push(PropertySet { name, properties });
            }
        }

        Ok(result)
    }

    fn quantities(&self, id: EntityId) -> Result<Vec<Quantity>> {
        self.check_dangling(id)?;

        let Some(qset_ids) = self.qset_cache.get(&id.0) else {
            return Ok(Vec::new());
        };

        let mut result = Vec::new();
        for qset_id in qset_ids {
            if let Some(qset) = self.resolver.get(*qset_id) {
                result.extend(self.extract_quantities(&qset)?);
            }
        }

        Ok(result)
    }

    fn global_id(&self, id: EntityId) -> Option<String> {
        let entity = self.resolver.get(id)?;
        // GlobalId is at index 0 for rooted entities
        entity.get_string(0).map(|s| s.to_string())
    }

    fn name(&self, id: EntityId) -> Option<String> {
        let entity = self.resolver.get(id)?;
        // Name is at index 2 for rooted entities
        entity.get_string(2).map(|s| s.to_string())
    }
}

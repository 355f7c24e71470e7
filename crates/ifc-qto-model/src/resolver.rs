// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity resolution trait for looking up and resolving IFC entities

use crate::{AttributeValue, DecodedEntity, EntityId, IfcType, ModelError};
use std::sync::Arc;

/// Entity lookup and reference resolution
///
/// Implementations should provide O(1) lookup by entity ID and keep
/// `entities_by_type` in ascending ID order so downstream processing is
/// deterministic.
pub trait EntityResolver: Send + Sync {
    /// Get entity by ID
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>>;

    /// Resolve an entity reference from an attribute value
    fn resolve_ref(&self, attr: &AttributeValue) -> Option<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::EntityRef(id) => self.get(*id),
            _ => None,
        }
    }

    /// Resolve a list of entity references
    ///
    /// Items that are not references, or do not resolve, are skipped.
    fn resolve_ref_list(&self, attr: &AttributeValue) -> Vec<Arc<DecodedEntity>> {
        match attr {
            AttributeValue::List(items) => items
                .iter()
                .filter_map(|item| self.resolve_ref(item))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Get all entities of a specific type
    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>>;

    /// Find entities by type name string (case-insensitive)
    fn find_by_type_name(&self, type_name: &str) -> Vec<Arc<DecodedEntity>> {
        self.entities_by_type(&IfcType::parse(type_name))
    }

    /// Count entities of a specific type
    fn count_by_type(&self, ifc_type: &IfcType) -> usize {
        self.entities_by_type(ifc_type).len()
    }

    /// Get all entity IDs in the model
    fn all_ids(&self) -> Vec<EntityId>;

    /// Get total entity count
    fn entity_count(&self) -> usize {
        self.all_ids().len()
    }
}

/// Extension methods for EntityResolver
pub trait EntityResolverExt: EntityResolver {
    /// Get entity or return error
    fn get_or_err(&self, id: EntityId) -> crate::Result<Arc<DecodedEntity>> {
        self.get(id).ok_or(ModelError::EntityNotFound(id))
    }

    /// Resolve the reference held in `attr_index` of `entity`
    ///
    /// Returns `Ok(None)` when the slot is null or absent, and an error when
    /// it holds something other than a reference or the reference dangles.
    fn follow_ref(
        &self,
        entity: &DecodedEntity,
        attr_index: usize,
    ) -> crate::Result<Option<Arc<DecodedEntity>>> {
        match entity.get(attr_index) {
            None | Some(AttributeValue::Null) | Some(AttributeValue::Derived) => Ok(None),
            Some(AttributeValue::EntityRef(id)) => {
                self.get(*id)
                    .map(Some)
                    .ok_or(ModelError::InvalidReference {
                        entity: entity.id,
                        attribute: attr_index,
                    })
            }
            Some(other) => Err(ModelError::type_mismatch(
                entity.id,
                attr_index,
                "reference",
                other.kind(),
            )),
        }
    }
}

// Blanket implementation for all EntityResolver types
impl<T: EntityResolver + ?Sized> EntityResolverExt for T {}

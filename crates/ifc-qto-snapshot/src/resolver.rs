// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EntityResolver trait implementation

use ifc_qto_model::{DecodedEntity, EntityId, EntityResolver, IfcType, ModelError, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Entity store for one snapshot
///
/// Entities are decoded up front, so lookups never touch the file again.
pub struct ResolverImpl {
    /// Entity ID -> decoded entity
    entities: FxHashMap<u32, Arc<DecodedEntity>>,
    /// Type -> entity IDs index, ascending
    type_index: FxHashMap<IfcType, Vec<EntityId>>,
}

impl ResolverImpl {
    /// Build a resolver, rejecting duplicate entity IDs
    pub fn new(entities: Vec<DecodedEntity>) -> Result<Self> {
        let mut store: FxHashMap<u32, Arc<DecodedEntity>> = FxHashMap::default();
        let mut type_index: FxHashMap<IfcType, Vec<EntityId>> = FxHashMap::default();

        for entity in entities {
            let id = entity.id;
            type_index
                .entry(entity.ifc_type.clone())
                .or_default()
                .push(id);
            if store.insert(id.0, Arc::new(entity)).is_some() {
                return Err(ModelError::format(format!("duplicate entity id {}", id)));
            }
        }

        for ids in type_index.values_mut() {
            ids.sort_unstable();
        }

        Ok(Self {
            entities: store,
            type_index,
        })
    }
}

impl EntityResolver for ResolverImpl {
    fn get(&self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        self.entities.get(&id.0).cloned()
    }

    fn entities_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<DecodedEntity>> {
        self.type_index
            .get(ifc_type)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    fn count_by_type(&self, ifc_type: &IfcType) -> usize {
        self.type_index.get(ifc_type).map(|v| v.len()).unwrap_or(0)
    }

    fn all_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.keys().map(|&id| EntityId(id)).collect();
        ids.sort_unstable();
        ids
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_qto_model::AttributeValue;

    fn sample() -> Vec<DecodedEntity> {
        vec![
            DecodedEntity::new(4, IfcType::IfcBeam, vec![]),
            DecodedEntity::new(1, IfcType::IfcProject, vec![]),
            DecodedEntity::new(2, IfcType::IfcBeam, vec![AttributeValue::Null]),
        ]
    }

    #[test]
    fn test_resolver_get() {
        let resolver = ResolverImpl::new(sample()).unwrap();
        let entity = resolver.get(EntityId(1)).unwrap();
        assert_eq!(entity.ifc_type, IfcType::IfcProject);
        assert!(resolver.get(EntityId(99)).is_none());
    }

    #[test]
    fn test_entities_by_type_sorted() {
        let resolver = ResolverImpl::new(sample()).unwrap();
        let beams = resolver.entities_by_type(&IfcType::IfcBeam);
        let ids: Vec<_> = beams.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![EntityId(2), EntityId(4)]);
        assert_eq!(resolver.count_by_type(&IfcType::IfcBeam), 2);
        assert_eq!(resolver.find_by_type_name("ifcproject").len(), 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut entities = sample();
        entities.push(DecodedEntity::new(1, IfcType::IfcSite, vec![]));
        assert!(matches!(
            ResolverImpl::new(entities),
            Err(ModelError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_resolver_thread_safe() {
        use std::thread;

        let resolver = Arc::new(ResolverImpl::new(sample()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || {
                    for id in 1..=4 {
                        let _ = resolver.get(EntityId(id));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

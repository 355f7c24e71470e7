// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Volume Router - Dynamic dispatch to volume processors
//!
//! Walks a product's shape representation down to its solid items and routes
//! each item to the processor registered for its type. Uses the
//! `EntityResolver` trait from ifc-qto-model for entity lookup.

use crate::processors::VolumeProcessor;
use crate::{Error, Result};
use ifc_qto_model::{
    DecodedEntity, EntityResolver, EntityResolverExt, IfcModel, IfcType, ModelError,
    VolumeEvaluator,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Nesting limit for MappedItem instancing
const MAX_MAPPING_DEPTH: usize = 8;

/// Volume router - routes representation items to processors
///
/// A product's volume is the sum of the volumes of the items in its body
/// representation. If any item cannot be evaluated, the whole product is
/// reported as an error rather than an undercount.
pub struct VolumeRouter {
    /// Registered processors by type
    processors: FxHashMap<IfcType, Arc<dyn VolumeProcessor>>,
}

impl VolumeRouter {
    /// Create new router without any processors registered
    pub fn new() -> Self {
        Self {
            processors: FxHashMap::default(),
        }
    }

    /// Create router with default processors registered
    ///
    /// Registers the following processors:
    /// - `ExtrudedAreaSolidProcessor` (IfcExtrudedAreaSolid)
    /// - `TriangulatedFaceSetProcessor` (IfcTriangulatedFaceSet)
    /// - `FacetedBrepProcessor` (IfcFacetedBrep)
    pub fn with_default_processors() -> Self {
        use crate::processors::{
            ExtrudedAreaSolidProcessor, FacetedBrepProcessor, TriangulatedFaceSetProcessor,
        };

        let mut router = Self::new();
        router.register(Arc::new(ExtrudedAreaSolidProcessor::new()));
        router.register(Arc::new(TriangulatedFaceSetProcessor::new()));
        router.register(Arc::new(FacetedBrepProcessor::new()));
        router
    }

    /// Register a volume processor
    pub fn register(&mut self, processor: Arc<dyn VolumeProcessor>) {
        for ifc_type in processor.supported_types() {
            self.processors.insert(ifc_type, Arc::clone(&processor));
        }
    }

    /// Check if a type has a registered processor
    pub fn has_processor(&self, ifc_type: &IfcType) -> bool {
        self.processors.contains_key(ifc_type)
    }

    /// Volume of a product in file units cubed
    ///
    /// Returns `Ok(None)` when the product carries no shape representation.
    pub fn product_volume(
        &self,
        product: &DecodedEntity,
        resolver: &dyn EntityResolver,
    ) -> Result<Option<f64>> {
        // IfcProduct: Representation at index 6
        let Some(shape) = resolver.follow_ref(product, 6)? else {
            return Ok(None);
        };
        if shape.ifc_type != IfcType::IfcProductDefinitionShape {
            return Err(Error::unsupported_type(format!(
                "Product representation {}",
                shape.ifc_type.display_name()
            )));
        }

        // IfcProductDefinitionShape: Representations at index 2
        let representations = match shape.get(2) {
            Some(attr) => resolver.resolve_ref_list(attr),
            None => Vec::new(),
        };
        let body = representations
            .iter()
            .find(|rep| rep.get_string(1) == Some("Body"))
            .or_else(|| representations.first());
        let Some(body) = body else {
            return Ok(None);
        };

        // IfcShapeRepresentation: Items at index 3
        let items = body.get_refs(3).unwrap_or_default();
        if items.is_empty() {
            return Ok(None);
        }

        let mut total = 0.0;
        for item_id in items {
            let item = resolver.get_or_err(item_id)?;
            total += self.item_volume(&item, resolver, 0)?;
        }

        log::trace!("{} volume {} (file units)", product.id, total);
        Ok(Some(total))
    }

    /// Volume of a single representation item in file units cubed
    pub fn item_volume(
        &self,
        item: &DecodedEntity,
        resolver: &dyn EntityResolver,
        depth: usize,
    ) -> Result<f64> {
        if item.ifc_type == IfcType::IfcMappedItem {
            return self.mapped_item_volume(item, resolver, depth);
        }

        match self.processors.get(&item.ifc_type) {
            Some(processor) => processor.volume(item, resolver),
            None => {
                log::debug!("no volume processor for {}", item.ifc_type.display_name());
                Err(Error::unsupported_type(item.ifc_type.display_name()))
            }
        }
    }

    /// Volume of an IfcMappedItem instance
    ///
    /// Instancing only moves the source geometry; a uniform scale on the
    /// mapping target scales the volume by its cube.
    fn mapped_item_volume(
        &self,
        item: &DecodedEntity,
        resolver: &dyn EntityResolver,
        depth: usize,
    ) -> Result<f64> {
        if depth >= MAX_MAPPING_DEPTH {
            return Err(Error::geometry(format!(
                "mapped item nesting exceeds {} levels at {}",
                MAX_MAPPING_DEPTH, item.id
            )));
        }

        // IfcMappedItem: MappingSource at index 0, MappingTarget at index 1
        let source = resolver
            .follow_ref(item, 0)?
            .ok_or_else(|| Error::invalid_attribute(0, "Missing MappingSource"))?;

        // IfcRepresentationMap: MappedRepresentation at index 1
        let representation = resolver
            .follow_ref(&source, 1)?
            .ok_or_else(|| Error::invalid_attribute(1, "Missing MappedRepresentation"))?;

        // IfcCartesianTransformationOperator3D: Scale at index 3
        let scale = match resolver.follow_ref(item, 1)? {
            Some(target) => target.get_float(3).unwrap_or(1.0),
            None => 1.0,
        };

        let mut total = 0.0;
        for id in representation.get_refs(3).unwrap_or_default() {
            let mapped = resolver.get_or_err(id)?;
            total += self.item_volume(&mapped, resolver, depth + 1)?;
        }

        Ok(total * scale.abs().powi(3))
    }
}

impl Default for VolumeRouter {
    fn default() -> Self {
        Self::with_default_processors()
    }
}

impl VolumeEvaluator for VolumeRouter {
    fn volume(&self, entity: &DecodedEntity, model: &dyn IfcModel) -> ifc_qto_model::Result<Option<f64>> {
        let scale = model.unit_scale();
        self.product_volume(entity, model.resolver())
            .map(|volume| volume.map(|v| v * scale.powi(3)))
            .map_err(|e| match e {
                Error::Model(inner) => inner,
                other => ModelError::geometry(entity.id, other.to_string()),
            })
    }
}

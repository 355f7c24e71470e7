// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quantity resolution chain
//!
//! A model can carry the same quantity in several places: an explicit
//! quantity set, a loosely named property, the solid geometry itself, or only
//! as dimensions it can be estimated from. [`QuantityResolver`] tries those
//! sources in a fixed order and reports which one answered.
//!
//! Strategy order:
//! 1. Quantity set entry of the requested kind (measured)
//! 2. Property whose name contains the kind keyword and holds a number (measured)
//! 3. Geometry evaluator, volume only (measured)
//! 4. Area-named property times length-named property, volume only (estimated)
//!
//! A zero is a real value. Only absence, or an error inside a strategy,
//! moves on to the next one.

use crate::guard::GuardedEvaluator;
use ifc_qto_model::{DecodedEntity, EntityId, IfcModel, PropertySet, QuantityType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of quantity to resolve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityKind {
    Volume,
    Area,
    Length,
}

impl QuantityKind {
    /// Lower-case keyword matched against property names
    pub fn keyword(&self) -> &'static str {
        match self {
            QuantityKind::Volume => "volume",
            QuantityKind::Area => "area",
            QuantityKind::Length => "length",
        }
    }

    /// Quantity set entry type carrying this kind
    pub fn quantity_type(&self) -> QuantityType {
        match self {
            QuantityKind::Volume => QuantityType::Volume,
            QuantityKind::Area => QuantityType::Area,
            QuantityKind::Length => QuantityType::Length,
        }
    }

    /// Unit label used in reports
    pub fn unit(&self) -> &'static str {
        match self {
            QuantityKind::Volume => "m3",
            QuantityKind::Area => "m2",
            QuantityKind::Length => "m",
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Source that produced a resolved value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    QuantitySet,
    NamedProperty,
    Geometry,
    AreaTimesLength,
    /// Every strategy came up empty
    None,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::QuantitySet => "quantity_set",
            Strategy::NamedProperty => "named_property",
            Strategy::Geometry => "geometry",
            Strategy::AreaTimesLength => "area_times_length",
            Strategy::None => "none",
        }
    }
}

/// How much a resolved value can be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Measured,
    Estimated,
    Unavailable,
}

/// Outcome of resolving one quantity kind for one entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedQuantity {
    pub entity_id: EntityId,
    pub global_id: Option<String>,
    /// Schema-style type name, e.g. "IfcBeam"
    pub type_tag: String,
    pub kind: QuantityKind,
    /// Absent only when `confidence` is `Unavailable`
    pub value: Option<f64>,
    pub source: Strategy,
    pub confidence: Confidence,
}

impl ResolvedQuantity {
    fn new(entity: &DecodedEntity, model: &dyn IfcModel, kind: QuantityKind) -> Self {
        Self {
            entity_id: entity.id,
            global_id: model.properties().global_id(entity.id),
            type_tag: entity.ifc_type.display_name().to_string(),
            kind,
            value: None,
            source: Strategy::None,
            confidence: Confidence::Unavailable,
        }
    }

    fn with(mut self, value: f64, source: Strategy, confidence: Confidence) -> Self {
        self.value = Some(value);
        self.source = source;
        self.confidence = confidence;
        self
    }
}

/// Ordered fallback chain for one scalar quantity
#[derive(Clone, Debug, Default)]
pub struct QuantityResolver {
    evaluator: Option<GuardedEvaluator>,
}

impl QuantityResolver {
    /// Resolver without geometry derivation
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable geometry derivation through `evaluator`
    pub fn with_evaluator(mut self, evaluator: GuardedEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn has_evaluator(&self) -> bool {
        self.evaluator.is_some()
    }

    /// Resolve `kind` for `entity`
    ///
    /// Never fails: unreadable sources are logged and skipped, and an entity
    /// no strategy can answer comes back as `Unavailable`.
    pub fn resolve(
        &self,
        model: &Arc<dyn IfcModel>,
        entity: &Arc<DecodedEntity>,
        kind: QuantityKind,
    ) -> ResolvedQuantity {
        let base = ResolvedQuantity::new(entity, model.as_ref(), kind);

        if let Some(value) = self.from_quantity_sets(model.as_ref(), entity, kind) {
            return base.with(value, Strategy::QuantitySet, Confidence::Measured);
        }

        let property_sets = match model.properties().property_sets(entity.id) {
            Ok(sets) => sets,
            Err(e) => {
                log::debug!("{} property sets unreadable: {}", entity.id, e);
                Vec::new()
            }
        };

        if let Some(value) = first_numeric(&property_sets, kind.keyword()) {
            return base.with(value, Strategy::NamedProperty, Confidence::Measured);
        }

        if kind != QuantityKind::Volume {
            return base;
        }

        if let Some(value) = self.from_geometry(model, entity) {
            return base.with(value, Strategy::Geometry, Confidence::Measured);
        }

        let area = first_numeric(&property_sets, QuantityKind::Area.keyword());
        let length = first_numeric(&property_sets, QuantityKind::Length.keyword());
        if let (Some(area), Some(length)) = (area, length) {
            return base.with(area * length, Strategy::AreaTimesLength, Confidence::Estimated);
        }

        log::debug!(
            "{} {} {}: no strategy produced a value",
            entity.ifc_type.display_name(),
            entity.id,
            kind
        );
        base
    }

    fn from_quantity_sets(
        &self,
        model: &dyn IfcModel,
        entity: &DecodedEntity,
        kind: QuantityKind,
    ) -> Option<f64> {
        let quantities = match model.properties().quantities(entity.id) {
            Ok(q) => q,
            Err(e) => {
                log::debug!("{} quantity sets unreadable: {}", entity.id, e);
                return None;
            }
        };
        let wanted = kind.quantity_type();
        quantities
            .iter()
            .find(|q| q.quantity_type == wanted && q.value.is_finite())
            .map(|q| q.value)
    }

    fn from_geometry(&self, model: &Arc<dyn IfcModel>, entity: &Arc<DecodedEntity>) -> Option<f64> {
        let evaluator = self.evaluator.as_ref()?;
        match evaluator.volume(entity, model) {
            Ok(Some(value)) if value.is_finite() => Some(value),
            Ok(_) => None,
            Err(e) => {
                log::debug!("{} geometry unavailable: {}", entity.id, e);
                None
            }
        }
    }
}

/// First numeric property whose name contains `keyword`, ignoring case
fn first_numeric(sets: &[PropertySet], keyword: &str) -> Option<f64> {
    sets.iter()
        .flat_map(|set| set.properties.iter())
        .filter(|p| p.name.to_lowercase().contains(keyword))
        .find_map(|p| p.value.as_f64().filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_qto_model::{AttributeValue as A, IfcType, VolumeEvaluator};
    use ifc_qto_snapshot::SnapshotBuilder;
    use std::time::Duration;

    struct Fixed(Option<f64>);
    impl VolumeEvaluator for Fixed {
        fn volume(&self, _: &DecodedEntity, _: &dyn IfcModel) -> ifc_qto_model::Result<Option<f64>> {
            Ok(self.0)
        }
    }

    struct Broken;
    impl VolumeEvaluator for Broken {
        fn volume(&self, e: &DecodedEntity, _: &dyn IfcModel) -> ifc_qto_model::Result<Option<f64>> {
            Err(ifc_qto_model::ModelError::geometry(e.id, "self-intersecting"))
        }
    }

    fn resolver(volume: Option<f64>) -> QuantityResolver {
        QuantityResolver::new().with_evaluator(GuardedEvaluator::new(Arc::new(Fixed(volume))))
    }

    fn resolve(b: SnapshotBuilder, id: EntityId, r: &QuantityResolver) -> ResolvedQuantity {
        let model: Arc<dyn IfcModel> = Arc::new(b.build().unwrap());
        let entity = model.resolver().get(id).unwrap();
        r.resolve(&model, &entity, QuantityKind::Volume)
    }

    #[test]
    fn test_quantity_set_wins() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let qto = b.quantity_set(
            "Qto_BeamBaseQuantities",
            &[
                ("Length", QuantityType::Length, 4.0),
                ("NetVolume", QuantityType::Volume, 1.25),
            ],
        );
        let pset = b.property_set("Pset_Custom", &[("Volume", A::Float(9.0))]);
        b.relate(&[beam], qto);
        b.relate(&[beam], pset);

        let q = resolve(b, beam, &resolver(Some(7.0)));
        assert_eq!(q.value, Some(1.25));
        assert_eq!(q.source, Strategy::QuantitySet);
        assert_eq!(q.confidence, Confidence::Measured);
        assert_eq!(q.type_tag, "IfcBeam");
    }

    #[test]
    fn test_zero_is_a_measured_value() {
        let mut b = SnapshotBuilder::new("IFC4");
        let slab = b.element(IfcType::IfcSlab, "S1");
        let qto = b.quantity_set("Qto", &[("NetVolume", QuantityType::Volume, 0.0)]);
        b.relate(&[slab], qto);

        let q = resolve(b, slab, &resolver(Some(3.0)));
        assert_eq!(q.value, Some(0.0));
        assert_eq!(q.source, Strategy::QuantitySet);
    }

    #[test]
    fn test_named_property_is_case_insensitive() {
        let mut b = SnapshotBuilder::new("IFC4");
        let column = b.element(IfcType::IfcColumn, "C1");
        let pset = b.property_set(
            "Pset_Export",
            &[
                ("ConcreteVOLUME", A::String("n/a".into())),
                ("GrossVolume", A::Float(0.8)),
            ],
        );
        b.relate(&[column], pset);

        let q = resolve(b, column, &resolver(Some(3.0)));
        assert_eq!(q.value, Some(0.8));
        assert_eq!(q.source, Strategy::NamedProperty);
    }

    #[test]
    fn test_geometry_when_no_declared_volume() {
        let mut b = SnapshotBuilder::new("IFC4");
        let pile = b.element(IfcType::IfcPile, "P1");
        let pset = b.property_set(
            "Pset_Dims",
            &[("CrossSectionArea", A::Float(0.2)), ("Length", A::Float(10.0))],
        );
        b.relate(&[pile], pset);

        let q = resolve(b, pile, &resolver(Some(2.1)));
        assert_eq!(q.value, Some(2.1));
        assert_eq!(q.source, Strategy::Geometry);
        assert_eq!(q.confidence, Confidence::Measured);
    }

    #[test]
    fn test_area_times_length_estimate() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let pset = b.property_set(
            "Pset_Dims",
            &[("Area", A::Float(2.0)), ("Length", A::Integer(3))],
        );
        b.relate(&[beam], pset);

        let q = resolve(b, beam, &resolver(None));
        assert_eq!(q.value, Some(6.0));
        assert_eq!(q.source, Strategy::AreaTimesLength);
        assert_eq!(q.confidence, Confidence::Estimated);
    }

    #[test]
    fn test_quantity_set_beats_area_times_length() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let qto = b.quantity_set("Qto_BeamBaseQuantities", &[("NetVolume", QuantityType::Volume, 1.5)]);
        let pset = b.property_set(
            "Pset_Dims",
            &[("Area", A::Float(2.0)), ("Length", A::Float(3.0))],
        );
        b.relate(&[beam], qto);
        b.relate(&[beam], pset);

        let q = resolve(b, beam, &resolver(None));
        assert_eq!(q.value, Some(1.5));
        assert_eq!(q.source, Strategy::QuantitySet);
        assert_eq!(q.confidence, Confidence::Measured);
    }

    #[test]
    fn test_named_property_beats_area_times_length() {
        let mut b = SnapshotBuilder::new("IFC2X3");
        let column = b.element(IfcType::IfcColumn, "C1");
        let pset = b.property_set(
            "Pset_Dims",
            &[
                ("Area", A::Float(2.0)),
                ("Length", A::Float(3.0)),
                ("Volume", A::Float(0.9)),
            ],
        );
        b.relate(&[column], pset);

        let q = resolve(b, column, &resolver(None));
        assert_eq!(q.value, Some(0.9));
        assert_eq!(q.source, Strategy::NamedProperty);
        assert_eq!(q.confidence, Confidence::Measured);
    }

    #[test]
    fn test_evaluator_error_falls_through() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let pset = b.property_set("Dims", &[("Area", A::Float(1.0)), ("Length", A::Float(4.0))]);
        b.relate(&[beam], pset);

        let r = QuantityResolver::new().with_evaluator(GuardedEvaluator::new(Arc::new(Broken)));
        let q = resolve(b, beam, &r);
        assert_eq!(q.value, Some(4.0));
        assert_eq!(q.confidence, Confidence::Estimated);
    }

    #[test]
    fn test_unavailable_when_everything_fails() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let pset = b.property_set("Dims", &[("Area", A::Float(1.0))]);
        b.relate(&[beam], pset);

        let q = resolve(b, beam, &QuantityResolver::new());
        assert_eq!(q.value, None);
        assert_eq!(q.source, Strategy::None);
        assert_eq!(q.confidence, Confidence::Unavailable);
    }

    #[test]
    fn test_broken_quantity_set_does_not_abort() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        b.relate(&[beam], EntityId(999));

        let q = resolve(b, beam, &resolver(Some(1.5)));
        assert_eq!(q.value, Some(1.5));
        assert_eq!(q.source, Strategy::Geometry);
    }

    #[test]
    fn test_timeout_counts_as_unavailable() {
        struct Slow;
        impl VolumeEvaluator for Slow {
            fn volume(&self, _: &DecodedEntity, _: &dyn IfcModel) -> ifc_qto_model::Result<Option<f64>> {
                std::thread::sleep(Duration::from_secs(2));
                Ok(Some(1.0))
            }
        }

        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let guard = GuardedEvaluator::new(Arc::new(Slow)).with_timeout(Some(Duration::from_millis(20)));
        let q = resolve(b, beam, &QuantityResolver::new().with_evaluator(guard));
        assert_eq!(q.confidence, Confidence::Unavailable);
    }

    #[test]
    fn test_area_kind_skips_volume_only_strategies() {
        let mut b = SnapshotBuilder::new("IFC4");
        let slab = b.element(IfcType::IfcSlab, "S1");
        let qto = b.quantity_set("Qto", &[("NetArea", QuantityType::Area, 12.0)]);
        b.relate(&[slab], qto);
        let model: Arc<dyn IfcModel> = Arc::new(b.build().unwrap());
        let entity = model.resolver().get(slab).unwrap();

        let r = resolver(Some(5.0));
        assert_eq!(r.resolve(&model, &entity, QuantityKind::Area).value, Some(12.0));
        let length = r.resolve(&model, &entity, QuantityKind::Length);
        assert_eq!(length.confidence, Confidence::Unavailable);
    }
}

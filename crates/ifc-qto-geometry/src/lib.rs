// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-QTO Geometry (Trait-Based)
//!
//! Analytic solid volumes for IFC products. This crate uses the
//! `EntityResolver` trait from `ifc-qto-model` for entity lookup, making it
//! independent of any specific model backend.
//!
//! It is one evaluator among possible others: `ifc-qto-core` only sees the
//! `VolumeEvaluator` trait and never depends on this crate.
//!
//! ## Overview
//!
//! - **Profiles**: Closed-form areas for rectangle, circle and hollow sections,
//!   shoelace areas for arbitrary polylines with voids
//! - **Extrusions**: Profile area times depth, projected for oblique sweeps
//! - **Meshes**: Divergence-theorem volumes for closed triangulated face sets
//!   and faceted breps
//! - **Instancing**: MappedItem sources, scaled by the mapping target
//!
//! ## Architecture
//!
//! - `VolumeProcessor`: Trait for individual representation item types
//! - `VolumeRouter`: Walks the body representation and dispatches items
//! - `VolumeEvaluator`: Trait from ifc-qto-model, implemented by the router
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_qto_geometry::VolumeRouter;
//! use ifc_qto_model::VolumeEvaluator;
//!
//! let router = VolumeRouter::with_default_processors();
//! if let Some(m3) = router.volume(&beam, model.as_ref())? {
//!     println!("{} m³", m3);
//! }
//! ```

pub mod error;
pub mod processors;
pub mod profile;
pub mod router;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use error::{Error, Result};
pub use processors::{
    ExtrudedAreaSolidProcessor, FacetedBrepProcessor, TriangulatedFaceSetProcessor,
    VolumeProcessor,
};
pub use profile::{polygon_area, Profile2D};
pub use router::VolumeRouter;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ifc_qto_model::{AttributeValue as A, EntityId, IfcModel, IfcType, VolumeEvaluator};
    use ifc_qto_snapshot::SnapshotBuilder;

    fn floats(values: &[f64]) -> A {
        A::List(values.iter().map(|v| A::Float(*v)).collect())
    }

    fn refs(ids: &[EntityId]) -> A {
        A::List(ids.iter().map(|id| A::EntityRef(*id)).collect())
    }

    fn rectangle_extrusion(b: &mut SnapshotBuilder, x: f64, y: f64, depth: f64, dir: &[f64]) -> EntityId {
        let profile = b.add(
            IfcType::IfcRectangleProfileDef,
            vec![A::Enum("AREA".into()), A::Null, A::Null, A::Float(x), A::Float(y)],
        );
        let direction = b.add(IfcType::IfcDirection, vec![floats(dir)]);
        b.add(
            IfcType::IfcExtrudedAreaSolid,
            vec![
                A::EntityRef(profile),
                A::Null,
                A::EntityRef(direction),
                A::Float(depth),
            ],
        )
    }

    const CUBE: [[f64; 3]; 8] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];

    fn triangulated_cube(b: &mut SnapshotBuilder, closed: bool) -> EntityId {
        let points = b.add(
            IfcType::IfcCartesianPointList3D,
            vec![A::List(CUBE.iter().map(|p| floats(p)).collect())],
        );
        let triangles: [[i64; 3]; 12] = [
            [1, 3, 2],
            [1, 4, 3],
            [5, 6, 7],
            [5, 7, 8],
            [1, 2, 6],
            [1, 6, 5],
            [4, 8, 7],
            [4, 7, 3],
            [1, 5, 8],
            [1, 8, 4],
            [2, 3, 7],
            [2, 7, 6],
        ];
        let index = A::List(
            triangles
                .iter()
                .map(|t| A::List(t.iter().map(|i| A::Integer(*i)).collect()))
                .collect(),
        );
        b.add(
            IfcType::IfcTriangulatedFaceSet,
            vec![A::EntityRef(points), A::Null, A::Bool(closed), index],
        )
    }

    fn model_volume(b: SnapshotBuilder, product: EntityId) -> ifc_qto_model::Result<Option<f64>> {
        let model = b.build().unwrap();
        let entity = model.resolver().get(product).unwrap();
        VolumeRouter::with_default_processors().volume(&entity, &model)
    }

    #[test]
    fn test_extruded_rectangle() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        let solid = rectangle_extrusion(&mut b, 0.3, 0.5, 4.0, &[0.0, 0.0, 1.0]);
        b.representation(beam, &[solid]);

        assert_relative_eq!(model_volume(b, beam).unwrap().unwrap(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_oblique_extrusion_projects_depth() {
        let mut b = SnapshotBuilder::new("IFC4");
        let column = b.element(IfcType::IfcColumn, "C1");
        let solid = rectangle_extrusion(&mut b, 1.0, 1.0, 2.0, &[0.0, 1.0, 1.0]);
        b.representation(column, &[solid]);

        let expected = 2.0 / 2.0_f64.sqrt();
        assert_relative_eq!(model_volume(b, column).unwrap().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_millimetre_model_is_scaled_to_cubic_metres() {
        let mut b = SnapshotBuilder::new("IFC4");
        let project = b.element(IfcType::IfcProject, "P");
        let unit = b.add(
            IfcType::IfcSIUnit,
            vec![
                A::Derived,
                A::Enum("LENGTHUNIT".into()),
                A::Enum("MILLI".into()),
                A::Enum("METRE".into()),
            ],
        );
        let assignment = b.add(IfcType::IfcUnitAssignment, vec![refs(&[unit])]);
        b.set_attribute(project, 8, A::EntityRef(assignment));

        let beam = b.element(IfcType::IfcBeam, "B1");
        let solid = rectangle_extrusion(&mut b, 300.0, 500.0, 4000.0, &[0.0, 0.0, 1.0]);
        b.representation(beam, &[solid]);

        assert_relative_eq!(model_volume(b, beam).unwrap().unwrap(), 0.6, epsilon = 1e-9);
    }

    #[test]
    fn test_triangulated_cube() {
        let mut b = SnapshotBuilder::new("IFC4");
        let proxy = b.element(IfcType::IfcBuildingElementProxy, "X");
        let mesh = triangulated_cube(&mut b, true);
        b.representation(proxy, &[mesh]);

        assert_relative_eq!(model_volume(b, proxy).unwrap().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_face_set_is_an_error() {
        let mut b = SnapshotBuilder::new("IFC4");
        let proxy = b.element(IfcType::IfcBuildingElementProxy, "X");
        let mesh = triangulated_cube(&mut b, false);
        b.representation(proxy, &[mesh]);

        assert!(model_volume(b, proxy).is_err());
    }

    #[test]
    fn test_faceted_brep_cube() {
        let mut b = SnapshotBuilder::new("IFC2X3");
        let slab = b.element(IfcType::IfcSlab, "S1");
        let points: Vec<EntityId> = CUBE
            .iter()
            .map(|p| b.add(IfcType::IfcCartesianPoint, vec![floats(p)]))
            .collect();
        let quads: [[usize; 4]; 6] = [
            [1, 4, 3, 2],
            [5, 6, 7, 8],
            [1, 2, 6, 5],
            [4, 8, 7, 3],
            [1, 5, 8, 4],
            [2, 3, 7, 6],
        ];
        let faces: Vec<EntityId> = quads
            .iter()
            .map(|q| {
                let corners: Vec<EntityId> = q.iter().map(|i| points[i - 1]).collect();
                let poly_loop = b.add(IfcType::IfcPolyLoop, vec![refs(&corners)]);
                let bound = b.add(
                    IfcType::IfcFaceOuterBound,
                    vec![A::EntityRef(poly_loop), A::Bool(true)],
                );
                b.add(IfcType::IfcFace, vec![refs(&[bound])])
            })
            .collect();
        let shell = b.add(IfcType::IfcClosedShell, vec![refs(&faces)]);
        let brep = b.add(IfcType::IfcFacetedBrep, vec![A::EntityRef(shell)]);
        b.representation(slab, &[brep]);

        assert_relative_eq!(model_volume(b, slab).unwrap().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mapped_item_scale_is_cubed() {
        let mut b = SnapshotBuilder::new("IFC4");
        let pile = b.element(IfcType::IfcPile, "P1");
        let solid = rectangle_extrusion(&mut b, 1.0, 1.0, 1.0, &[0.0, 0.0, 1.0]);
        let source = b.add(
            IfcType::IfcShapeRepresentation,
            vec![A::Null, A::String("Body".into()), A::Null, refs(&[solid])],
        );
        let map = b.add(IfcType::IfcRepresentationMap, vec![A::Null, A::EntityRef(source)]);
        let target = b.add(
            IfcType::IfcCartesianTransformationOperator3D,
            vec![A::Null, A::Null, A::Null, A::Float(2.0)],
        );
        let instance = b.add(
            IfcType::IfcMappedItem,
            vec![A::EntityRef(map), A::EntityRef(target)],
        );
        b.representation(pile, &[instance]);

        assert_relative_eq!(model_volume(b, pile).unwrap().unwrap(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_product_without_representation() {
        let mut b = SnapshotBuilder::new("IFC4");
        let beam = b.element(IfcType::IfcBeam, "B1");
        assert_eq!(model_volume(b, beam).unwrap(), None);
    }

    #[test]
    fn test_unsupported_item_fails_whole_product() {
        let mut b = SnapshotBuilder::new("IFC4");
        let wall = b.element(IfcType::IfcWall, "W1");
        let solid = rectangle_extrusion(&mut b, 1.0, 1.0, 1.0, &[0.0, 0.0, 1.0]);
        let clipped = b.add(IfcType::IfcBooleanClippingResult, vec![A::Null]);
        b.representation(wall, &[solid, clipped]);

        assert!(model_volume(b, wall).is_err());
    }

    #[test]
    fn test_router_registration() {
        let router = VolumeRouter::new();
        assert!(!router.has_processor(&IfcType::IfcExtrudedAreaSolid));
        let router = VolumeRouter::with_default_processors();
        assert!(router.has_processor(&IfcType::IfcExtrudedAreaSolid));
        assert!(router.has_processor(&IfcType::IfcFacetedBrep));
        assert!(!router.has_processor(&IfcType::IfcBooleanClippingResult));
    }
}

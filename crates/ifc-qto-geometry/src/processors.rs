// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Volume processors - one per solid representation type
//!
//! Each processor computes the enclosed volume of a representation item in
//! file units cubed. Processors use the `EntityResolver` trait for lookups.

use crate::profile::Profile2D;
use crate::{Error, Result};
use ifc_qto_model::{AttributeValue, DecodedEntity, EntityId, EntityResolver, IfcType};
use nalgebra::{Point2, Point3, Vector3};

/// Volume processor trait
///
/// Processors are registered with the [`VolumeRouter`](crate::VolumeRouter)
/// for the types they report in `supported_types`.
pub trait VolumeProcessor: Send + Sync {
    /// Enclosed volume of `item` in file units cubed
    fn volume(&self, item: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<f64>;

    /// Get supported IFC types
    fn supported_types(&self) -> Vec<IfcType>;
}

fn get_entity(id: EntityId, resolver: &dyn EntityResolver) -> Result<std::sync::Arc<DecodedEntity>> {
    resolver.get(id).ok_or_else(|| Error::entity_not_found(id.0))
}

fn coordinate(values: &[AttributeValue], axis: usize) -> f64 {
    values.get(axis).and_then(|v| v.as_float()).unwrap_or(0.0)
}

/// IfcCartesianPoint has Coordinates at index 0
fn point_3d(id: EntityId, resolver: &dyn EntityResolver) -> Result<Point3<f64>> {
    let point = get_entity(id, resolver)?;
    let coords = point
        .get_list(0)
        .ok_or_else(|| Error::invalid_attribute(0, "Missing Coordinates"))?;
    Ok(Point3::new(
        coordinate(coords, 0),
        coordinate(coords, 1),
        coordinate(coords, 2),
    ))
}

/// ExtrudedAreaSolid processor
///
/// Volume is profile area times depth, projected onto the profile normal
/// when the extrusion direction is oblique.
pub struct ExtrudedAreaSolidProcessor;

impl ExtrudedAreaSolidProcessor {
    /// Create new processor
    pub fn new() -> Self {
        Self
    }

    /// Extract a 2D profile from an IFC profile definition
    fn extract_profile(
        &self,
        profile: &DecodedEntity,
        resolver: &dyn EntityResolver,
    ) -> Result<Profile2D> {
        match profile.ifc_type {
            IfcType::IfcRectangleProfileDef => {
                // XDim at index 3, YDim at index 4
                Ok(Profile2D::rectangle(
                    required_float(profile, 3, "XDim")?,
                    required_float(profile, 4, "YDim")?,
                ))
            }
            IfcType::IfcRectangleHollowProfileDef => Ok(Profile2D::RectangleHollow {
                width: required_float(profile, 3, "XDim")?,
                height: required_float(profile, 4, "YDim")?,
                wall: required_float(profile, 5, "WallThickness")?,
            }),
            IfcType::IfcCircleProfileDef => {
                Ok(Profile2D::circle(required_float(profile, 3, "Radius")?))
            }
            IfcType::IfcCircleHollowProfileDef => Ok(Profile2D::CircleHollow {
                radius: required_float(profile, 3, "Radius")?,
                wall: required_float(profile, 4, "WallThickness")?,
            }),
            IfcType::IfcArbitraryClosedProfileDef => {
                // OuterCurve at index 2
                let curve = profile
                    .get_ref(2)
                    .ok_or_else(|| Error::invalid_attribute(2, "Missing OuterCurve"))?;
                Ok(Profile2D::polygon(self.extract_curve_points(curve, resolver)?))
            }
            IfcType::IfcArbitraryProfileDefWithVoids => {
                let curve = profile
                    .get_ref(2)
                    .ok_or_else(|| Error::invalid_attribute(2, "Missing OuterCurve"))?;
                let outer = self.extract_curve_points(curve, resolver)?;

                // InnerCurves at index 3
                let mut holes = Vec::new();
                for inner in profile.get_refs(3).unwrap_or_default() {
                    holes.push(self.extract_curve_points(inner, resolver)?);
                }
                Ok(Profile2D::Polygon { outer, holes })
            }
            _ => Err(Error::unsupported_type(format!(
                "Profile type {}",
                profile.ifc_type.display_name()
            ))),
        }
    }

    /// Points of a bounded 2D curve
    fn extract_curve_points(
        &self,
        curve_id: EntityId,
        resolver: &dyn EntityResolver,
    ) -> Result<Vec<Point2<f64>>> {
        let curve = get_entity(curve_id, resolver)?;

        let mut points = match curve.ifc_type {
            IfcType::IfcPolyline => {
                // Points at index 0
                let refs = curve
                    .get_refs(0)
                    .ok_or_else(|| Error::invalid_attribute(0, "Missing Points"))?;
                let mut points = Vec::with_capacity(refs.len());
                for id in refs {
                    let p = point_3d(id, resolver)?;
                    points.push(Point2::new(p.x, p.y));
                }
                points
            }
            IfcType::IfcIndexedPolyCurve => {
                // Points at index 0 (IfcCartesianPointList2D), CoordList at index 0
                let list_id = curve
                    .get_ref(0)
                    .ok_or_else(|| Error::invalid_attribute(0, "Missing Points"))?;
                let list = get_entity(list_id, resolver)?;
                let coords = list
                    .get_list(0)
                    .ok_or_else(|| Error::invalid_attribute(0, "Missing CoordList"))?;
                coords
                    .iter()
                    .filter_map(|c| c.as_list())
                    .map(|c| Point2::new(coordinate(c, 0), coordinate(c, 1)))
                    .collect()
            }
            _ => {
                return Err(Error::unsupported_type(format!(
                    "Curve type {}",
                    curve.ifc_type.display_name()
                )))
            }
        };

        // Drop the closing point of explicitly closed polylines
        let closed = match (points.first(), points.last()) {
            (Some(first), Some(last)) => points.len() > 1 && (first - last).norm() < 1e-10,
            _ => false,
        };
        if closed {
            points.pop();
        }

        Ok(points)
    }

    /// IfcDirection DirectionRatios at index 0
    fn extract_direction(&self, id: EntityId, resolver: &dyn EntityResolver) -> Result<Vector3<f64>> {
        let direction = get_entity(id, resolver)?;
        let ratios = direction
            .get_list(0)
            .ok_or_else(|| Error::invalid_attribute(0, "Missing DirectionRatios"))?;
        Ok(Vector3::new(
            coordinate(ratios, 0),
            coordinate(ratios, 1),
            coordinate(ratios, 2),
        ))
    }
}

impl Default for ExtrudedAreaSolidProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeProcessor for ExtrudedAreaSolidProcessor {
    fn volume(&self, item: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<f64> {
        // IfcExtrudedAreaSolid attributes:
        // 0: SweptArea (IfcProfileDef)
        // 1: Position (IfcAxis2Placement3D)
        // 2: ExtrudedDirection (IfcDirection)
        // 3: Depth

        let profile_id = item
            .get_ref(0)
            .ok_or_else(|| Error::invalid_attribute(0, "Missing SweptArea"))?;
        let profile = get_entity(profile_id, resolver)?;
        let area = self.extract_profile(&profile, resolver)?.area()?;

        let depth = required_float(item, 3, "Depth")?;
        if depth <= 0.0 {
            return Err(Error::degenerate(format!("extrusion depth {}", depth)));
        }

        // Position only moves the solid; the direction is given in its frame
        let direction = match item.get_ref(2) {
            Some(id) => self.extract_direction(id, resolver)?,
            None => Vector3::z(),
        };
        let length = direction.norm();
        if length < 1e-12 {
            return Err(Error::degenerate("zero extrusion direction"));
        }

        Ok(area * depth * (direction.z.abs() / length))
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcExtrudedAreaSolid]
    }
}

/// TriangulatedFaceSet processor
///
/// Sums signed tetrahedra against the origin; the face set must be closed.
pub struct TriangulatedFaceSetProcessor;

impl TriangulatedFaceSetProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TriangulatedFaceSetProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeProcessor for TriangulatedFaceSetProcessor {
    fn volume(&self, item: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<f64> {
        // IfcTriangulatedFaceSet attributes:
        // 0: Coordinates (IfcCartesianPointList3D)
        // 1: Normals (optional)
        // 2: Closed (optional)
        // 3: CoordIndex (list of list of IfcPositiveInteger)

        if item.get(2).and_then(|v| v.as_bool()) == Some(false) {
            return Err(Error::degenerate("open triangulated face set"));
        }

        let coord_id = item
            .get_ref(0)
            .ok_or_else(|| Error::invalid_attribute(0, "Missing Coordinates"))?;
        let coord_entity = get_entity(coord_id, resolver)?;

        // IfcCartesianPointList3D has CoordList at index 0
        let positions: Vec<Point3<f64>> = coord_entity
            .get_list(0)
            .ok_or_else(|| Error::invalid_attribute(0, "Missing CoordList"))?
            .iter()
            .filter_map(|c| c.as_list())
            .map(|c| Point3::new(coordinate(c, 0), coordinate(c, 1), coordinate(c, 2)))
            .collect();

        let faces = item
            .get_list(3)
            .ok_or_else(|| Error::invalid_attribute(3, "Missing CoordIndex"))?;

        let mut six_volume = 0.0;
        for face in faces {
            let triangle = face
                .as_list()
                .ok_or_else(|| Error::invalid_attribute(3, "Expected list for triangle"))?;
            if triangle.len() < 3 {
                return Err(Error::invalid_attribute(3, "Triangle with fewer than 3 indices"));
            }

            // IFC uses 1-based indexing
            let mut corners = [Point3::origin(); 3];
            for (corner, index) in corners.iter_mut().zip(triangle) {
                let i = index
                    .as_integer()
                    .filter(|i| *i >= 1 && (*i as usize) <= positions.len())
                    .ok_or_else(|| Error::invalid_attribute(3, "Coordinate index out of range"))?;
                *corner = positions[i as usize - 1];
            }
            six_volume += signed_tetra(&corners[0], &corners[1], &corners[2]);
        }

        Ok(six_volume.abs() / 6.0)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcTriangulatedFaceSet]
    }
}

/// FacetedBrep processor
///
/// Handles IfcFacetedBrep with planar poly-loop faces, inner bounds included.
pub struct FacetedBrepProcessor;

impl FacetedBrepProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Polygon points of a face bound, reversed when Orientation is false
    fn extract_bound_points(
        &self,
        bound_id: EntityId,
        resolver: &dyn EntityResolver,
    ) -> Result<Vec<Point3<f64>>> {
        // IfcFaceBound: Bound at index 0, Orientation at index 1
        let bound = get_entity(bound_id, resolver)?;
        let loop_id = bound
            .get_ref(0)
            .ok_or_else(|| Error::invalid_attribute(0, "Missing Bound"))?;
        let poly_loop = get_entity(loop_id, resolver)?;
        if poly_loop.ifc_type != IfcType::IfcPolyLoop {
            return Err(Error::unsupported_type(format!(
                "Loop type {}",
                poly_loop.ifc_type.display_name()
            )));
        }

        // IfcPolyLoop has Polygon at index 0
        let refs = poly_loop
            .get_refs(0)
            .ok_or_else(|| Error::invalid_attribute(0, "Missing Polygon"))?;
        let mut points = Vec::with_capacity(refs.len());
        for id in refs {
            points.push(point_3d(id, resolver)?);
        }

        if bound.get(1).and_then(|v| v.as_bool()) == Some(false) {
            points.reverse();
        }
        Ok(points)
    }
}

impl Default for FacetedBrepProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeProcessor for FacetedBrepProcessor {
    fn volume(&self, item: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<f64> {
        // IfcFacetedBrep: Outer (IfcClosedShell) at index 0
        let shell_id = item
            .get_ref(0)
            .ok_or_else(|| Error::invalid_attribute(0, "Missing Outer"))?;
        let shell = get_entity(shell_id, resolver)?;

        // IfcClosedShell: CfsFaces at index 0
        let faces = shell
            .get_refs(0)
            .ok_or_else(|| Error::invalid_attribute(0, "Missing CfsFaces"))?;
        if faces.is_empty() {
            return Err(Error::degenerate("closed shell without faces"));
        }

        let mut six_volume = 0.0;
        for face_id in faces {
            // IfcFace: Bounds at index 0
            let face = get_entity(face_id, resolver)?;
            let bounds = face
                .get_refs(0)
                .ok_or_else(|| Error::invalid_attribute(0, "Missing Bounds"))?;

            // Inner loops wind opposite to the outer loop, so summing every
            // bound subtracts the holes.
            for bound_id in bounds {
                let points = self.extract_bound_points(bound_id, resolver)?;
                if points.len() < 3 {
                    continue;
                }
                for i in 1..points.len() - 1 {
                    six_volume += signed_tetra(&points[0], &points[i], &points[i + 1]);
                }
            }
        }

        Ok(six_volume.abs() / 6.0)
    }

    fn supported_types(&self) -> Vec<IfcType> {
        vec![IfcType::IfcFacetedBrep]
    }
}

/// Six times the signed volume of the tetrahedron (origin, a, b, c)
fn signed_tetra(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    a.coords.dot(&b.coords.cross(&c.coords))
}

fn required_float(entity: &DecodedEntity, index: usize, name: &str) -> Result<f64> {
    entity
        .get_float(index)
        .ok_or_else(|| Error::invalid_attribute(index, format!("Missing {}", name)))
}

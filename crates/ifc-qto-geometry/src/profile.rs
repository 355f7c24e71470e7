// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D profile definitions and their enclosed areas

use crate::error::{Error, Result};
use nalgebra::Point2;
use std::f64::consts::PI;

/// Cross-section of a swept solid
#[derive(Debug, Clone, PartialEq)]
pub enum Profile2D {
    Rectangle { width: f64, height: f64 },
    RectangleHollow { width: f64, height: f64, wall: f64 },
    Circle { radius: f64 },
    CircleHollow { radius: f64, wall: f64 },
    /// Closed polygon, optionally with inner voids
    Polygon {
        outer: Vec<Point2<f64>>,
        holes: Vec<Vec<Point2<f64>>>,
    },
}

impl Profile2D {
    /// Create a rectangular profile
    pub fn rectangle(width: f64, height: f64) -> Self {
        Profile2D::Rectangle { width, height }
    }

    /// Create a circular profile
    pub fn circle(radius: f64) -> Self {
        Profile2D::Circle { radius }
    }

    /// Create a polygon profile without voids
    pub fn polygon(outer: Vec<Point2<f64>>) -> Self {
        Profile2D::Polygon {
            outer,
            holes: Vec::new(),
        }
    }

    /// Enclosed area in profile units squared
    pub fn area(&self) -> Result<f64> {
        let area = match self {
            Profile2D::Rectangle { width, height } => width * height,
            Profile2D::RectangleHollow {
                width,
                height,
                wall,
            } => {
                let inner_w = width - 2.0 * wall;
                let inner_h = height - 2.0 * wall;
                if inner_w <= 0.0 || inner_h <= 0.0 {
                    return Err(Error::profile("hollow rectangle wall exceeds dimensions"));
                }
                width * height - inner_w * inner_h
            }
            Profile2D::Circle { radius } => PI * radius * radius,
            Profile2D::CircleHollow { radius, wall } => {
                let inner = radius - wall;
                if inner <= 0.0 {
                    return Err(Error::profile("invalid hollow circle: inner radius <= 0"));
                }
                PI * (radius * radius - inner * inner)
            }
            Profile2D::Polygon { outer, holes } => {
                if outer.len() < 3 {
                    return Err(Error::profile("profile must have at least 3 vertices"));
                }
                let voids: f64 = holes.iter().map(|h| polygon_area(h)).sum();
                polygon_area(outer) - voids
            }
        };

        if !area.is_finite() || area < 0.0 {
            return Err(Error::profile(format!("invalid profile area {}", area)));
        }
        Ok(area)
    }
}

/// Unsigned shoelace area of a closed polygon
///
/// The closing edge is implicit; a repeated first point contributes nothing.
pub fn polygon_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice.abs() / 2.0
}

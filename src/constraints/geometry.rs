//! Geometric primitives defining skew and symmetry boundaries

use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};
use crate::math::{argmax_abs, cross3, norm};

/// A line in the XY plane, used for 2D problems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    normal: [f64; 2],
}

impl Line {
    /// Line through two points; the normal is the direction rotated +90°
    pub fn through(p1: [f64; 2], p2: [f64; 2]) -> Self {
        let dx = p2[0] - p1[0];
        let dy = p2[1] - p1[1];
        Self { normal: [-dy, dx] }
    }

    /// Line given by its (not necessarily unit) normal
    pub fn with_normal(normal: [f64; 2]) -> Self {
        Self { normal }
    }

    pub fn normal(&self) -> [f64; 2] {
        self.normal
    }
}

/// A plane in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    normal: [f64; 3],
}

impl Plane {
    /// Plane through three points, normal = (p2 - p1) x (p3 - p1)
    pub fn through(p1: [f64; 3], p2: [f64; 3], p3: [f64; 3]) -> Self {
        let u = [p2[0] - p1[0], p2[1] - p1[1], p2[2] - p1[2]];
        let v = [p3[0] - p1[0], p3[1] - p1[1], p3[2] - p1[2]];
        Self {
            normal: cross3(&u, &v),
        }
    }

    /// Plane given by its (not necessarily unit) normal
    pub fn with_normal(normal: [f64; 3]) -> Self {
        Self { normal }
    }

    pub fn normal(&self) -> [f64; 3] {
        self.normal
    }
}

/// Boundary geometry of a skew or symmetry constraint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SkewGeometry {
    Line(Line),
    Plane(Plane),
}

impl SkewGeometry {
    /// Spatial dimension the geometry lives in
    pub fn dim(&self) -> usize {
        match self {
            SkewGeometry::Line(_) => 2,
            SkewGeometry::Plane(_) => 3,
        }
    }

    /// Unit normal, one component per spatial dimension
    ///
    /// Fails with `DegenerateNormal` when the normal has zero (or
    /// non-finite) length, or its largest component is zero.
    pub fn unit_normal(&self) -> FEAResult<Vec<f64>> {
        let raw: Vec<f64> = match self {
            SkewGeometry::Line(line) => line.normal.to_vec(),
            SkewGeometry::Plane(plane) => plane.normal.to_vec(),
        };

        let length = norm(&raw);
        if !length.is_finite() || length == 0.0 {
            return Err(FEAError::DegenerateNormal(format!(
                "normal {:?} has length {}",
                raw, length
            )));
        }

        let unit: Vec<f64> = raw.iter().map(|x| x / length).collect();
        match argmax_abs(&unit) {
            Some((_, max)) if max > 0.0 => Ok(unit),
            _ => Err(FEAError::DegenerateNormal(format!(
                "normal {:?} has no nonzero component",
                raw
            ))),
        }
    }
}

impl From<Line> for SkewGeometry {
    fn from(line: Line) -> Self {
        SkewGeometry::Line(line)
    }
}

impl From<Plane> for SkewGeometry {
    fn from(plane: Plane) -> Self {
        SkewGeometry::Plane(plane)
    }
}

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// Circular profile arc in the XZ plane, centered at the origin.
///
/// Angle `0` lies on `+X` and the sweep turns toward `+Z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    radius: f64,
    sweep: f64,
}

impl Arc {
    /// Quarter circle from `(1, 0, 0)` to `(0, 0, 1)`, the dome profile.
    #[must_use]
    pub fn unit_quarter_xz() -> Self {
        Self {
            radius: 1.0,
            sweep: FRAC_PI_2,
        }
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Point at angle `t` (radians), not limited to the sweep.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        Point3::new(self.radius * c, 0.0, self.radius * s)
    }
}

impl Curve for Arc {
    fn evaluate(&self, t: f64) -> Point3 {
        self.point_at(t.clamp(0.0, self.sweep))
    }

    fn tangent(&self, t: f64) -> Vector3 {
        let (s, c) = t.clamp(0.0, self.sweep).sin_cos();
        Vector3::new(-s, 0.0, c)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, self.sweep)
    }

    fn is_closed(&self) -> bool {
        (self.sweep - TAU).abs() < TOLERANCE
    }
}

mod arc;
mod polyline;

pub use arc::Arc;
pub use polyline::Polyline;

use crate::math::{Point3, Vector3};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Maps a fraction in `[0, 1]` onto the domain.
    #[must_use]
    pub fn at_fraction(&self, fraction: f64) -> f64 {
        self.t_min + fraction * (self.t_max - self.t_min)
    }
}

/// Parametric curve in 3D space.
///
/// Parameters outside the domain are clamped onto it.
pub trait Curve {
    /// Evaluates the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Point3;

    /// Unit tangent at parameter `t`, or zero where the curve is degenerate.
    fn tangent(&self, t: f64) -> Vector3;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;
}

use crate::math::{BoundingBox, Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// Piecewise-linear curve through sampled points.
///
/// Parameter `t` runs over `[0, n - 1]`, one unit per segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point3>,
}

impl Polyline {
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Total length of all segments.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    fn segment(&self, t: f64) -> Option<(usize, f64)> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let t = t.clamp(0.0, (n - 1) as f64);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let i = (t.floor() as usize).min(n - 2);
        #[allow(clippy::cast_precision_loss)]
        Some((i, t - i as f64))
    }
}

impl Curve for Polyline {
    fn evaluate(&self, t: f64) -> Point3 {
        match self.segment(t) {
            Some((i, f)) => self.points[i] + (self.points[i + 1] - self.points[i]) * f,
            None => self.points.first().copied().unwrap_or_else(Point3::origin),
        }
    }

    fn tangent(&self, t: f64) -> Vector3 {
        match self.segment(t) {
            Some((i, _)) => {
                let d = self.points[i + 1] - self.points[i];
                let len = d.norm();
                if len < TOLERANCE {
                    Vector3::zeros()
                } else {
                    d / len
                }
            }
            None => Vector3::zeros(),
        }
    }

    fn domain(&self) -> CurveDomain {
        #[allow(clippy::cast_precision_loss)]
        CurveDomain::new(0.0, self.points.len().saturating_sub(1) as f64)
    }

    fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) if self.points.len() > 2 => (a - b).norm() < TOLERANCE,
            _ => false,
        }
    }
}

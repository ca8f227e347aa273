use crate::math::{transform_point, BoundingBox, Matrix4, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// Bilinear four-corner patch over `[0, 1] x [0, 1]`.
///
/// Corner `a` sits at `(0, 0)`, `b` at `(1, 0)`, `c` at `(0, 1)` and `d` at `(1, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarPatch {
    corners: [Point3; 4],
}

impl PlanarPatch {
    #[must_use]
    pub fn new(a: Point3, b: Point3, c: Point3, d: Point3) -> Self {
        Self {
            corners: [a, b, c, d],
        }
    }

    /// Corners in `a, b, c, d` order.
    #[must_use]
    pub fn corners(&self) -> &[Point3; 4] {
        &self.corners
    }

    pub fn transform(&mut self, matrix: &Matrix4) {
        for p in &mut self.corners {
            *p = transform_point(matrix, p);
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.corners)
    }
}

impl Surface for PlanarPatch {
    fn evaluate(&self, u: f64, w: f64) -> Point3 {
        let u = u.clamp(0.0, 1.0);
        let w = w.clamp(0.0, 1.0);
        let [a, b, c, d] = &self.corners;
        let coords = a.coords * ((1.0 - u) * (1.0 - w))
            + b.coords * (u * (1.0 - w))
            + c.coords * ((1.0 - u) * w)
            + d.coords * (u * w);
        Point3::from(coords)
    }

    fn normal(&self, u: f64, w: f64) -> Vector3 {
        let [a, b, c, d] = &self.corners;
        let du = (b - a) * (1.0 - w) + (d - c) * w;
        let dw = (c - a) * (1.0 - u) + (d - b) * u;
        let n = du.cross(&dw);
        let len = n.norm();
        if len < TOLERANCE {
            Vector3::zeros()
        } else {
            n / len
        }
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, 1.0, 0.0, 1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> PlanarPatch {
        PlanarPatch::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0))
    }

    #[test]
    fn corners_map_to_parameters() {
        let patch = unit_square();
        assert_eq!(patch.evaluate(1.0, 0.0), p(1.0, 0.0, 0.0));
        assert_eq!(patch.evaluate(0.0, 1.0), p(0.0, 1.0, 0.0));
        assert_relative_eq!(patch.evaluate(0.5, 0.5), p(0.5, 0.5, 0.0));
    }

    #[test]
    fn normal_follows_corner_order() {
        assert_relative_eq!(unit_square().normal(0.5, 0.5), Vector3::z());
    }

    #[test]
    fn transform_moves_corners() {
        let mut patch = unit_square();
        patch.transform(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0)));
        assert_eq!(patch.corners()[3], p(1.0, 1.0, 2.0));
    }
}

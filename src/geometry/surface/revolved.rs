use std::f64::consts::TAU;

use crate::geometry::curve::{Arc, Curve};
use crate::math::{transform_point, BoundingBox, Matrix4, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

const SAMPLES: usize = 9;
const STEP: f64 = 1e-6;

/// Profile arc revolved about the local X axis, placed by a 4x4 frame.
///
/// `u` in `[0, 1]` runs along the profile, `w` in `[0, 1]` around the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RevolvedSurface {
    profile: Arc,
    frame: Matrix4,
}

impl RevolvedSurface {
    #[must_use]
    pub fn new(profile: Arc) -> Self {
        Self {
            profile,
            frame: Matrix4::identity(),
        }
    }

    /// Unit hemisphere on the `+X` side of the origin.
    #[must_use]
    pub fn unit_hemisphere() -> Self {
        Self::new(Arc::unit_quarter_xz())
    }

    #[must_use]
    pub fn frame(&self) -> &Matrix4 {
        &self.frame
    }

    pub fn transform(&mut self, matrix: &Matrix4) {
        self.frame = matrix * self.frame;
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for i in 0..=SAMPLES {
            for j in 0..=SAMPLES * 4 {
                #[allow(clippy::cast_precision_loss)]
                let (u, w) = (i as f64 / SAMPLES as f64, j as f64 / (SAMPLES * 4) as f64);
                bbox.add_point(&self.evaluate(u, w));
            }
        }
        bbox
    }

    fn local_point(&self, u: f64, w: f64) -> Point3 {
        let t = self.profile.domain().at_fraction(u.clamp(0.0, 1.0));
        let p = self.profile.point_at(t);
        let (s, c) = (w.clamp(0.0, 1.0) * TAU).sin_cos();
        Point3::new(p.x, p.y * c - p.z * s, p.y * s + p.z * c)
    }
}

impl Surface for RevolvedSurface {
    fn evaluate(&self, u: f64, w: f64) -> Point3 {
        transform_point(&self.frame, &self.local_point(u, w))
    }

    fn normal(&self, u: f64, w: f64) -> Vector3 {
        let (u0, u1) = if u + STEP <= 1.0 { (u, u + STEP) } else { (u - STEP, u) };
        let (w0, w1) = if w + STEP <= 1.0 { (w, w + STEP) } else { (w - STEP, w) };
        let base = self.evaluate(u0, w0);
        let du = self.evaluate(u1, w0) - base;
        let dw = self.evaluate(u0, w1) - base;
        let n = du.cross(&dw);
        let len = n.norm();
        if len < TOLERANCE * TOLERANCE {
            Vector3::zeros()
        } else {
            n / len
        }
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, 1.0, 0.0, 1.0)
    }
}

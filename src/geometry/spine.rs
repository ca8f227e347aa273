use crate::math::{Point3, ANGLE_EPSILON};

use super::surface::FeaSurface;

const NUM_STATIONS: usize = 100;
const NUM_RING_POINTS: usize = 4;

/// Arc-length parametrization threaded through the centers of a surface's
/// constant-U cross-sections.
///
/// Each station center is the mean of four points spread evenly in `w`.
#[derive(Debug, Clone, Default)]
pub struct ConformalSpine {
    u: Vec<f64>,
    centers: Vec<Point3>,
    dist: Vec<f64>,
}

impl ConformalSpine {
    #[must_use]
    pub fn build(surface: &FeaSurface) -> Self {
        let u_max = surface.u_max();
        let w_max = surface.w_max();
        let mut spine = Self {
            u: Vec::with_capacity(NUM_STATIONS),
            centers: Vec::with_capacity(NUM_STATIONS),
            dist: Vec::with_capacity(NUM_STATIONS),
        };

        for i in 0..NUM_STATIONS {
            #[allow(clippy::cast_precision_loss)]
            let u = i as f64 * u_max / (NUM_STATIONS - 1) as f64;
            let sum = (0..NUM_RING_POINTS).fold(nalgebra::Vector3::zeros(), |acc, j| {
                #[allow(clippy::cast_precision_loss)]
                let w = j as f64 * w_max / NUM_RING_POINTS as f64;
                acc + surface.point(u, w).coords
            });
            #[allow(clippy::cast_precision_loss)]
            let center = Point3::from(sum / NUM_RING_POINTS as f64);
            let d = match spine.centers.last() {
                Some(prev) => spine.dist[spine.dist.len() - 1] + (center - prev).norm(),
                None => 0.0,
            };
            spine.u.push(u);
            spine.centers.push(center);
            spine.dist.push(d);
        }
        spine
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.dist.last().copied().unwrap_or(0.0)
    }

    /// Surface `u` at arc length `length`, clamped to the spine ends.
    #[must_use]
    pub fn u_at_length(&self, length: f64) -> f64 {
        if self.u.len() < 2 {
            return 0.0;
        }
        if length <= 0.0 {
            return self.u[0];
        }
        if length >= self.length() {
            return self.u[self.u.len() - 1];
        }
        let i = self.dist.partition_point(|&d| d < length).clamp(1, self.dist.len() - 1);
        let (d0, d1) = (self.dist[i - 1], self.dist[i]);
        if (length - d0).abs() <= ANGLE_EPSILON {
            return self.u[i - 1];
        }
        if (d1 - length).abs() <= ANGLE_EPSILON || d1 - d0 < f64::EPSILON {
            return self.u[i];
        }
        let f = (length - d0) / (d1 - d0);
        self.u[i - 1] + f * (self.u[i] - self.u[i - 1])
    }

    /// Spine center at surface parameter `u`, clamped to the spine ends.
    #[must_use]
    pub fn center_at_u(&self, u: f64) -> Point3 {
        let Some(first) = self.centers.first() else {
            return Point3::origin();
        };
        if self.u.len() < 2 || u <= self.u[0] {
            return *first;
        }
        let last = self.u.len() - 1;
        if u >= self.u[last] {
            return self.centers[last];
        }
        let i = self.u.partition_point(|&x| x < u).clamp(1, last);
        let du = self.u[i] - self.u[i - 1];
        if du < f64::EPSILON {
            return self.centers[i - 1];
        }
        let f = (u - self.u[i - 1]) / du;
        self.centers[i - 1] + (self.centers[i] - self.centers[i - 1]) * f
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::surface::{GridSurface, SurfaceShape};

    /// Straight tube of radius 1 along X, length 10, `u` in `[0, 5]`.
    fn tube() -> FeaSurface {
        let us: Vec<f64> = (0..=5).map(f64::from).collect();
        let ws: Vec<f64> = (0..=16).map(|j| f64::from(j) * 0.25).collect();
        let g = GridSurface::from_fn(us, ws, |u, w| {
            let a = w * FRAC_PI_2;
            Point3::new(2.0 * u, a.cos(), a.sin())
        })
        .unwrap();
        FeaSurface::new(SurfaceShape::Grid(g))
    }

    #[test]
    fn spine_follows_axis() {
        let spine = ConformalSpine::build(&tube());
        assert_relative_eq!(spine.length(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(spine.center_at_u(2.5), Point3::new(5.0, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn u_at_length_inverts_center() {
        let spine = ConformalSpine::build(&tube());
        assert_relative_eq!(spine.u_at_length(3.0), 1.5, epsilon = 1e-9);
        assert_relative_eq!(spine.u_at_length(10.0), 5.0, epsilon = 1e-9);
        assert_relative_eq!(spine.u_at_length(50.0), 5.0, epsilon = 1e-9);
        assert_relative_eq!(spine.u_at_length(-1.0), 0.0);
    }

    #[test]
    fn empty_spine_is_inert() {
        let spine = ConformalSpine::default();
        assert_eq!(spine.length(), 0.0);
        assert_eq!(spine.center_at_u(1.0), Point3::origin());
        assert_eq!(spine.u_at_length(1.0), 0.0);
    }
}

use crate::error::{GeometryError, Result};
use crate::math::{transform_point, BoundingBox, Matrix4, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDomain};

/// Surface sampled on a rectangular `(u, w)` grid, evaluated bilinearly.
///
/// Points are stored row-major: entry `i * w_params.len() + j` sits at
/// `(u_params[i], w_params[j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSurface {
    u_params: Vec<f64>,
    w_params: Vec<f64>,
    points: Vec<Point3>,
}

impl GridSurface {
    /// Creates a grid surface from parameter rows and sampled points.
    ///
    /// # Errors
    ///
    /// Returns an error if either parameter list has fewer than two entries,
    /// is not strictly increasing, or the point count does not match.
    pub fn new(u_params: Vec<f64>, w_params: Vec<f64>, points: Vec<Point3>) -> Result<Self> {
        validate_params("u", &u_params)?;
        validate_params("w", &w_params)?;
        if points.len() != u_params.len() * w_params.len() {
            return Err(GeometryError::Degenerate(format!(
                "grid expects {} points, got {}",
                u_params.len() * w_params.len(),
                points.len()
            ))
            .into());
        }
        Ok(Self {
            u_params,
            w_params,
            points,
        })
    }

    /// Samples `f` at every grid node.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GridSurface::new`].
    pub fn from_fn(
        u_params: Vec<f64>,
        w_params: Vec<f64>,
        f: impl Fn(f64, f64) -> Point3,
    ) -> Result<Self> {
        let points = u_params
            .iter()
            .flat_map(|&u| w_params.iter().map(move |&w| (u, w)))
            .map(|(u, w)| f(u, w))
            .collect();
        Self::new(u_params, w_params, points)
    }

    #[must_use]
    pub fn u_params(&self) -> &[f64] {
        &self.u_params
    }

    #[must_use]
    pub fn w_params(&self) -> &[f64] {
        &self.w_params
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    fn node(&self, i: usize, j: usize) -> &Point3 {
        &self.points[i * self.w_params.len() + j]
    }

    pub fn transform(&mut self, matrix: &Matrix4) {
        for p in &mut self.points {
            *p = transform_point(matrix, p);
        }
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Returns `true` if the first and last `u` rows coincide.
    #[must_use]
    pub fn is_closed_u(&self) -> bool {
        let last = self.u_params.len() - 1;
        (0..self.w_params.len()).all(|j| (self.node(0, j) - self.node(last, j)).norm() < TOLERANCE)
    }

    /// Returns `true` if the first and last `w` columns coincide.
    #[must_use]
    pub fn is_closed_w(&self) -> bool {
        let last = self.w_params.len() - 1;
        (0..self.u_params.len()).all(|i| (self.node(i, 0) - self.node(i, last)).norm() < TOLERANCE)
    }

    fn partials(&self, u: f64, w: f64) -> (Vector3, Vector3) {
        let (i, fu) = locate(&self.u_params, u);
        let (j, fw) = locate(&self.w_params, w);
        let du_span = self.u_params[i + 1] - self.u_params[i];
        let dw_span = self.w_params[j + 1] - self.w_params[j];
        let p00 = self.node(i, j);
        let p10 = self.node(i + 1, j);
        let p01 = self.node(i, j + 1);
        let p11 = self.node(i + 1, j + 1);
        let du = ((p10 - p00) * (1.0 - fw) + (p11 - p01) * fw) / du_span;
        let dw = ((p01 - p00) * (1.0 - fu) + (p11 - p10) * fu) / dw_span;
        (du, dw)
    }
}

impl Surface for GridSurface {
    fn evaluate(&self, u: f64, w: f64) -> Point3 {
        let (i, fu) = locate(&self.u_params, u);
        let (j, fw) = locate(&self.w_params, w);
        let p00 = self.node(i, j).coords;
        let p10 = self.node(i + 1, j).coords;
        let p01 = self.node(i, j + 1).coords;
        let p11 = self.node(i + 1, j + 1).coords;
        Point3::from(
            p00 * ((1.0 - fu) * (1.0 - fw)) + p10 * (fu * (1.0 - fw)) + p01 * ((1.0 - fu) * fw) + p11 * (fu * fw),
        )
    }

    fn normal(&self, u: f64, w: f64) -> Vector3 {
        let (du, dw) = self.partials(u, w);
        let n = du.cross(&dw);
        let len = n.norm();
        if len < TOLERANCE {
            Vector3::zeros()
        } else {
            n / len
        }
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(
            self.u_params[0],
            self.u_params[self.u_params.len() - 1],
            self.w_params[0],
            self.w_params[self.w_params.len() - 1],
        )
    }
}

fn validate_params(name: &str, params: &[f64]) -> Result<()> {
    if params.len() < 2 {
        return Err(GeometryError::Degenerate(format!("{name} grid needs at least two rows")).into());
    }
    if params.windows(2).any(|w| w[1] - w[0] <= TOLERANCE) {
        return Err(GeometryError::Degenerate(format!("{name} grid must be strictly increasing")).into());
    }
    Ok(())
}

/// Cell index and in-cell fraction for `x`, clamped to the parameter range.
fn locate(params: &[f64], x: f64) -> (usize, f64) {
    let last = params.len() - 1;
    let x = x.clamp(params[0], params[last]);
    let i = params.partition_point(|&p| p <= x).saturating_sub(1).min(last - 1);
    let f = (x - params[i]) / (params[i + 1] - params[i]);
    (i, f)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn plane_grid() -> GridSurface {
        GridSurface::from_fn(vec![0.0, 1.0, 2.0], vec![0.0, 0.5, 1.0], |u, w| Point3::new(u, w, 0.0)).unwrap()
    }

    #[test]
    fn bilinear_evaluation() {
        let g = plane_grid();
        assert_relative_eq!(g.evaluate(1.5, 0.25), Point3::new(1.5, 0.25, 0.0), epsilon = 1e-12);
        assert_relative_eq!(g.evaluate(5.0, -1.0), Point3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn normal_of_flat_grid() {
        assert_relative_eq!(plane_grid().normal(0.3, 0.7), Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn mismatched_points_rejected() {
        let r = GridSurface::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![Point3::origin(); 3]);
        assert!(r.is_err());
    }

    #[test]
    fn non_increasing_params_rejected() {
        let r = GridSurface::from_fn(vec![0.0, 0.0], vec![0.0, 1.0], |u, w| Point3::new(u, w, 0.0));
        assert!(r.is_err());
    }

    #[test]
    fn closed_in_w() {
        let tube = GridSurface::from_fn(vec![0.0, 1.0], vec![0.0, 1.0, 2.0, 3.0, 4.0], |u, w| {
            let a = w * std::f64::consts::FRAC_PI_2;
            Point3::new(u, a.cos(), a.sin())
        })
        .unwrap();
        assert!(tube.is_closed_w());
        assert!(!tube.is_closed_u());
    }
}

mod grid;
mod patch;
mod plane;
mod revolved;

pub use grid::GridSurface;
pub use patch::PlanarPatch;
pub use plane::Plane;
pub use revolved::RevolvedSurface;

use serde::{Deserialize, Serialize};

use crate::geometry::curve::Polyline;
use crate::math::{BoundingBox, Matrix4, Point3, Vector3, TOLERANCE};

/// Parameter domain for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Start of the U parameter range.
    pub u_min: f64,
    /// End of the U parameter range.
    pub u_max: f64,
    /// Start of the W parameter range.
    pub w_min: f64,
    /// End of the W parameter range.
    pub w_max: f64,
}

impl SurfaceDomain {
    /// Creates a new surface domain.
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, w_min: f64, w_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            w_min,
            w_max,
        }
    }

    /// Returns `true` if `(u, w)` lies inside the domain (inclusive).
    #[must_use]
    pub fn contains(&self, u: f64, w: f64) -> bool {
        u >= self.u_min - TOLERANCE
            && u <= self.u_max + TOLERANCE
            && w >= self.w_min - TOLERANCE
            && w <= self.w_max + TOLERANCE
    }
}

/// Trait for parametric surfaces in 3D space.
///
/// Parameters outside the domain are clamped onto it.
pub trait Surface {
    /// Evaluates the surface at `(u, w)`.
    fn evaluate(&self, u: f64, w: f64) -> Point3;

    /// Unit geometric normal at `(u, w)`, zero where the surface is degenerate.
    fn normal(&self, u: f64, w: f64) -> Vector3;

    /// Returns the parameter domain of the surface.
    fn domain(&self) -> SurfaceDomain;
}

/// Element-type tag handed to the mesher along with a surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceRole {
    /// Outer mold line.
    #[default]
    Normal,
    /// Shell-meshed internal member.
    Structure,
    /// Beam-only member.
    Stiffener,
}

/// Geometry carried by an [`FeaSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceShape {
    Grid(GridSurface),
    Planar(PlanarPatch),
    Revolved(RevolvedSurface),
}

impl SurfaceShape {
    fn as_surface(&self) -> &dyn Surface {
        match self {
            Self::Grid(g) => g as &dyn Surface,
            Self::Planar(p) => p as &dyn Surface,
            Self::Revolved(r) => r as &dyn Surface,
        }
    }
}

/// Rectangular region of a surface's parameter domain between split features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamPatch {
    pub u_min: f64,
    pub u_max: f64,
    pub w_min: f64,
    pub w_max: f64,
}

/// A surface as exchanged between parts, symmetry propagation and the mesher.
///
/// Carries the normal-sense flag, the element-type role and the constant-U/W
/// feature lines along which the mesher splits the surface into patches.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaSurface {
    shape: SurfaceShape,
    flip_normal: bool,
    role: SurfaceRole,
    u_features: Vec<f64>,
    w_features: Vec<f64>,
}

impl FeaSurface {
    /// Wraps a shape with features at the domain ends only.
    #[must_use]
    pub fn new(shape: SurfaceShape) -> Self {
        let domain = shape.as_surface().domain();
        Self {
            shape,
            flip_normal: false,
            role: SurfaceRole::Normal,
            u_features: vec![domain.u_min, domain.u_max],
            w_features: vec![domain.w_min, domain.w_max],
        }
    }

    /// Planar surface through four corners (see [`PlanarPatch`] for the layout).
    #[must_use]
    pub fn planar(a: Point3, b: Point3, c: Point3, d: Point3) -> Self {
        Self::new(SurfaceShape::Planar(PlanarPatch::new(a, b, c, d)))
    }

    /// Replaces the split feature lines. Domain ends are always kept.
    #[must_use]
    pub fn with_features(mut self, u_features: Vec<f64>, w_features: Vec<f64>) -> Self {
        let domain = self.domain();
        self.u_features = normalize_features(u_features, domain.u_min, domain.u_max);
        self.w_features = normalize_features(w_features, domain.w_min, domain.w_max);
        self
    }

    #[must_use]
    pub fn shape(&self) -> &SurfaceShape {
        &self.shape
    }

    #[must_use]
    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    pub fn set_role(&mut self, role: SurfaceRole) {
        self.role = role;
    }

    /// Returns the normal-sense flag.
    #[must_use]
    pub fn flip_normal(&self) -> bool {
        self.flip_normal
    }

    pub fn set_flip_normal(&mut self, flip: bool) {
        self.flip_normal = flip;
    }

    /// Toggles the normal-sense flag.
    pub fn flip(&mut self) {
        self.flip_normal = !self.flip_normal;
    }

    #[must_use]
    pub fn domain(&self) -> SurfaceDomain {
        self.shape.as_surface().domain()
    }

    #[must_use]
    pub fn u_max(&self) -> f64 {
        self.domain().u_max
    }

    #[must_use]
    pub fn w_max(&self) -> f64 {
        self.domain().w_max
    }

    #[must_use]
    pub fn u_features(&self) -> &[f64] {
        &self.u_features
    }

    #[must_use]
    pub fn w_features(&self) -> &[f64] {
        &self.w_features
    }

    /// Point at raw parameters.
    #[must_use]
    pub fn point(&self, u: f64, w: f64) -> Point3 {
        self.shape.as_surface().evaluate(u, w)
    }

    /// Point at parameters normalized to `[0, 1]`.
    #[must_use]
    pub fn point01(&self, u: f64, w: f64) -> Point3 {
        let d = self.domain();
        self.point(
            d.u_min + u * (d.u_max - d.u_min),
            d.w_min + w * (d.w_max - d.w_min),
        )
    }

    /// Unit normal honoring the normal-sense flag.
    #[must_use]
    pub fn normal(&self, u: f64, w: f64) -> Vector3 {
        let n = self.shape.as_surface().normal(u, w);
        if self.flip_normal {
            -n
        } else {
            n
        }
    }

    /// Applies a transform to the geometry. The normal-sense flag is left alone.
    pub fn transform(&mut self, matrix: &Matrix4) {
        match &mut self.shape {
            SurfaceShape::Grid(g) => g.transform(matrix),
            SurfaceShape::Planar(p) => p.transform(matrix),
            SurfaceShape::Revolved(r) => r.transform(matrix),
        }
    }

    /// Returns a transformed copy.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix4) -> Self {
        let mut copy = self.clone();
        copy.transform(matrix);
        copy
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        match &self.shape {
            SurfaceShape::Grid(g) => g.bounding_box(),
            SurfaceShape::Planar(p) => p.bounding_box(),
            SurfaceShape::Revolved(r) => r.bounding_box(),
        }
    }

    #[must_use]
    pub fn is_closed_u(&self) -> bool {
        match &self.shape {
            SurfaceShape::Grid(g) => g.is_closed_u(),
            SurfaceShape::Planar(_) | SurfaceShape::Revolved(_) => false,
        }
    }

    #[must_use]
    pub fn is_closed_w(&self) -> bool {
        match &self.shape {
            SurfaceShape::Grid(g) => g.is_closed_w(),
            SurfaceShape::Planar(_) => false,
            SurfaceShape::Revolved(_) => true,
        }
    }

    /// Constant-U cross-section at normalized `u01`, sampled along `w`.
    #[must_use]
    pub fn u_curve01(&self, u01: f64) -> Polyline {
        let d = self.domain();
        let u = d.u_min + u01 * (d.u_max - d.u_min);
        let ws: Vec<f64> = match &self.shape {
            SurfaceShape::Grid(g) => g.w_params().to_vec(),
            SurfaceShape::Planar(_) => vec![d.w_min, d.w_max],
            SurfaceShape::Revolved(_) => (0..=32)
                .map(|j| d.w_min + f64::from(j) / 32.0 * (d.w_max - d.w_min))
                .collect(),
        };
        Polyline::new(ws.into_iter().map(|w| self.point(u, w)).collect())
    }

    /// Splits the domain along the feature lines, skipping suppressed ones.
    ///
    /// Patches are ordered with `w` varying fastest.
    #[must_use]
    pub fn split_patches(&self, u_suppress: &[f64], w_suppress: &[f64]) -> Vec<ParamPatch> {
        let d = self.domain();
        let us = active_features(&self.u_features, u_suppress, d.u_min, d.u_max);
        let ws = active_features(&self.w_features, w_suppress, d.w_min, d.w_max);
        let mut patches = Vec::with_capacity((us.len() - 1) * (ws.len() - 1));
        for u in us.windows(2) {
            for w in ws.windows(2) {
                patches.push(ParamPatch {
                    u_min: u[0],
                    u_max: u[1],
                    w_min: w[0],
                    w_max: w[1],
                });
            }
        }
        patches
    }

    /// Points sampled over a patch on a 5x5 lattice.
    #[must_use]
    pub fn patch_points(&self, patch: &ParamPatch) -> Vec<Point3> {
        let mut pts = Vec::with_capacity(25);
        for i in 0..5 {
            for j in 0..5 {
                let fu = f64::from(i) / 4.0;
                let fw = f64::from(j) / 4.0;
                pts.push(self.point(
                    patch.u_min + fu * (patch.u_max - patch.u_min),
                    patch.w_min + fw * (patch.w_max - patch.w_min),
                ));
            }
        }
        pts
    }
}

fn normalize_features(mut features: Vec<f64>, min: f64, max: f64) -> Vec<f64> {
    features.retain(|f| *f >= min - TOLERANCE && *f <= max + TOLERANCE);
    features.push(min);
    features.push(max);
    features.sort_by(f64::total_cmp);
    features.dedup_by(|a, b| (*a - *b).abs() <= TOLERANCE);
    features
}

fn active_features(features: &[f64], suppress: &[f64], min: f64, max: f64) -> Vec<f64> {
    let kept = features
        .iter()
        .copied()
        .filter(|f| !suppress.iter().any(|s| (s - f).abs() <= TOLERANCE))
        .collect();
    normalize_features(kept, min, max)
}

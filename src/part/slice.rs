use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::geometry::{ConformalSpine, FeaSurface};
use crate::math::{
    rotation_about_point, safe_div_cos, safe_div_sin, BoundingBox, Point3, Vector3, ANGLE_EPSILON, TOLERANCE,
};

use super::{CenterLocation, ParentView};

/// Rotation limit of a slice about any of its axes, in degrees.
const MAX_ROTATION: f64 = 90.0;

/// Oversize added to the spine cut beyond the cross-section extent.
const SPINE_MARGIN: f64 = 1e-4;

/// Reference plane a slice is cut parallel to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlicePlane {
    XyBody,
    #[default]
    YzBody,
    XzBody,
    XyAbs,
    YzAbs,
    XzAbs,
    /// Normal to the arc-length spine of the parent surface.
    SpineNormal,
}

impl SlicePlane {
    /// Returns `true` if the plane is laid out in the component body frame.
    #[must_use]
    pub fn is_body(self) -> bool {
        matches!(self, Self::XyBody | Self::YzBody | Self::XzBody)
    }
}

/// The only axis a slice may rotate about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationAxis {
    #[default]
    X,
    Y,
    Z,
}

/// Planar cut through the parent surface, parallel to a reference plane and
/// optionally rotated about one of its axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slice {
    pub plane: SlicePlane,
    pub rotation_axis: RotationAxis,
    /// Degrees.
    pub x_rot: f64,
    pub y_rot: f64,
    pub z_rot: f64,
}

impl Slice {
    /// Effective rotations in degrees: only the selected axis survives and it
    /// is limited to ±90°.
    #[must_use]
    pub fn rotations(&self) -> Vector3 {
        let limit = |a: f64| a.clamp(-MAX_ROTATION, MAX_ROTATION);
        match self.rotation_axis {
            RotationAxis::X => Vector3::new(limit(self.x_rot), 0.0, 0.0),
            RotationAxis::Y => Vector3::new(0.0, limit(self.y_rot), 0.0),
            RotationAxis::Z => Vector3::new(0.0, 0.0, limit(self.z_rot)),
        }
    }

    pub(crate) fn surface(&self, location: &mut CenterLocation, view: &ParentView<'_>) -> FeaSurface {
        self.cut(location, view).surface(view)
    }

    fn reference_box(&self, view: &ParentView<'_>) -> BoundingBox {
        if self.plane.is_body() {
            view.body_surface.bounding_box()
        } else {
            view.surface.bounding_box()
        }
    }

    /// Length the center location is measured along.
    pub(crate) fn extent(&self, view: &ParentView<'_>) -> f64 {
        let ext = self.reference_box(view).extents();
        match self.plane {
            SlicePlane::XyBody | SlicePlane::XyAbs => ext.z,
            SlicePlane::YzBody | SlicePlane::YzAbs => ext.x,
            SlicePlane::XzBody | SlicePlane::XzAbs => ext.y,
            SlicePlane::SpineNormal => ConformalSpine::build(view.surface).length(),
        }
    }

    /// Places the cut center along the reference axis and syncs `location`.
    pub(crate) fn cut(&self, location: &mut CenterLocation, view: &ParentView<'_>) -> SliceCut {
        let rotations = self.rotations();
        let bbox = self.reference_box(view);
        let (min, mid, ext) = (bbox.min, bbox.center(), bbox.extents());

        let center = match self.plane {
            SlicePlane::XyBody | SlicePlane::XyAbs => {
                let rel = location.sync(ext.z);
                Point3::new(mid.x, mid.y, min.z + ext.z * rel)
            }
            SlicePlane::YzBody | SlicePlane::YzAbs => {
                let rel = location.sync(ext.x);
                Point3::new(min.x + ext.x * rel, mid.y, mid.z)
            }
            SlicePlane::XzBody | SlicePlane::XzAbs => {
                let rel = location.sync(ext.y);
                Point3::new(mid.x, min.y + ext.y * rel, mid.z)
            }
            SlicePlane::SpineNormal => {
                let spine = ConformalSpine::build(view.surface);
                let length = spine.length();
                let rel = location.sync(length);
                let u_max = view.surface.u_max();
                let per_u = if u_max > TOLERANCE {
                    spine.u_at_length(rel * length) / u_max
                } else {
                    0.0
                };
                return SliceCut {
                    plane: self.plane,
                    center: spine.center_at_u(per_u * u_max),
                    frame: CutFrame::Spine { spine, per_u },
                    rotations,
                };
            }
        };

        SliceCut {
            plane: self.plane,
            center,
            frame: CutFrame::Box(bbox),
            rotations,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum CutFrame {
    /// Axis-aligned cut sized to cover a bounding box.
    Box(BoundingBox),
    /// Cut normal to the spine at normalized station `per_u`.
    Spine { spine: ConformalSpine, per_u: f64 },
}

/// A positioned cut plane ready to be built into a surface.
#[derive(Debug, Clone)]
pub(crate) struct SliceCut {
    pub plane: SlicePlane,
    pub center: Point3,
    pub frame: CutFrame,
    /// Rotations about the cut axes, degrees.
    pub rotations: Vector3,
}

impl SliceCut {
    /// Cut through `center` covering `bbox` (body frame), rotated about the
    /// body `z` axis.
    pub(crate) fn trim(plane: SlicePlane, center: Point3, bbox: BoundingBox, z_rot: f64) -> Self {
        Self {
            plane,
            center,
            frame: CutFrame::Box(bbox),
            rotations: Vector3::new(0.0, 0.0, z_rot.clamp(-MAX_ROTATION, MAX_ROTATION)),
        }
    }

    pub(crate) fn surface(&self, view: &ParentView<'_>) -> FeaSurface {
        let c = self.center;
        let ([a, b, cc, d], axes) = match &self.frame {
            CutFrame::Box(bbox) => (
                box_corners(self.plane, c, bbox, &self.rotations),
                [Vector3::x(), Vector3::y(), Vector3::z()],
            ),
            CutFrame::Spine { spine, per_u } => spine_corners(c, spine, *per_u, view.surface),
        };

        let r = self.rotations.map(f64::to_radians);
        let placement = rotation_about_point(&c, &axes[2], r.z)
            * rotation_about_point(&c, &axes[1], r.y)
            * rotation_about_point(&c, &axes[0], r.x);

        let mut surface = FeaSurface::planar(a, b, cc, d);
        surface.transform(&placement);
        if self.plane.is_body() {
            surface.transform(&view.model);
        }
        surface
    }
}

/// Growth of a half extent spanning `along` once the cut tilts by `angle`
/// toward an axis spanning `across`.
fn grow(angle: f64, across: f64, along: f64) -> f64 {
    let tilted = if angle.abs() > (across / along).atan() {
        safe_div_sin(across, angle)
    } else {
        None
    };
    tilted
        .or_else(|| safe_div_cos(along, angle))
        .map_or(along.abs(), f64::abs)
}

fn box_corners(plane: SlicePlane, c: Point3, bbox: &BoundingBox, rotations: &Vector3) -> [Point3; 4] {
    let d = bbox.extents();
    let o = (c - bbox.center()) * 2.0;
    let e = bbox.expansion();
    let (mut xp, mut xm, mut yp, mut ym, mut zp, mut zm) = (e, e, e, e, e, e);
    let r = rotations.map(f64::to_radians);
    let v = Vector3::new;

    match plane {
        SlicePlane::YzBody | SlicePlane::YzAbs => {
            if r.y > 0.0 {
                zp += grow(r.y, d.x + o.x, d.z - o.z);
                zm += grow(r.y, d.x - o.x, d.z + o.z);
            } else {
                zp += grow(r.y, d.x - o.x, d.z - o.z);
                zm += grow(r.y, d.x + o.x, d.z + o.z);
            }
            if r.z > 0.0 {
                ym += grow(r.z, d.x + o.x, d.y - o.y);
                yp += grow(r.z, d.x - o.x, d.y + o.y);
            } else {
                yp += grow(r.z, d.x + o.x, d.y + o.y);
                ym += grow(r.z, d.x - o.x, d.y - o.y);
            }
            [
                c + v(0.0, -0.5 * ym, -0.5 * zm),
                c + v(0.0, 0.5 * yp, -0.5 * zm),
                c + v(0.0, -0.5 * ym, 0.5 * zp),
                c + v(0.0, 0.5 * yp, 0.5 * zp),
            ]
        }
        SlicePlane::XyBody | SlicePlane::XyAbs => {
            if r.y > 0.0 {
                xm += grow(r.y, d.z + o.z, d.x - o.x);
                xp += grow(r.y, d.z - o.z, d.x + o.x);
            } else {
                xp += grow(r.y, d.z + o.z, d.x + o.x);
                xm += grow(r.y, d.z - o.z, d.x - o.x);
            }
            if r.x > 0.0 {
                yp += grow(r.x, d.z + o.z, d.y - o.y);
                ym += grow(r.x, d.z - o.z, d.y + o.y);
            } else {
                yp += grow(r.x, d.z - o.z, d.y - o.y);
                ym += grow(r.x, d.z + o.z, d.y + o.y);
            }
            [
                c + v(-0.5 * xm, -0.5 * ym, 0.0),
                c + v(-0.5 * xm, 0.5 * yp, 0.0),
                c + v(0.5 * xp, -0.5 * ym, 0.0),
                c + v(0.5 * xp, 0.5 * yp, 0.0),
            ]
        }
        SlicePlane::XzBody | SlicePlane::XzAbs | SlicePlane::SpineNormal => {
            if r.z > 0.0 {
                xp += grow(r.z, d.y + o.y, d.x - o.x);
                xm += grow(r.z, d.y - o.y, d.x + o.x);
            } else {
                xp += grow(r.z, d.y - o.y, d.x - o.x);
                xm += grow(r.z, d.y + o.y, d.x + o.x);
            }
            if r.x > 0.0 {
                zp += grow(r.x, d.y + o.y, d.z - o.z);
                zm += grow(r.x, d.y - o.y, d.z + o.z);
            } else {
                zp += grow(r.x, d.y - o.y, d.z - o.z);
                zm += grow(r.x, d.y + o.y, d.z + o.z);
            }
            [
                c + v(-0.5 * xm, 0.0, -0.5 * zm),
                c + v(0.5 * xp, 0.0, -0.5 * zm),
                c + v(-0.5 * xm, 0.0, 0.5 * zp),
                c + v(0.5 * xp, 0.0, 0.5 * zp),
            ]
        }
    }
}

fn perpendicular_to(v: &Vector3) -> Vector3 {
    v.cross(&Vector3::z())
        .try_normalize(TOLERANCE)
        .or_else(|| v.cross(&Vector3::y()).try_normalize(TOLERANCE))
        .unwrap_or_else(Vector3::x)
}

/// Square cut normal to the spine, turned 45° in its own plane.
fn spine_corners(c: Point3, spine: &ConformalSpine, per_u: f64, surface: &FeaSurface) -> ([Point3; 4], [Vector3; 3]) {
    let u_max = surface.u_max();
    let step = 2.0 * ANGLE_EPSILON;
    let u = per_u * u_max;
    let ahead = if per_u < 1.0 - step {
        spine.center_at_u(u + step) - c
    } else {
        c - spine.center_at_u(u - step)
    };
    let x_axis = ahead.try_normalize(0.0).unwrap_or_else(Vector3::x);

    let radial = surface.point01(per_u, 0.0) - c;
    let z_axis = (radial - x_axis * radial.dot(&x_axis))
        .try_normalize(TOLERANCE)
        .unwrap_or_else(|| perpendicular_to(&x_axis));
    let y_axis = x_axis.cross(&z_axis);

    let size = surface.u_curve01(per_u).bounding_box().largest_dimension() + SPINE_MARGIN;
    let (s, co) = FRAC_PI_4.sin_cos();
    let y_prime = (y_axis * co + z_axis * s) * size;
    let z_prime = (-y_axis * s + z_axis * co) * size;

    ([c + y_prime, c - z_prime, c + z_prime, c - y_prime], [x_axis, y_axis, z_axis])
}

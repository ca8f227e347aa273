use crate::geometry::FeaSurface;
use crate::math::{point_line_distance, BoundingBox, Point3, Vector3, ANGLE_EPSILON};

/// Parametric offset from the trailing edge used to sample the local
/// thickness direction.
const TRAILING_EDGE_OFFSET: f64 = 0.004;

/// Unit vector, or zero when `v` has no length.
pub(crate) fn unit(v: Vector3) -> Vector3 {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

/// Inclusive section range, or `None` for the whole wing.
pub(crate) fn section_limit(limit_to_section: bool, start: usize, end: usize) -> Option<(usize, usize)> {
    limit_to_section.then_some((start, end))
}

/// Trailing- and leading-edge points of the chord at normalized `u01`.
///
/// Wing surfaces start at the trailing edge (`w` minimum) and reach the
/// leading edge halfway through `w`.
pub(crate) fn chord_points(surface: &FeaSurface, u01: f64) -> (Point3, Point3) {
    (surface.point01(u01, 0.0), surface.point01(u01, 0.5))
}

/// Unit direction from the lower to the upper surface near the trailing edge.
pub(crate) fn thickness_axis(surface: &FeaSurface, u01: f64) -> Vector3 {
    let d = surface.domain();
    let u = d.u_min + u01 * (d.u_max - d.u_min);
    let upper = surface.point(u, d.w_min + 2.0 * TRAILING_EDGE_OFFSET);
    let lower = surface.point(u, d.w_max - 2.0 * TRAILING_EDGE_OFFSET);
    unit(upper - lower)
}

/// Box around the section cross-sections at every integer station in
/// `[u_min, u_max]`.
pub(crate) fn section_bbox(surface: &FeaSurface, u_min: f64, u_max: f64) -> BoundingBox {
    let full = surface.u_max();
    let mut bbox = BoundingBox::empty();
    if full <= 0.0 {
        return bbox;
    }
    let mut u = u_min;
    while u <= u_max + ANGLE_EPSILON {
        bbox.merge(&surface.u_curve01(u / full).bounding_box());
        u += 1.0;
    }
    bbox
}

/// Leading- and trailing-edge points at the inboard and outboard ends of a
/// span of wing sections.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SectionCorners {
    pub min_te: Point3,
    pub min_le: Point3,
    pub max_te: Point3,
    pub max_le: Point3,
}

impl SectionCorners {
    pub(crate) fn new(surface: &FeaSurface, u_min: f64, u_max: f64) -> Self {
        let d = surface.domain();
        let w_le = 0.5 * (d.w_min + d.w_max);
        Self {
            min_te: surface.point(u_min, d.w_min),
            min_le: surface.point(u_min, w_le),
            max_te: surface.point(u_max, d.w_min),
            max_le: surface.point(u_max, w_le),
        }
    }
}

/// Edge the end of a rotated rib or spar runs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeHit {
    /// Inboard or outboard section boundary.
    Section,
    /// Leading or trailing edge.
    Wing,
}

/// Classifies an end against its threshold angle. `section_below` says
/// whether rotations under the threshold reach the section boundary. A
/// rotation exactly on the threshold meets the section boundary.
pub(crate) fn edge_hit(rotation: f64, threshold: f64, section_below: bool) -> EdgeHit {
    let section = if section_below {
        rotation <= threshold
    } else {
        rotation >= threshold
    };
    if section {
        EdgeHit::Section
    } else {
        EdgeHit::Wing
    }
}

/// Length of a ray from `center` to the line through `a` and `b`, given
/// the sine or cosine of the ray's angle to that line's normal.
///
/// `None` when the line or the divisor is degenerate.
pub(crate) fn reach(center: &Point3, a: &Point3, b: &Point3, divisor: f64) -> Option<f64> {
    let dist = point_line_distance(center, a, b)?;
    if divisor.abs() <= ANGLE_EPSILON {
        None
    } else {
        Some((dist / divisor).abs())
    }
}

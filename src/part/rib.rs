use std::f64::consts::{FRAC_PI_2, PI};

use tracing::warn;

use crate::geometry::FeaSurface;
use crate::math::{
    affine_inverse, rodrigues_rotate, safe_div_sin, signed_angle, transform_direction, Point3, Vector3, ANGLE_EPSILON,
    TOLERANCE,
};

use super::slice::{SliceCut, SlicePlane};
use super::wing::{
    chord_points, edge_hit, reach, section_bbox, section_limit, thickness_axis, unit, EdgeHit, SectionCorners,
};
use super::{CenterLocation, ParentView, PartId};

/// Limit of the user rotation, degrees.
const MAX_THETA: f64 = 90.0;

/// Edge a rib is squared against before its own rotation is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PerpendicularEdge {
    #[default]
    None,
    LeadingEdge,
    TrailingEdge,
    /// Mid-span line of another part's primary surface.
    Part(PartId),
}

impl PerpendicularEdge {
    #[must_use]
    pub fn part(self) -> Option<PartId> {
        match self {
            Self::Part(id) => Some(id),
            _ => None,
        }
    }
}

/// Chordwise wing member between the leading and trailing edges.
///
/// The rib is placed along the span (per section when sections have unequal
/// spans), squared against its reference edge, rotated by `theta` about the
/// wing normal and trimmed where it meets the wing edges or the inboard and
/// outboard section boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rib {
    /// Degrees about the wing normal, on top of the edge alignment.
    pub theta: f64,
    pub perpendicular_edge: PerpendicularEdge,
    pub limit_to_section: bool,
    pub start_section: usize,
    pub end_section: usize,
    /// Use an oversized cut over the section box instead of trimming.
    pub bbox_trim: bool,
}

impl Rib {
    /// Builds the primary rib surface in the absolute frame.
    ///
    /// `perpendicular` is the primary surface of the referenced part when
    /// the rib is squared against one. Returns `None` if the parent is not
    /// a wing.
    pub(crate) fn surface(
        &self,
        location: &mut CenterLocation,
        view: &ParentView<'_>,
        perpendicular: Option<&FeaSurface>,
    ) -> Option<FeaSurface> {
        let Some(layout) = view.component.wing() else {
            warn!(component = view.component.name(), "rib parent has no wing layout");
            return None;
        };
        let wing = &view.body_surface;
        let u_max = wing.u_max();
        if u_max <= TOLERANCE {
            return None;
        }
        let limit = section_limit(self.limit_to_section, self.start_section, self.end_section);
        let (u_lo, u_hi) = layout.u_bounds(limit, u_max);
        let spans = layout.spans(limit);
        location.sync(spans.iter().sum());
        let per_u = (u_lo + span_position(spans, location.abs)) / u_max;

        let (te, le) = chord_points(wing, per_u);
        let center = nalgebra::center(&te, &le);
        let corners = SectionCorners::new(wing, u_lo, u_hi);
        let te_vec = unit(corners.max_te - corners.min_te);
        let le_vec = unit(corners.max_le - corners.min_le);
        let inner_vec = corners.min_le - corners.min_te;
        let normal = if inner_vec.norm() >= ANGLE_EPSILON {
            unit(le_vec.cross(&unit(inner_vec)))
        } else {
            unit(unit(corners.max_le - corners.max_te).cross(&le_vec))
        };

        let rotation = self.alignment(view, per_u, &te, &le, &normal, perpendicular)
            + self.theta.clamp(-MAX_THETA, MAX_THETA).to_radians();

        let bbox = wing.bounding_box();
        if self.bbox_trim {
            let trim_box = if limit.is_some() {
                section_bbox(wing, u_lo, u_hi)
            } else {
                bbox
            };
            let cut = SliceCut::trim(SlicePlane::XzBody, center, trim_box, rotation.to_degrees());
            return Some(cut.surface(view));
        }

        let expan = bbox.expansion();
        let half = 0.5 * (te - le).norm() + expan;
        let to_te = unit(te - center);
        let to_le = unit(center - le);
        let from_center = |p: &Point3| unit(p - center);

        let inner_le = -PI + signed_angle(&from_center(&corners.min_le), &to_le, &normal);
        let inner_te = signed_angle(&from_center(&corners.min_te), &to_te, &normal);
        let outer_le = PI - signed_angle(&to_le, &from_center(&corners.max_le), &normal);
        let outer_te = signed_angle(&from_center(&corners.max_te), &to_te, &normal);
        let sweep_te = -signed_angle(&te_vec, &to_te, &normal);
        let sweep_le = -signed_angle(&le_vec, &to_le, &normal);

        let along_edge = |sweep: f64| safe_div_sin(half * sweep.sin(), PI - (rotation + sweep)).map(f64::abs);
        let inboard = || reach(&center, &corners.min_te, &corners.min_le, rotation.sin());
        let outboard = || reach(&center, &corners.max_te, &corners.max_le, rotation.sin());
        let pick = |hit: EdgeHit, section: &dyn Fn() -> Option<f64>, sweep: f64| match hit {
            EdgeHit::Section => section(),
            EdgeHit::Wing => along_edge(sweep),
        };

        let (te_len, le_len) = if rotation <= 0.0 {
            (
                pick(edge_hit(rotation, outer_te, true), &outboard, sweep_te),
                pick(edge_hit(rotation, inner_le, true), &inboard, sweep_le),
            )
        } else {
            (
                pick(edge_hit(rotation, inner_te, false), &inboard, sweep_te),
                pick(edge_hit(rotation, outer_le, false), &outboard, sweep_le),
            )
        };
        let te_len = te_len.unwrap_or_else(|| {
            warn!(rotation, "degenerate rib trim at trailing edge, using chord half length");
            half
        });
        let le_len = le_len.unwrap_or_else(|| {
            warn!(rotation, "degenerate rib trim at leading edge, using chord half length");
            half
        });

        let te_end = center + unit(rodrigues_rotate(&to_te, &normal, rotation)) * te_len;
        let le_end = center - unit(rodrigues_rotate(&to_le, &normal, rotation)) * le_len;
        let up = thickness_axis(wing, per_u) * (0.5 * bbox.smallest_dimension() + expan);

        let mut surface = FeaSurface::planar(te_end + up, te_end - up, le_end + up, le_end - up);
        surface.transform(&view.model);
        Some(surface)
    }

    /// Rotation that squares the rib to its reference edge.
    fn alignment(
        &self,
        view: &ParentView<'_>,
        per_u: f64,
        te: &Point3,
        le: &Point3,
        normal: &Vector3,
        perpendicular: Option<&FeaSurface>,
    ) -> f64 {
        let wing = &view.body_surface;
        let step = 2.0 * ANGLE_EPSILON;
        let along = |w01: f64| unit(wing.point01(per_u + step, w01) - wing.point01(per_u - step, w01));
        let edge = match self.perpendicular_edge {
            PerpendicularEdge::None => return 0.0,
            PerpendicularEdge::TrailingEdge => along(0.0),
            PerpendicularEdge::LeadingEdge => along(0.5),
            PerpendicularEdge::Part(_) => {
                let Some(s) = perpendicular else {
                    warn!("perpendicular edge part not found, rib left unaligned");
                    return 0.0;
                };
                let dir = s.point01(0.5, 1.0) - s.point01(0.5, 0.0);
                unit(transform_direction(&affine_inverse(&view.model), &dir))
            }
        };
        FRAC_PI_2 - signed_angle(&unit(te - le), &edge, normal)
    }
}

/// Section index plus the fraction through that section at spanwise
/// distance `abs`.
fn span_position(spans: &[f64], abs: f64) -> f64 {
    let mut start = 0.0;
    let mut position = 0.0;
    for (k, &span) in spans.iter().enumerate() {
        let end = start + span;
        if abs >= start && abs <= end {
            let frac = if span > TOLERANCE { (abs - start) / span } else { 0.0 };
            #[allow(clippy::cast_precision_loss)]
            {
                position = k as f64 + frac;
            }
        }
        start = end;
    }
    position
}

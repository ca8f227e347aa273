use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::FeaSurface;
use crate::math::{rodrigues_rotate, signed_angle, Point3, ANGLE_EPSILON, TOLERANCE};

use super::slice::{SliceCut, SlicePlane};
use super::wing::{reach, section_limit, thickness_axis, unit, edge_hit, EdgeHit, SectionCorners};
use super::{CenterLocation, ParentView};

/// Limit of the spar sweep rotation, degrees.
const MAX_THETA: f64 = 90.0;

/// Length each spar end starts from before trimming.
const MIN_REACH: f64 = 1e-6;

/// Spanwise wing member at a fixed chord fraction.
///
/// The spar runs from the inboard to the outboard end of its sections at
/// `location` along the chord, is rotated by `theta` about the wing normal
/// and trimmed against the wing edges or section boundaries it meets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spar {
    /// Degrees about the wing normal.
    pub theta: f64,
    pub limit_to_section: bool,
    pub start_section: usize,
    pub end_section: usize,
    pub bbox_trim: bool,
}

impl Spar {
    /// Builds the primary spar surface in the absolute frame, or `None` if
    /// the parent is not a wing.
    pub(crate) fn surface(&self, location: &mut CenterLocation, view: &ParentView<'_>) -> Option<FeaSurface> {
        let Some(layout) = view.component.wing() else {
            warn!(component = view.component.name(), "spar parent has no wing layout");
            return None;
        };
        let wing = &view.body_surface;
        let u_max = wing.u_max();
        if u_max <= TOLERANCE {
            return None;
        }
        let limit = section_limit(self.limit_to_section, self.start_section, self.end_section);
        let (u_lo, u_hi) = layout.u_bounds(limit, u_max);
        let u_mid = 0.5 * (u_lo + u_hi) / u_max;
        let chord = (view.surface.point01(u_mid, 0.5) - view.surface.point01(u_mid, 0.0)).norm();
        let rel = location.sync(chord);

        let corners = SectionCorners::new(wing, u_lo, u_hi);
        let inside = corners.min_le + (corners.min_te - corners.min_le) * rel;
        let outside = corners.max_le + (corners.max_te - corners.max_le) * rel;
        let center = nalgebra::center(&inside, &outside);
        let half = 0.5 * (outside - inside).norm();

        let te_vec = unit(corners.max_te - corners.min_te);
        let le_vec = unit(corners.max_le - corners.min_le);
        let inner_vec = unit(corners.min_te - corners.min_le);
        let normal = if (inner_vec.norm() - 1.0).abs() <= ANGLE_EPSILON {
            unit(inner_vec.cross(&le_vec))
        } else {
            unit(unit(corners.max_te - corners.max_le).cross(&le_vec))
        };

        let to_in = unit(inside - center);
        let to_out = unit(outside - center);
        let sweep = FRAC_PI_2 - signed_angle(&inner_vec, &to_out, &normal);
        let theta = self.theta.clamp(-MAX_THETA, MAX_THETA).to_radians();

        let bbox = wing.bounding_box();
        if self.bbox_trim {
            let cut = SliceCut::trim(SlicePlane::YzBody, center, bbox, (theta + sweep).to_degrees());
            return Some(cut.surface(view));
        }

        let from_center = |p: &Point3| unit(p - center);
        let inner_le = -signed_angle(&to_in, &from_center(&corners.min_le), &normal);
        let inner_te = -signed_angle(&to_in, &from_center(&corners.min_te), &normal);
        let outer_le = signed_angle(&from_center(&corners.max_le), &to_out, &normal);
        let outer_te = signed_angle(&from_center(&corners.max_te), &to_out, &normal);
        let beta_te = -signed_angle(&to_out, &te_vec, &normal);
        let beta_le = -PI + signed_angle(&to_in, &le_vec, &normal);

        let inboard = || reach(&center, &corners.min_le, &corners.min_te, (theta + sweep).cos());
        let outboard = || reach(&center, &corners.max_le, &corners.max_te, (theta + sweep).cos());
        let leading = || reach(&center, &corners.min_le, &corners.max_le, (theta + beta_le).sin());
        let trailing = || reach(&center, &corners.min_te, &corners.max_te, (theta - beta_te).sin());
        let pick = |hit: EdgeHit, section: &dyn Fn() -> Option<f64>, edge: &dyn Fn() -> Option<f64>| match hit {
            EdgeHit::Section => section(),
            EdgeHit::Wing => edge(),
        };

        let (in_len, out_len) = if theta >= 0.0 {
            (
                pick(edge_hit(theta, inner_le, true), &inboard, &leading),
                pick(edge_hit(theta, outer_te, true), &outboard, &trailing),
            )
        } else {
            (
                pick(edge_hit(theta, inner_te, false), &inboard, &trailing),
                pick(edge_hit(theta, outer_le, false), &outboard, &leading),
            )
        };
        let in_len = in_len.unwrap_or_else(|| {
            warn!(theta, "degenerate spar trim at inboard end, using half length");
            half
        });
        let out_len = out_len.unwrap_or_else(|| {
            warn!(theta, "degenerate spar trim at outboard end, using half length");
            half
        });

        let in_end = center + rodrigues_rotate(&to_in, &normal, theta) * in_len.max(MIN_REACH);
        let out_end = center + rodrigues_rotate(&to_out, &normal, theta) * out_len.max(MIN_REACH);
        let up = thickness_axis(wing, u_mid) * (0.5 * bbox.smallest_dimension() + bbox.expansion());

        let mut surface = FeaSurface::planar(in_end + up, in_end - up, out_end + up, out_end - up);
        surface.transform(&view.model);
        Some(surface)
    }
}

use serde::{Deserialize, Serialize};

use crate::geometry::{FeaSurface, ParamPatch};
use crate::math::Point3;

use super::PartId;

/// Parametric slack when testing whether a point sits on a patch edge.
const PARAM_TOLERANCE: f64 = 1e-8;

/// Patches whose largest `y` stays below this are dropped in half-mesh mode.
const HALF_MESH_Y: f64 = 1e-6;

/// Where a fixed point lands relative to the split patches of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchContact {
    Interior,
    /// On a constant-U patch edge.
    UBorder,
    /// On a constant-W patch edge.
    WBorder,
    /// On both, i.e. a patch corner.
    Corner,
}

/// Classification of a fixed point against one parent copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixPointCopy {
    /// Indices into the parent's split patches, `w` varying fastest.
    pub split_indices: Vec<usize>,
    /// `None` when no retained patch contains the point.
    pub contact: Option<PatchContact>,
}

impl FixPointCopy {
    #[must_use]
    pub fn border(&self) -> bool {
        self.contact.is_some_and(|c| c != PatchContact::Interior)
    }
}

/// A point pinned to the surface of another part.
///
/// Owns no surface. Its location is a fraction of the parent part's primary
/// `(u, w)` domain and its per-copy classification is filled in by the
/// owning structure once the parent is current.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixPoint {
    pub pos_u: f64,
    pub pos_w: f64,
    pub mass_flag: bool,
    pub mass: f64,
    pub parent: Option<PartId>,
    copies: Vec<FixPointCopy>,
}

impl FixPoint {
    /// Sets the parametric location, clamped onto `[0, 1]`.
    pub fn set_position(&mut self, pos_u: f64, pos_w: f64) {
        self.pos_u = pos_u.clamp(0.0, 1.0);
        self.pos_w = pos_w.clamp(0.0, 1.0);
    }

    /// Per-copy classification from the last update.
    #[must_use]
    pub fn copies(&self) -> &[FixPointCopy] {
        &self.copies
    }

    pub(crate) fn set_copies(&mut self, copies: Vec<FixPointCopy>) {
        self.copies = copies;
    }

    /// Returns `true` if the point sits on a patch edge of any parent copy.
    #[must_use]
    pub fn border(&self) -> bool {
        self.copies.iter().any(FixPointCopy::border)
    }

    /// Lumped mass carried by the point, if it has one.
    #[must_use]
    pub fn point_mass(&self) -> Option<f64> {
        self.mass_flag.then_some(self.mass)
    }

    /// Position of the point on every parent copy.
    #[must_use]
    pub fn points(&self, parent_surfaces: &[FeaSurface]) -> Vec<Point3> {
        parent_surfaces
            .iter()
            .map(|s| s.point01(self.pos_u.clamp(0.0, 1.0), self.pos_w.clamp(0.0, 1.0)))
            .collect()
    }

    /// Classifies the point against the split patches of every parent copy.
    ///
    /// The parametric location is resolved on the primary copy and reused
    /// for the others. With `half_mesh` set, patches lying wholly on the
    /// negative `y` side are ignored.
    #[must_use]
    pub fn classify(
        &self,
        parent_surfaces: &[FeaSurface],
        u_suppress: &[f64],
        w_suppress: &[f64],
        half_mesh: bool,
    ) -> Vec<FixPointCopy> {
        let Some(primary) = parent_surfaces.first() else {
            return Vec::new();
        };
        let d = primary.domain();
        let u = d.u_min + self.pos_u.clamp(0.0, 1.0) * (d.u_max - d.u_min);
        let w = d.w_min + self.pos_w.clamp(0.0, 1.0) * (d.w_max - d.w_min);
        parent_surfaces
            .iter()
            .map(|s| classify_on(s, u, w, u_suppress, w_suppress, half_mesh))
            .collect()
    }
}

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() <= PARAM_TOLERANCE
}

/// `value` plus its image across the seam of a closed direction.
fn wrapped(value: f64, min: f64, max: f64, closed: bool) -> Vec<f64> {
    let mut values = vec![value];
    if closed {
        if near(value, min) {
            values.push(max);
        } else if near(value, max) {
            values.push(min);
        }
    }
    values
}

fn contains(patch: &ParamPatch, u: f64, w: f64) -> bool {
    u >= patch.u_min - PARAM_TOLERANCE
        && u <= patch.u_max + PARAM_TOLERANCE
        && w >= patch.w_min - PARAM_TOLERANCE
        && w <= patch.w_max + PARAM_TOLERANCE
}

fn classify_on(
    surface: &FeaSurface,
    u: f64,
    w: f64,
    u_suppress: &[f64],
    w_suppress: &[f64],
    half_mesh: bool,
) -> FixPointCopy {
    let d = surface.domain();
    let us = wrapped(u, d.u_min, d.u_max, surface.is_closed_u());
    let ws = wrapped(w, d.w_min, d.w_max, surface.is_closed_w());

    let mut split_indices = Vec::new();
    let (mut on_u, mut on_w) = (false, false);
    for (index, patch) in surface.split_patches(u_suppress, w_suppress).iter().enumerate() {
        if half_mesh
            && surface
                .patch_points(patch)
                .iter()
                .all(|p| p.y < HALF_MESH_Y)
        {
            continue;
        }
        for &pu in &us {
            for &pw in &ws {
                if !contains(patch, pu, pw) {
                    continue;
                }
                if !split_indices.contains(&index) {
                    split_indices.push(index);
                }
                on_u |= near(pu, patch.u_min) || near(pu, patch.u_max);
                on_w |= near(pw, patch.w_min) || near(pw, patch.w_max);
            }
        }
    }

    let contact = if split_indices.is_empty() {
        None
    } else {
        Some(match (on_u, on_w) {
            (true, true) => PatchContact::Corner,
            (true, false) => PatchContact::UBorder,
            (false, true) => PatchContact::WBorder,
            (false, false) => PatchContact::Interior,
        })
    };
    split_indices.sort_unstable();
    FixPointCopy {
        split_indices,
        contact,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::component::SymmetryPlane;
    use crate::part::tests::{p, wing_component};

    /// Unit square split once in each direction into four patches.
    fn quartered() -> FeaSurface {
        FeaSurface::planar(
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(1.0, 1.0, 0.0),
        )
        .with_features(vec![0.5], vec![0.5])
    }

    fn at(pos_u: f64, pos_w: f64) -> FixPoint {
        let mut fix = FixPoint::default();
        fix.set_position(pos_u, pos_w);
        fix
    }

    fn classify_one(fix: &FixPoint, surface: &FeaSurface, w_suppress: &[f64]) -> FixPointCopy {
        fix.classify(std::slice::from_ref(surface), &[], w_suppress, false)
            .remove(0)
    }

    #[test]
    fn domain_corner_is_patch_corner() {
        let c = classify_one(&at(0.0, 0.0), &quartered(), &[]);
        assert_eq!(c.contact, Some(PatchContact::Corner));
        assert_eq!(c.split_indices, vec![0]);
        assert!(c.border());
    }

    #[test]
    fn interior_and_border_points() {
        let s = quartered();
        let c = classify_one(&at(0.25, 0.25), &s, &[]);
        assert_eq!(c.contact, Some(PatchContact::Interior));
        assert_eq!(c.split_indices, vec![0]);
        assert!(!c.border());

        let c = classify_one(&at(0.25, 0.5), &s, &[]);
        assert_eq!(c.contact, Some(PatchContact::WBorder));
        assert_eq!(c.split_indices, vec![0, 1]);

        let c = classify_one(&at(0.5, 0.75), &s, &[]);
        assert_eq!(c.contact, Some(PatchContact::UBorder));
        assert_eq!(c.split_indices, vec![1, 3]);

        let c = classify_one(&at(0.5, 0.5), &s, &[]);
        assert_eq!(c.contact, Some(PatchContact::Corner));
        assert_eq!(c.split_indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn suppressed_feature_is_not_a_border() {
        let c = classify_one(&at(0.25, 0.5), &quartered(), &[0.5]);
        assert_eq!(c.contact, Some(PatchContact::Interior));
        assert_eq!(c.split_indices, vec![0]);
    }

    #[test]
    fn closed_direction_wraps_across_seam() {
        let wing = wing_component();
        let c = classify_one(&at(0.25, 0.0), &wing.surfaces()[0], &[]);
        assert_eq!(c.contact, Some(PatchContact::WBorder));
        assert_eq!(c.split_indices, vec![0, 1]);
    }

    #[test]
    fn half_mesh_drops_mirrored_copy() {
        let wing = wing_component().with_symmetry(&[SymmetryPlane::XZ]);
        let fix = at(0.25, 0.25);
        let copies = fix.classify(wing.surfaces(), &[], &[], true);
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].contact, Some(PatchContact::Interior));
        assert!(copies[1].split_indices.is_empty());
        assert_eq!(copies[1].contact, None);

        let copies = fix.classify(wing.surfaces(), &[], &[], false);
        assert_eq!(copies[1].contact, Some(PatchContact::Interior));
    }

    #[test]
    fn points_follow_every_copy() {
        let wing = wing_component().with_symmetry(&[SymmetryPlane::XZ]);
        let pts = at(0.5, 0.5).points(wing.surfaces());
        assert_eq!(pts.len(), 2);
        assert_relative_eq!(pts[0], p(0.0, 2.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(pts[1], p(0.0, -2.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn new_point_sits_at_domain_origin() {
        let fix = FixPoint::default();
        assert_eq!((fix.pos_u, fix.pos_w), (0.0, 0.0));
        let c = classify_one(&fix, &quartered(), &[]);
        assert_eq!(c.contact, Some(PatchContact::Corner));
    }

    #[test]
    fn mass_only_when_flagged() {
        let mut fix = FixPoint {
            mass: 3.0,
            ..FixPoint::default()
        };
        assert_eq!(fix.point_mass(), None);
        fix.mass_flag = true;
        assert_eq!(fix.point_mass(), Some(3.0));
        fix.set_position(2.0, -1.0);
        assert_eq!((fix.pos_u, fix.pos_w), (1.0, 0.0));
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{FeaSurface, SurfaceRole};
use crate::math::TOLERANCE;

use super::rib::Rib;
use super::slice::Slice;
use super::wing::section_limit;
use super::{propagate_copies, CenterLocation, LocationMode, ParentView, PartKind};

/// Upper bound on the members one array generates.
pub const MAX_ARRAY_MEMBERS: usize = 100;

/// Slack on `range / spacing` so an end that falls exactly on a member
/// survives rounding.
const COUNT_SLACK: f64 = 1e-9;

/// Start, end and pitch of an array, kept both as fractions and as lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArraySpacing {
    /// Members advance from start toward end when set, the other way otherwise.
    pub positive_direction: bool,
    pub rel_start: f64,
    pub abs_start: f64,
    pub rel_end: f64,
    pub abs_end: f64,
    pub rel_spacing: f64,
    pub abs_spacing: f64,
}

impl Default for ArraySpacing {
    fn default() -> Self {
        Self {
            positive_direction: true,
            rel_start: 0.0,
            abs_start: 0.0,
            rel_end: 1.0,
            abs_end: 1.0,
            rel_spacing: 0.2,
            abs_spacing: 0.2,
        }
    }
}

/// Orders, clamps and spaces one start/end pair; returns the member count.
fn resolve_range(start: &mut f64, end: &mut f64, spacing: &mut f64, positive: bool, upper: f64) -> usize {
    *start = start.clamp(0.0, upper);
    *end = end.clamp(0.0, upper);
    if positive == (*start > *end) {
        std::mem::swap(start, end);
    }
    let range = (*end - *start).abs();
    if range <= TOLERANCE {
        return 1;
    }
    #[allow(clippy::cast_precision_loss)]
    let min_spacing = range / (MAX_ARRAY_MEMBERS - 1) as f64;
    let clamped = if spacing.is_finite() {
        spacing.clamp(min_spacing, range)
    } else {
        range
    };
    if (clamped - *spacing).abs() > TOLERANCE || !spacing.is_finite() {
        warn!(spacing = *spacing, clamped, "array spacing out of range");
    }
    *spacing = clamped;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = 1 + (range / clamped + COUNT_SLACK).floor() as usize;
    count.clamp(1, MAX_ARRAY_MEMBERS)
}

impl ArraySpacing {
    /// Sanitizes the driving values for `mode` over `extent`, syncs the
    /// other representation and returns the member count.
    pub fn resolve(&mut self, mode: LocationMode, extent: f64) -> usize {
        let extent = extent.max(0.0);
        let count = match mode {
            LocationMode::Relative => {
                let count = resolve_range(
                    &mut self.rel_start,
                    &mut self.rel_end,
                    &mut self.rel_spacing,
                    self.positive_direction,
                    1.0,
                );
                self.abs_start = self.rel_start * extent;
                self.abs_end = self.rel_end * extent;
                self.abs_spacing = self.rel_spacing * extent;
                count
            }
            LocationMode::Absolute => {
                let count = resolve_range(
                    &mut self.abs_start,
                    &mut self.abs_end,
                    &mut self.abs_spacing,
                    self.positive_direction,
                    extent,
                );
                let rel = |v: f64| if extent > TOLERANCE { v / extent } else { 0.0 };
                self.rel_start = rel(self.abs_start);
                self.rel_end = rel(self.abs_end);
                self.rel_spacing = rel(self.abs_spacing);
                count
            }
        };
        debug!(count, ?mode, "array members resolved");
        count
    }

    /// Center location of member `index`.
    #[must_use]
    pub fn member_location(&self, mode: LocationMode, index: usize) -> CenterLocation {
        let sign = if self.positive_direction { 1.0 } else { -1.0 };
        #[allow(clippy::cast_precision_loss)]
        let step = sign * index as f64;
        match mode {
            LocationMode::Relative => CenterLocation::relative(self.rel_start + step * self.rel_spacing),
            LocationMode::Absolute => CenterLocation::absolute(self.abs_start + step * self.abs_spacing),
        }
    }
}

/// Builds `count` rows of per-copy surfaces, one row per member.
fn member_rows(
    count: usize,
    view: &ParentView<'_>,
    role: SurfaceRole,
    symmetry_indices: &[usize],
    mut primary: impl FnMut(usize) -> Option<FeaSurface>,
) -> Vec<FeaSurface> {
    let copies = symmetry_indices.len().max(1);
    let transforms = view.component.symmetry_transforms();
    let mut surfaces = Vec::with_capacity(count * copies);
    for index in 0..count {
        let Some(first) = primary(index) else {
            return Vec::new();
        };
        let mut row = vec![view.finish(first, role); copies];
        propagate_copies(&mut row, &transforms, view.component.surfaces(), symmetry_indices);
        surfaces.extend(row);
    }
    surfaces
}

/// Evenly spaced ribs sharing one template.
#[derive(Debug, Clone, PartialEq)]
pub struct RibArray {
    pub spacing: ArraySpacing,
    /// Every member is this rib at its own span station.
    pub rib: Rib,
    num_members: usize,
}

impl Default for RibArray {
    fn default() -> Self {
        Self {
            spacing: ArraySpacing {
                rel_start: 0.1,
                abs_start: 0.1,
                rel_end: 0.9,
                abs_end: 0.9,
                rel_spacing: 0.2,
                abs_spacing: 0.1,
                ..ArraySpacing::default()
            },
            rib: Rib::default(),
            num_members: 0,
        }
    }
}

impl RibArray {
    /// Member count from the last update.
    #[must_use]
    pub fn num_members(&self) -> usize {
        self.num_members
    }

    /// Standalone rib for member `index`, as produced by the last update.
    #[must_use]
    pub fn member(&self, mode: LocationMode, index: usize) -> Option<(PartKind, CenterLocation)> {
        (index < self.num_members).then(|| (PartKind::Rib(self.rib), self.spacing.member_location(mode, index)))
    }

    pub(crate) fn surfaces(
        &mut self,
        mode: LocationMode,
        view: &ParentView<'_>,
        role: SurfaceRole,
        symmetry_indices: &[usize],
        perpendicular: Option<&FeaSurface>,
    ) -> Vec<FeaSurface> {
        let Some(layout) = view.component.wing() else {
            warn!(component = view.component.name(), "rib array parent has no wing layout");
            self.num_members = 0;
            return Vec::new();
        };
        let limit = section_limit(self.rib.limit_to_section, self.rib.start_section, self.rib.end_section);
        self.num_members = self.spacing.resolve(mode, layout.total_span(limit));

        let (rib, spacing) = (self.rib, self.spacing);
        let surfaces = member_rows(self.num_members, view, role, symmetry_indices, |index| {
            rib.surface(&mut spacing.member_location(mode, index), view, perpendicular)
        });
        if surfaces.is_empty() {
            self.num_members = 0;
        }
        surfaces
    }
}

/// Evenly spaced slices sharing one template, usually meshed as beams.
#[derive(Debug, Clone, PartialEq)]
pub struct StiffenerArray {
    pub spacing: ArraySpacing,
    /// Every member is this slice at its own station.
    pub slice: Slice,
    num_members: usize,
}

impl Default for StiffenerArray {
    fn default() -> Self {
        Self {
            spacing: ArraySpacing::default(),
            slice: Slice::default(),
            num_members: 0,
        }
    }
}

impl StiffenerArray {
    #[must_use]
    pub fn num_members(&self) -> usize {
        self.num_members
    }

    /// Standalone slice for member `index`, as produced by the last update.
    #[must_use]
    pub fn member(&self, mode: LocationMode, index: usize) -> Option<(PartKind, CenterLocation)> {
        (index < self.num_members).then(|| (PartKind::Slice(self.slice), self.spacing.member_location(mode, index)))
    }

    pub(crate) fn surfaces(
        &mut self,
        mode: LocationMode,
        view: &ParentView<'_>,
        role: SurfaceRole,
        symmetry_indices: &[usize],
    ) -> Vec<FeaSurface> {
        self.num_members = self.spacing.resolve(mode, self.slice.extent(view));
        let (slice, spacing) = (self.slice, self.spacing);
        member_rows(self.num_members, view, role, symmetry_indices, |index| {
            Some(slice.surface(&mut spacing.member_location(mode, index), view))
        })
    }
}

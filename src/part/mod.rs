mod array;
mod bulkhead;
mod fixpoint;
mod rib;
mod skin;
mod slice;
mod spar;
mod wing;

pub use array::{ArraySpacing, RibArray, StiffenerArray, MAX_ARRAY_MEMBERS};
pub use bulkhead::Bulkhead;
pub use fixpoint::{FixPoint, FixPointCopy, PatchContact};
pub use rib::{PerpendicularEdge, Rib};
pub use skin::Skin;
pub use slice::{RotationAxis, Slice, SlicePlane};
pub use spar::Spar;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::component::{ComponentId, ComponentRegistry, ParentComponent};
use crate::context::FeaContext;
use crate::geometry::{FeaSurface, Plane, SurfaceRole};
use crate::math::{affine_inverse, signed_distance_to_plane, Matrix4, Point3, TOLERANCE};
use crate::property::{DEFAULT_BEAM_PROPERTY, DEFAULT_SHELL_PROPERTY};

/// Distance below which a skin feature counts as lying on a cut plane.
const ON_PLANE_TOLERANCE: f64 = 1e-6;

slotmap::new_key_type! {
    /// Handle of a part inside its structure.
    pub struct PartId;
}

/// Variant tag of a structural part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartType {
    Slice,
    Rib,
    Spar,
    FixPoint,
    Skin,
    Bulkhead,
    RibArray,
    StiffenerArray,
}

impl PartType {
    /// Prefix used when naming new parts.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Slice => "Slice",
            Self::Rib => "Rib",
            Self::Spar => "Spar",
            Self::FixPoint => "FixPoint",
            Self::Skin => "Skin",
            Self::Bulkhead => "Bulkhead",
            Self::RibArray => "RibArray",
            Self::StiffenerArray => "StiffenerArray",
        }
    }

    #[must_use]
    pub fn is_array(self) -> bool {
        matches!(self, Self::RibArray | Self::StiffenerArray)
    }
}

/// Element families a part is meshed into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludedElements {
    #[default]
    Shell,
    Beam,
    ShellAndBeam,
}

impl IncludedElements {
    /// Surface role handed to the mesher for a cut built with these elements.
    #[must_use]
    pub fn role(self) -> SurfaceRole {
        match self {
            Self::Shell | Self::ShellAndBeam => SurfaceRole::Structure,
            Self::Beam => SurfaceRole::Stiffener,
        }
    }
}

/// Whether a placement is driven by its fraction or by its length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationMode {
    #[default]
    Relative,
    Absolute,
}

/// A placement along some extent, kept both as a fraction and as a length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterLocation {
    pub mode: LocationMode,
    pub rel: f64,
    pub abs: f64,
}

impl Default for CenterLocation {
    fn default() -> Self {
        Self::relative(0.5)
    }
}

impl CenterLocation {
    #[must_use]
    pub fn relative(rel: f64) -> Self {
        Self {
            mode: LocationMode::Relative,
            rel,
            abs: 0.0,
        }
    }

    #[must_use]
    pub fn absolute(abs: f64) -> Self {
        Self {
            mode: LocationMode::Absolute,
            rel: 0.0,
            abs,
        }
    }

    /// Clamps the driving value onto `[0, extent]`, derives the other one
    /// and returns the relative location.
    pub fn sync(&mut self, extent: f64) -> f64 {
        let extent = extent.max(0.0);
        match self.mode {
            LocationMode::Relative => {
                self.rel = self.rel.clamp(0.0, 1.0);
                self.abs = self.rel * extent;
            }
            LocationMode::Absolute => {
                self.abs = self.abs.clamp(0.0, extent);
                self.rel = if extent > TOLERANCE { self.abs / extent } else { 0.0 };
            }
        }
        self.rel
    }
}

/// Variant payload of a structural part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartKind {
    Slice(Slice),
    Rib(Rib),
    Spar(Spar),
    FixPoint(FixPoint),
    Skin(Skin),
    Bulkhead(Bulkhead),
    RibArray(RibArray),
    StiffenerArray(StiffenerArray),
}

impl PartKind {
    /// Default payload for `part_type`.
    #[must_use]
    pub fn new(part_type: PartType) -> Self {
        match part_type {
            PartType::Slice => Self::Slice(Slice::default()),
            PartType::Rib => Self::Rib(Rib::default()),
            PartType::Spar => Self::Spar(Spar::default()),
            PartType::FixPoint => Self::FixPoint(FixPoint::default()),
            PartType::Skin => Self::Skin(Skin::default()),
            PartType::Bulkhead => Self::Bulkhead(Bulkhead::default()),
            PartType::RibArray => Self::RibArray(RibArray::default()),
            PartType::StiffenerArray => Self::StiffenerArray(StiffenerArray::default()),
        }
    }

    #[must_use]
    pub fn part_type(&self) -> PartType {
        match self {
            Self::Slice(_) => PartType::Slice,
            Self::Rib(_) => PartType::Rib,
            Self::Spar(_) => PartType::Spar,
            Self::FixPoint(_) => PartType::FixPoint,
            Self::Skin(_) => PartType::Skin,
            Self::Bulkhead(_) => PartType::Bulkhead,
            Self::RibArray(_) => PartType::RibArray,
            Self::StiffenerArray(_) => PartType::StiffenerArray,
        }
    }
}

/// Parent geometry as seen by one part during an update.
pub(crate) struct ParentView<'a> {
    pub component: &'a ParentComponent,
    /// Absolute-frame main surface of the primary copy.
    pub surface: &'a FeaSurface,
    /// The same surface in the component body frame.
    pub body_surface: FeaSurface,
    pub model: Matrix4,
}

impl<'a> ParentView<'a> {
    pub(crate) fn new(component: &'a ParentComponent, main_index: usize) -> Option<Self> {
        let surface = component.main_surface(main_index)?;
        let model = *component.model_matrix();
        Some(Self {
            component,
            surface,
            body_surface: surface.transformed(&affine_inverse(&model)),
            model,
        })
    }

    /// Tags a freshly built cut surface and matches its normal sense to the parent.
    pub(crate) fn finish(&self, mut surface: FeaSurface, role: SurfaceRole) -> FeaSurface {
        surface.set_role(role);
        if surface.flip_normal() != self.surface.flip_normal() {
            surface.flip();
        }
        surface
    }
}

/// Fills `row[1..]` from `row[0]` by chaining the component's symmetry
/// transforms, matching each copy's normal sense to the parent copy.
pub(crate) fn propagate_copies(
    row: &mut [FeaSurface],
    transforms: &[Matrix4],
    parents: &[FeaSurface],
    symmetry_indices: &[usize],
) {
    for i in 1..row.len().min(transforms.len()) {
        let mut copy = row[i - 1].transformed(&transforms[i]);
        let parent_flip = symmetry_indices
            .get(i)
            .and_then(|&k| parents.get(k))
            .map(FeaSurface::flip_normal);
        if parent_flip.is_some_and(|flip| flip != copy.flip_normal()) {
            copy.flip();
        }
        row[i] = copy;
    }
}

fn surface_contains(surface: &FeaSurface, points: &[Point3]) -> bool {
    let d = surface.domain();
    let (u, w) = (0.5 * (d.u_min + d.u_max), 0.5 * (d.w_min + d.w_max));
    let Ok(plane) = Plane::from_normal(surface.point(u, w), surface.normal(u, w)) else {
        return false;
    };
    points
        .iter()
        .all(|p| signed_distance_to_plane(p, &plane).abs() < ON_PLANE_TOLERANCE)
}

/// A structural member attached to one main surface of a parent component.
///
/// Holds the fields every variant shares plus the variant payload, and the
/// per-copy surfaces computed by the last [`StructuralPart::update`].
#[derive(Debug, Clone)]
pub struct StructuralPart {
    name: String,
    component: ComponentId,
    main_surface_index: usize,
    pub included_elements: IncludedElements,
    pub draw: bool,
    pub location: CenterLocation,
    pub property_index: i32,
    pub cap_property_index: i32,
    pub kind: PartKind,
    symmetry_indices: Vec<usize>,
    surfaces: Vec<FeaSurface>,
}

impl StructuralPart {
    /// Creates a part with the default shared fields for its variant.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn new(name: impl Into<String>, component: ComponentId, main_surface_index: usize, kind: PartKind) -> Self {
        let (property_index, cap_property_index) = match kind {
            PartKind::FixPoint(_) => (-1, -1),
            _ => (DEFAULT_SHELL_PROPERTY as i32, DEFAULT_BEAM_PROPERTY as i32),
        };
        Self {
            name: name.into(),
            component,
            main_surface_index,
            included_elements: IncludedElements::default(),
            draw: !matches!(kind, PartKind::Skin(_)),
            location: CenterLocation::default(),
            property_index,
            cap_property_index,
            kind,
            symmetry_indices: Vec::new(),
            surfaces: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn part_type(&self) -> PartType {
        self.kind.part_type()
    }

    #[must_use]
    pub fn component(&self) -> ComponentId {
        self.component
    }

    #[must_use]
    pub fn main_surface_index(&self) -> usize {
        self.main_surface_index
    }

    /// Parent surface index of every symmetric copy.
    #[must_use]
    pub fn symmetry_indices(&self) -> &[usize] {
        &self.symmetry_indices
    }

    /// Per-copy surfaces. Arrays store one row of copies per member.
    #[must_use]
    pub fn surfaces(&self) -> &[FeaSurface] {
        &self.surfaces
    }

    /// Part this one reads geometry from, if any.
    #[must_use]
    pub fn reference(&self) -> Option<PartId> {
        match &self.kind {
            PartKind::Rib(rib) => rib.perpendicular_edge.part(),
            PartKind::RibArray(array) => array.rib.perpendicular_edge.part(),
            PartKind::FixPoint(fix) => fix.parent,
            _ => None,
        }
    }

    /// Re-reads the copy layout of the parent. Surfaces beyond the new copy
    /// count are dropped; an unknown component leaves the part without copies.
    pub fn refresh_symmetry_index(&mut self, components: &ComponentRegistry) {
        self.symmetry_indices = components.symmetry_indices(self.component, self.main_surface_index);
        if self.symmetry_indices.is_empty() {
            warn!(part = %self.name, "parent component or main surface not found");
        }
        match self.kind {
            PartKind::FixPoint(_) => self.surfaces.clear(),
            PartKind::RibArray(_) | PartKind::StiffenerArray(_) => {}
            _ => self.surfaces.truncate(self.symmetry_indices.len()),
        }
    }

    /// Recomputes the primary surface and its symmetric copies.
    ///
    /// `perpendicular` is the primary surface of the part a rib is squared
    /// against, when it references one. FixPoint classification needs the
    /// parent part and is driven by the owning structure.
    pub fn update(&mut self, ctx: &FeaContext<'_>, perpendicular: Option<&FeaSurface>) {
        self.refresh_symmetry_index(ctx.components);
        let Some(component) = ctx.components.get(self.component) else {
            self.surfaces.clear();
            return;
        };
        let Some(view) = ParentView::new(component, self.main_surface_index) else {
            self.surfaces.clear();
            return;
        };
        let role = self.included_elements.role();

        let primary = match &mut self.kind {
            PartKind::Slice(slice) => Some(view.finish(slice.surface(&mut self.location, &view), role)),
            PartKind::Rib(rib) => rib
                .surface(&mut self.location, &view, perpendicular)
                .map(|s| view.finish(s, role)),
            PartKind::Spar(spar) => spar.surface(&mut self.location, &view).map(|s| view.finish(s, role)),
            PartKind::Bulkhead(bulkhead) => Some(view.finish(bulkhead.surface(&view), role)),
            PartKind::Skin(skin) => Some(skin.surface(&view)),
            PartKind::FixPoint(_) => None,
            PartKind::RibArray(array) => {
                self.surfaces = array.surfaces(self.location.mode, &view, role, &self.symmetry_indices, perpendicular);
                return;
            }
            PartKind::StiffenerArray(array) => {
                self.surfaces = array.surfaces(self.location.mode, &view, role, &self.symmetry_indices);
                return;
            }
        };

        match primary {
            Some(primary) if !self.symmetry_indices.is_empty() => {
                self.surfaces = vec![primary; self.symmetry_indices.len()];
                self.propagate_symmetry(component);
            }
            _ => {
                if !self.surfaces.is_empty() {
                    debug!(part = %self.name, "no surface for this layout, dropping stale copies");
                }
                self.surfaces.clear();
            }
        }
    }

    /// Rebuilds copies `1..` from copy 0.
    pub fn propagate_symmetry(&mut self, component: &ParentComponent) {
        if matches!(
            self.kind,
            PartKind::FixPoint(_) | PartKind::RibArray(_) | PartKind::StiffenerArray(_)
        ) {
            return;
        }
        propagate_copies(
            &mut self.surfaces,
            &component.symmetry_transforms(),
            component.surfaces(),
            &self.symmetry_indices,
        );
    }

    /// Returns `true` if every point lies on one of this part's cut planes.
    /// Only flat cuts take part; skins, domes and fixed points never match.
    #[must_use]
    pub fn planar_surfaces_contain(&self, points: &[Point3]) -> bool {
        let planar = matches!(
            self.kind,
            PartKind::Slice(_) | PartKind::Rib(_) | PartKind::Spar(_) | PartKind::RibArray(_) | PartKind::StiffenerArray(_)
        );
        planar && self.surfaces.iter().any(|s| surface_contains(s, points))
    }
}

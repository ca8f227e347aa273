pub mod mesher;
pub mod settings;
pub mod subsurface;

pub use mesher::{MesherFixPoint, MesherSurface};
pub use settings::{GridDensity, StructSettings};
pub use subsurface::{
    ConstLine, ParamPoint, RegionTest, SSControlSurface, SSEllipse, SSLine, SSLineArray, SSRectangle, SubSurface,
    SubSurfaceId, SubSurfaceKind, SubSurfaceType,
};

use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, warn};

use crate::component::ComponentId;
use crate::context::FeaContext;
use crate::geometry::FeaSurface;
use crate::part::{IncludedElements, PartId, PartKind, PartType, StructuralPart};
use crate::property::{PropertyKind, PropertyLibrary};

/// Samples taken along a skin feature line when testing it against cut planes.
const FEATURE_SAMPLES: u32 = 5;

/// List edit applied by the reorder operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderAction {
    Top,
    Up,
    Down,
    Bottom,
}

/// Moves `order[index]` per `action`; out-of-range indices are ignored.
fn reorder<K: Copy>(order: &mut Vec<K>, index: usize, action: ReorderAction) {
    if index >= order.len() {
        return;
    }
    match action {
        ReorderAction::Top => {
            let item = order.remove(index);
            order.insert(0, item);
        }
        ReorderAction::Bottom => {
            let item = order.remove(index);
            order.push(item);
        }
        ReorderAction::Up if index > 0 => order.swap(index, index - 1),
        ReorderAction::Down if index + 1 < order.len() => order.swap(index, index + 1),
        ReorderAction::Up | ReorderAction::Down => {}
    }
}

/// Replaces `order[index]` by `with`, keeping everything else in place.
fn replace_at<K: Copy>(order: &mut Vec<K>, index: usize, with: &[K]) {
    if index >= order.len() {
        return;
    }
    let tail = order.split_off(index + 1);
    order.pop();
    order.extend_from_slice(with);
    order.extend(tail);
}

/// Skin feature lines that coincide with a planar part and need no split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuppressedFeatures {
    pub u: Vec<f64>,
    pub w: Vec<f64>,
}

/// Which property slot of a part failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySlot {
    Property,
    CapProperty,
}

/// A part whose property index does not resolve to a property of the
/// expected kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyIssue {
    pub part: PartId,
    pub slot: PropertySlot,
    pub index: i32,
}

/// The structural layout of one main surface of a parent component.
///
/// Owns its parts and sub-surfaces in arenas plus an ordering list. A skin
/// part is created with the structure. Lookups answer with `None` or `-1`
/// for unknown entries and list edits ignore invalid indices.
#[derive(Debug, Clone)]
pub struct Structure {
    pub(crate) name: String,
    pub(crate) component: ComponentId,
    pub(crate) main_surface_index: usize,
    pub settings: StructSettings,
    pub grid_density: GridDensity,
    pub(crate) parts: SlotMap<PartId, StructuralPart>,
    pub(crate) part_order: Vec<PartId>,
    pub(crate) sub_surfaces: SlotMap<SubSurfaceId, SubSurface>,
    pub(crate) sub_surface_order: Vec<SubSurfaceId>,
    pub(crate) part_count: usize,
    pub(crate) sub_surface_count: usize,
}

impl Structure {
    /// Creates a structure holding only its skin.
    #[must_use]
    pub fn new(name: impl Into<String>, component: ComponentId, main_surface_index: usize) -> Self {
        let mut structure = Self::empty(name, component, main_surface_index);
        structure.add_part(PartType::Skin);
        structure
    }

    pub(crate) fn empty(name: impl Into<String>, component: ComponentId, main_surface_index: usize) -> Self {
        Self {
            name: name.into(),
            component,
            main_surface_index,
            settings: StructSettings::default(),
            grid_density: GridDensity::default(),
            parts: SlotMap::with_key(),
            part_order: Vec::new(),
            sub_surfaces: SlotMap::with_key(),
            sub_surface_order: Vec::new(),
            part_count: 0,
            sub_surface_count: 0,
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
    pub fn component(&self) -> ComponentId {
        self.component
    }

    #[must_use]
    pub fn main_surface_index(&self) -> usize {
        self.main_surface_index
    }

    // --- Part operations ---

    /// Appends a default part of `part_type` named `<Type>_<n>`.
    ///
    /// A fixed point is pinned to the skin; without a skin nothing is
    /// created. A structure holds at most one skin, so a second is refused.
    /// The running count advances either way.
    pub fn add_part(&mut self, part_type: PartType) -> Option<PartId> {
        let number = self.part_count;
        self.part_count += 1;
        if part_type == PartType::Skin && self.skin().is_some() {
            warn!(structure = %self.name, "structure already has a skin");
            return None;
        }
        let mut kind = PartKind::new(part_type);
        if let PartKind::FixPoint(fix) = &mut kind {
            let Some(skin) = self.skin() else {
                warn!(structure = %self.name, "fixed point needs a skin to attach to");
                return None;
            };
            fix.parent = Some(skin);
        }
        let part = StructuralPart::new(
            format!("{}_{number}", part_type.name()),
            self.component,
            self.main_surface_index,
            kind,
        );
        Some(self.push_part(part))
    }

    pub(crate) fn push_part(&mut self, part: StructuralPart) -> PartId {
        let id = self.parts.insert(part);
        self.part_order.push(id);
        id
    }

    /// Removes the part at `index` in list order.
    pub fn delete_part(&mut self, index: usize) -> Option<StructuralPart> {
        if index >= self.part_order.len() {
            return None;
        }
        let id = self.part_order.remove(index);
        self.parts.remove(id)
    }

    pub fn reorder_part(&mut self, index: usize, action: ReorderAction) {
        reorder(&mut self.part_order, index, action);
    }

    #[must_use]
    pub fn num_parts(&self) -> usize {
        self.part_order.len()
    }

    /// Parts in list order.
    pub fn parts(&self) -> impl Iterator<Item = (PartId, &StructuralPart)> + '_ {
        self.part_order
            .iter()
            .filter_map(|&id| self.parts.get(id).map(|p| (id, p)))
    }

    #[must_use]
    pub fn part(&self, id: PartId) -> Option<&StructuralPart> {
        self.parts.get(id)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut StructuralPart> {
        self.parts.get_mut(id)
    }

    #[must_use]
    pub fn part_at(&self, index: usize) -> Option<PartId> {
        self.part_order.get(index).copied()
    }

    #[must_use]
    pub fn part_index(&self, id: PartId) -> Option<usize> {
        self.part_order.iter().position(|&p| p == id)
    }

    /// The skin part, if the structure has one.
    #[must_use]
    pub fn skin(&self) -> Option<PartId> {
        self.parts()
            .find(|(_, p)| p.part_type() == PartType::Skin)
            .map(|(id, _)| id)
    }

    /// Property index of the part at `index`, `-1` if there is none.
    #[must_use]
    pub fn property_index(&self, index: usize) -> i32 {
        self.part_at(index)
            .and_then(|id| self.parts.get(id))
            .map_or(-1, |p| p.property_index)
    }

    /// Cap property index of the part at `index`, `-1` if there is none.
    #[must_use]
    pub fn cap_property_index(&self, index: usize) -> i32 {
        self.part_at(index)
            .and_then(|id| self.parts.get(id))
            .map_or(-1, |p| p.cap_property_index)
    }

    // --- Sub-surface operations ---

    /// Appends a default sub-surface of `sub_type` named `<Prefix>_<n>`.
    pub fn add_sub_surface(&mut self, sub_type: SubSurfaceType) -> SubSurfaceId {
        let name = format!("{}_{}", sub_type.name(), self.sub_surface_count);
        self.sub_surface_count += 1;
        self.push_sub_surface(SubSurface::new(name, SubSurfaceKind::new(sub_type)))
    }

    pub(crate) fn push_sub_surface(&mut self, sub_surface: SubSurface) -> SubSurfaceId {
        let id = self.sub_surfaces.insert(sub_surface);
        self.sub_surface_order.push(id);
        id
    }

    pub fn delete_sub_surface(&mut self, index: usize) -> Option<SubSurface> {
        if index >= self.sub_surface_order.len() {
            return None;
        }
        let id = self.sub_surface_order.remove(index);
        self.sub_surfaces.remove(id)
    }

    pub fn reorder_sub_surface(&mut self, index: usize, action: ReorderAction) {
        reorder(&mut self.sub_surface_order, index, action);
    }

    #[must_use]
    pub fn num_sub_surfaces(&self) -> usize {
        self.sub_surface_order.len()
    }

    /// Sub-surfaces in list order.
    pub fn sub_surfaces(&self) -> impl Iterator<Item = (SubSurfaceId, &SubSurface)> + '_ {
        self.sub_surface_order
            .iter()
            .filter_map(|&id| self.sub_surfaces.get(id).map(|s| (id, s)))
    }

    #[must_use]
    pub fn sub_surface(&self, id: SubSurfaceId) -> Option<&SubSurface> {
        self.sub_surfaces.get(id)
    }

    pub fn sub_surface_mut(&mut self, id: SubSurfaceId) -> Option<&mut SubSurface> {
        self.sub_surfaces.get_mut(id)
    }

    #[must_use]
    pub fn sub_surface_at(&self, index: usize) -> Option<SubSurfaceId> {
        self.sub_surface_order.get(index).copied()
    }

    #[must_use]
    pub fn sub_surface_index(&self, id: SubSurfaceId) -> Option<usize> {
        self.sub_surface_order.iter().position(|&s| s == id)
    }

    /// Replaces the line array at `index` by its standalone lines, named
    /// `<array>_Line<i>`, in the array's place.
    pub fn individualize_line_array(&mut self, index: usize) -> Vec<SubSurfaceId> {
        let Some(id) = self.sub_surface_at(index) else {
            return Vec::new();
        };
        let Some(array_sub) = self.sub_surfaces.get_mut(id) else {
            return Vec::new();
        };
        let SubSurfaceKind::LineArray(array) = &mut array_sub.kind else {
            return Vec::new();
        };
        let lines = array.lines();
        let template = array_sub.clone();

        let mut ids = Vec::with_capacity(lines.len());
        for (i, line) in lines.into_iter().enumerate() {
            let mut sub = SubSurface::new(format!("{}_Line{i}", template.name()), SubSurfaceKind::Line(line));
            sub.included_elements = template.included_elements;
            sub.test = template.test;
            sub.property_index = template.property_index;
            sub.cap_property_index = template.cap_property_index;
            sub.update();
            ids.push(self.sub_surfaces.insert(sub));
        }
        replace_at(&mut self.sub_surface_order, index, &ids);
        self.sub_surfaces.remove(id);
        ids
    }

    // --- Update ---

    /// Parts ordered so every part follows the part it reads from. A
    /// reference cycle falls back to list order.
    fn update_order(&self) -> Vec<PartId> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            id: PartId,
            parts: &SlotMap<PartId, StructuralPart>,
            marks: &mut SecondaryMap<PartId, Mark>,
            order: &mut Vec<PartId>,
        ) -> bool {
            match marks.get(id) {
                Some(Mark::Done) => return true,
                Some(Mark::Visiting) => return false,
                None => {}
            }
            let Some(part) = parts.get(id) else {
                return true;
            };
            marks.insert(id, Mark::Visiting);
            if let Some(reference) = part.reference().filter(|r| parts.contains_key(*r)) {
                if !visit(reference, parts, marks, order) {
                    return false;
                }
            }
            marks.insert(id, Mark::Done);
            order.push(id);
            true
        }

        let mut marks = SecondaryMap::new();
        let mut order = Vec::with_capacity(self.part_order.len());
        for &id in &self.part_order {
            if !visit(id, &self.parts, &mut marks, &mut order) {
                warn!(structure = %self.name, "part references form a cycle, updating in list order");
                return self.part_order.clone();
            }
        }
        order
    }

    /// Recomputes every part, then the fixed-point classifications, then
    /// every sub-surface.
    pub fn update(&mut self, ctx: &FeaContext<'_>) {
        debug!(structure = %self.name, parts = self.part_order.len(), "updating structure");
        let order = self.update_order();

        for &id in &order {
            let perpendicular = self
                .parts
                .get(id)
                .filter(|p| p.part_type() != PartType::FixPoint)
                .and_then(StructuralPart::reference)
                .and_then(|r| self.parts.get(r))
                .and_then(|p| p.surfaces().first())
                .cloned();
            if let Some(part) = self.parts.get_mut(id) {
                part.update(ctx, perpendicular.as_ref());
            }
        }

        let suppressed = self.suppressed_features();
        for &id in &order {
            let Some(copies) = self.classify_fix_point(id, &suppressed) else {
                continue;
            };
            if let Some(PartKind::FixPoint(fix)) = self.parts.get_mut(id).map(|p| &mut p.kind) {
                fix.set_copies(copies);
            }
        }

        for &id in &self.sub_surface_order {
            if let Some(sub) = self.sub_surfaces.get_mut(id) {
                sub.update();
            }
        }
    }

    fn classify_fix_point(
        &self,
        id: PartId,
        suppressed: &SuppressedFeatures,
    ) -> Option<Vec<crate::part::FixPointCopy>> {
        let PartKind::FixPoint(fix) = &self.parts.get(id)?.kind else {
            return None;
        };
        let Some(parent) = fix.parent.and_then(|p| self.parts.get(p)) else {
            warn!(structure = %self.name, "fixed point parent part not found");
            return Some(Vec::new());
        };
        let copies = if parent.part_type() == PartType::Skin {
            fix.classify(parent.surfaces(), &suppressed.u, &suppressed.w, self.settings.half_mesh)
        } else {
            fix.classify(parent.surfaces(), &[], &[], self.settings.half_mesh)
        };
        Some(copies)
    }

    /// Skin feature lines lying on a cut plane of some planar part.
    #[must_use]
    pub fn suppressed_features(&self) -> SuppressedFeatures {
        let mut suppressed = SuppressedFeatures::default();
        let Some(skin) = self
            .skin()
            .and_then(|id| self.parts.get(id))
            .and_then(|p| p.surfaces().first())
        else {
            return suppressed;
        };
        let d = skin.domain();
        let on_cut = |points: &[crate::math::Point3]| {
            self.parts
                .values()
                .any(|p| p.planar_surfaces_contain(points))
        };
        let along = |i: u32, min: f64, max: f64| min + f64::from(i) / f64::from(FEATURE_SAMPLES - 1) * (max - min);

        for &u in skin.u_features() {
            let points: Vec<_> = (0..FEATURE_SAMPLES)
                .map(|i| skin.point(u, along(i, d.w_min, d.w_max)))
                .collect();
            if on_cut(&points) {
                suppressed.u.push(u);
            }
        }
        for &w in skin.w_features() {
            let points: Vec<_> = (0..FEATURE_SAMPLES)
                .map(|i| skin.point(along(i, d.u_min, d.u_max), w))
                .collect();
            if on_cut(&points) {
                suppressed.w.push(w);
            }
        }
        suppressed
    }

    // --- Arrays ---

    /// Replaces the rib or stiffener array at `index` by standalone parts,
    /// one per member, named `<array>_Rib<i>` or `<array>_Slice<i>`.
    ///
    /// The array is brought up to date first. Anything else at `index` is
    /// left alone.
    pub fn individualize_array(&mut self, ctx: &FeaContext<'_>, index: usize) -> Vec<PartId> {
        let Some(id) = self.part_at(index) else {
            return Vec::new();
        };
        let perpendicular = self
            .parts
            .get(id)
            .and_then(StructuralPart::reference)
            .and_then(|r| self.parts.get(r))
            .and_then(|p| p.surfaces().first())
            .cloned();
        let Some(array) = self.parts.get_mut(id).filter(|p| p.part_type().is_array()) else {
            return Vec::new();
        };
        array.update(ctx, perpendicular.as_ref());
        let array = array.clone();

        let mode = array.location.mode;
        let (label, count) = match &array.kind {
            PartKind::RibArray(a) => ("Rib", a.num_members()),
            PartKind::StiffenerArray(a) => ("Slice", a.num_members()),
            _ => return Vec::new(),
        };
        let members = (0..count).filter_map(|i| {
            let (kind, location) = match &array.kind {
                PartKind::RibArray(a) => a.member(mode, i),
                PartKind::StiffenerArray(a) => a.member(mode, i),
                _ => None,
            }?;
            let mut part = StructuralPart::new(
                format!("{}_{label}{i}", array.name()),
                array.component(),
                array.main_surface_index(),
                kind,
            );
            part.included_elements = array.included_elements;
            part.draw = array.draw;
            part.location = location;
            part.property_index = array.property_index;
            part.cap_property_index = array.cap_property_index;
            Some(part)
        });

        let mut ids = Vec::with_capacity(count);
        for mut part in members.collect::<Vec<_>>() {
            part.update(ctx, perpendicular.as_ref());
            ids.push(self.parts.insert(part));
        }
        if let Some(position) = self.part_index(id) {
            replace_at(&mut self.part_order, position, &ids);
        }
        self.parts.remove(id);
        debug!(array = %array.name(), members = ids.len(), "array individualized");
        ids
    }

    /// Individualizes every array, in list order.
    pub fn individualize_all(&mut self, ctx: &FeaContext<'_>) -> Vec<PartId> {
        let mut ids = Vec::new();
        let mut index = 0;
        while index < self.part_order.len() {
            let is_array = self
                .part_at(index)
                .and_then(|id| self.parts.get(id))
                .is_some_and(|p| p.part_type().is_array());
            if is_array {
                let members = self.individualize_array(ctx, index);
                index += members.len();
                ids.extend(members);
            } else {
                index += 1;
            }
        }
        ids
    }

    // --- Properties ---

    /// Parts whose property or cap property does not resolve to a property
    /// of the kind their elements need. Fixed points carry no properties.
    #[must_use]
    pub fn validate_part_properties(&self, library: &PropertyLibrary) -> Vec<PropertyIssue> {
        let resolves = |index: i32, kind: PropertyKind| {
            usize::try_from(index)
                .ok()
                .and_then(|i| library.property(i))
                .is_some_and(|p| p.kind == kind)
        };
        let mut issues = Vec::new();
        for (id, part) in self.parts() {
            if part.part_type() == PartType::FixPoint {
                continue;
            }
            let shell = part.included_elements != IncludedElements::Beam;
            let beam = part.included_elements != IncludedElements::Shell;
            if shell && !resolves(part.property_index, PropertyKind::Shell) {
                issues.push(PropertyIssue {
                    part: id,
                    slot: PropertySlot::Property,
                    index: part.property_index,
                });
            }
            if beam && !resolves(part.cap_property_index, PropertyKind::Beam) {
                issues.push(PropertyIssue {
                    part: id,
                    slot: PropertySlot::CapProperty,
                    index: part.cap_property_index,
                });
            }
        }
        issues
    }

    /// Surfaces of the skin's primary copy, if it has been updated.
    #[must_use]
    pub fn skin_surface(&self) -> Option<&FeaSurface> {
        self.skin()
            .and_then(|id| self.parts.get(id))
            .and_then(|p| p.surfaces().first())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::component::{ComponentRegistry, SymmetryPlane};
    use crate::part::tests::wing_component;
    use crate::part::{LocationMode, PatchContact, PerpendicularEdge, SlicePlane};

    fn setup() -> (ComponentRegistry, ComponentId, PropertyLibrary) {
        let mut registry = ComponentRegistry::new();
        let id = registry.insert(wing_component());
        (registry, id, PropertyLibrary::new())
    }

    fn names(structure: &Structure) -> Vec<String> {
        structure.parts().map(|(_, p)| p.name().to_owned()).collect()
    }

    #[test]
    fn new_structure_has_skin() {
        let (_, id, _) = setup();
        let structure = Structure::new("Struct", id, 0);
        assert_eq!(structure.num_parts(), 1);
        assert_eq!(names(&structure), ["Skin_0"]);
        assert!(structure.skin().is_some());
    }

    #[test]
    fn parts_are_named_by_running_count() {
        let (_, id, _) = setup();
        let mut structure = Structure::new("Struct", id, 0);
        structure.add_part(PartType::Rib);
        structure.add_part(PartType::Spar);
        structure.add_part(PartType::Rib);
        assert_eq!(names(&structure), ["Skin_0", "Rib_1", "Spar_2", "Rib_3"]);
    }

    #[test]
    fn fix_point_needs_skin() {
        let (_, id, _) = setup();
        let mut structure = Structure::new("Struct", id, 0);
        let fix = structure.add_part(PartType::FixPoint).unwrap();
        let PartKind::FixPoint(f) = &structure.part(fix).unwrap().kind else {
            unreachable!()
        };
        assert_eq!(f.parent, structure.skin());

        structure.delete_part(0);
        assert!(structure.add_part(PartType::FixPoint).is_none());
        structure.add_part(PartType::Slice);
        assert_eq!(names(&structure), ["FixPoint_1", "Slice_3"]);
    }

    #[test]
    fn only_one_skin() {
        let (_, id, _) = setup();
        let mut structure = Structure::new("Struct", id, 0);
        let skin = structure.skin();
        assert!(structure.add_part(PartType::Skin).is_none());
        assert_eq!(structure.num_parts(), 1);
        assert_eq!(structure.skin(), skin);

        // a replacement is allowed once the old skin is gone
        structure.delete_part(0);
        let replacement = structure.add_part(PartType::Skin).unwrap();
        assert_eq!(structure.skin(), Some(replacement));
        assert_eq!(names(&structure), ["Skin_2"]);
    }

    #[test]
    fn reorder_and_sentinels() {
        let (_, id, _) = setup();
        let mut structure = Structure::new("Struct", id, 0);
        structure.add_part(PartType::Rib);
        structure.add_part(PartType::Spar);
        structure.reorder_part(2, ReorderAction::Top);
        assert_eq!(names(&structure), ["Spar_2", "Skin_0", "Rib_1"]);
        structure.reorder_part(0, ReorderAction::Down);
        assert_eq!(names(&structure), ["Skin_0", "Spar_2", "Rib_1"]);
        structure.reorder_part(0, ReorderAction::Up);
        structure.reorder_part(7, ReorderAction::Bottom);
        assert_eq!(names(&structure), ["Skin_0", "Spar_2", "Rib_1"]);
        structure.reorder_part(0, ReorderAction::Bottom);
        assert_eq!(names(&structure), ["Spar_2", "Rib_1", "Skin_0"]);

        assert_eq!(structure.property_index(9), -1);
        assert_eq!(structure.cap_property_index(0), 1);
        assert!(structure.delete_part(9).is_none());
        let rib = structure.part_at(1).unwrap();
        assert_eq!(structure.part_index(rib), Some(1));
        structure.delete_part(1);
        assert!(structure.part(rib).is_none());
        assert_eq!(structure.part_index(rib), None);
    }

    #[test]
    fn referencing_part_updates_after_its_reference() {
        let (registry, id, library) = setup();
        let ctx = FeaContext::new(&registry, &library);
        let mut structure = Structure::new("Struct", id, 0);
        let rib = structure.add_part(PartType::Rib).unwrap();
        let spar = structure.add_part(PartType::Spar).unwrap();
        {
            let spar = structure.part_mut(spar).unwrap();
            spar.kind = PartKind::Spar(crate::part::Spar {
                theta: 20.0,
                ..crate::part::Spar::default()
            });
        }
        if let PartKind::Rib(r) = &mut structure.part_mut(rib).unwrap().kind {
            r.perpendicular_edge = PerpendicularEdge::Part(spar);
        }
        structure.update(&ctx);

        // squared against the swept spar, so the rib is no longer streamwise
        let rib_normal = structure.part(rib).unwrap().surfaces()[0].normal(0.5, 0.5);
        let spar_surface = &structure.part(spar).unwrap().surfaces()[0];
        let spar_dir = spar_surface.point(0.5, 1.0) - spar_surface.point(0.5, 0.0);
        assert_relative_eq!(rib_normal.cross(&spar_dir.normalize()).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn reference_cycle_still_updates() {
        let (registry, id, library) = setup();
        let ctx = FeaContext::new(&registry, &library);
        let mut structure = Structure::new("Struct", id, 0);
        let a = structure.add_part(PartType::Rib).unwrap();
        let b = structure.add_part(PartType::Rib).unwrap();
        for (from, to) in [(a, b), (b, a)] {
            if let PartKind::Rib(r) = &mut structure.part_mut(from).unwrap().kind {
                r.perpendicular_edge = PerpendicularEdge::Part(to);
            }
        }
        structure.update(&ctx);
        assert_eq!(structure.part(a).unwrap().surfaces().len(), 1);
        assert_eq!(structure.part(b).unwrap().surfaces().len(), 1);
    }

    #[test]
    fn fix_point_classified_on_skin() {
        let mut registry = ComponentRegistry::new();
        let id = registry.insert(wing_component().with_symmetry(&[SymmetryPlane::XZ]));
        let library = PropertyLibrary::new();
        let ctx = FeaContext::new(&registry, &library);
        let mut structure = Structure::new("Struct", id, 0);
        let fix = structure.add_part(PartType::FixPoint).unwrap();
        if let PartKind::FixPoint(f) = &mut structure.part_mut(fix).unwrap().kind {
            f.set_position(0.0, 0.0);
        }
        structure.update(&ctx);

        let PartKind::FixPoint(f) = &structure.part(fix).unwrap().kind else {
            unreachable!()
        };
        assert_eq!(f.copies().len(), 2);
        assert_eq!(f.copies()[0].contact, Some(PatchContact::Corner));
        assert!(f.border());
        assert!(structure.part(fix).unwrap().surfaces().is_empty());
    }

    #[test]
    fn features_under_cuts_are_suppressed() {
        let (registry, id, library) = setup();
        let ctx = FeaContext::new(&registry, &library);
        let mut structure = Structure::new("Struct", id, 0);
        let span_cut = structure.add_part(PartType::Slice).unwrap();
        if let PartKind::Slice(s) = &mut structure.part_mut(span_cut).unwrap().kind {
            s.plane = SlicePlane::XzBody;
        }
        let le_cut = structure.add_part(PartType::Slice).unwrap();
        structure.part_mut(le_cut).unwrap().location = crate::part::CenterLocation::relative(0.0);
        structure.update(&ctx);

        let suppressed = structure.suppressed_features();
        assert_eq!(suppressed.u, vec![1.0]);
        assert_eq!(suppressed.w, vec![2.0]);
    }

    #[test]
    fn individualize_replaces_array_in_place() {
        let (registry, id, library) = setup();
        let ctx = FeaContext::new(&registry, &library);
        let mut structure = Structure::new("Struct", id, 0);
        let array = structure.add_part(PartType::RibArray).unwrap();
        structure.add_part(PartType::Spar);
        structure.part_mut(array).unwrap().property_index = 3;

        let members = structure.individualize_array(&ctx, 1);
        assert_eq!(members.len(), 5);
        assert!(structure.part(array).is_none());
        assert_eq!(
            names(&structure),
            [
                "Skin_0",
                "RibArray_1_Rib0",
                "RibArray_1_Rib1",
                "RibArray_1_Rib2",
                "RibArray_1_Rib3",
                "RibArray_1_Rib4",
                "Spar_2"
            ]
        );
        let third = structure.part(members[2]).unwrap();
        assert_eq!(third.part_type(), PartType::Rib);
        assert_eq!(third.property_index, 3);
        assert_eq!(third.location.mode, LocationMode::Relative);
        assert_relative_eq!(third.location.rel, 0.5, epsilon = 1e-12);
        assert_relative_eq!(third.surfaces()[0].point(0.5, 0.5).y, 2.0, epsilon = 1e-9);

        // nothing to individualize at a plain part
        assert!(structure.individualize_array(&ctx, 0).is_empty());
    }

    #[test]
    fn individualize_all_handles_every_array() {
        let (registry, id, library) = setup();
        let ctx = FeaContext::new(&registry, &library);
        let mut structure = Structure::new("Struct", id, 0);
        structure.add_part(PartType::RibArray);
        structure.add_part(PartType::StiffenerArray);
        let ids = structure.individualize_all(&ctx);
        assert_eq!(ids.len(), 5 + 6);
        assert_eq!(structure.num_parts(), 1 + 5 + 6);
        assert!(structure.parts().all(|(_, p)| !p.part_type().is_array()));
        assert_eq!(structure.part(ids[5]).unwrap().name(), "StiffenerArray_2_Slice0");
    }

    #[test]
    fn sub_surface_list_mirrors_parts() {
        let (registry, id, library) = setup();
        let ctx = FeaContext::new(&registry, &library);
        let mut structure = Structure::new("Struct", id, 0);
        let line = structure.add_sub_surface(SubSurfaceType::Line);
        structure.add_sub_surface(SubSurfaceType::Rectangle);
        let array = structure.add_sub_surface(SubSurfaceType::LineArray);
        assert_eq!(structure.sub_surface(line).unwrap().name(), "SSLine_0");
        assert_eq!(structure.sub_surface(array).unwrap().name(), "SSLineArray_2");

        structure.reorder_sub_surface(2, ReorderAction::Up);
        assert_eq!(structure.sub_surface_index(array), Some(1));
        structure.update(&ctx);
        assert_eq!(structure.sub_surface(line).unwrap().boundary().len(), 1);

        let lines = structure.individualize_line_array(1);
        assert_eq!(lines.len(), 5);
        assert_eq!(structure.num_sub_surfaces(), 2 + 5);
        assert!(structure.sub_surface(array).is_none());
        assert_eq!(structure.sub_surface(lines[0]).unwrap().name(), "SSLineArray_2_Line0");
        assert_eq!(structure.sub_surface_index(lines[0]), Some(1));

        assert!(structure.delete_sub_surface(40).is_none());
        assert!(structure.delete_sub_surface(0).is_some());
        assert!(structure.sub_surface(line).is_none());
    }

    #[test]
    fn property_validation_checks_kinds() {
        let (_, id, mut library) = setup();
        let mut structure = Structure::new("Struct", id, 0);
        let rib = structure.add_part(PartType::Rib).unwrap();
        let fix = structure.add_part(PartType::FixPoint).unwrap();
        assert!(structure.validate_part_properties(&library).is_empty());

        let part = structure.part_mut(rib).unwrap();
        part.included_elements = IncludedElements::ShellAndBeam;
        part.property_index = 1;
        let issues = structure.validate_part_properties(&library);
        assert_eq!(
            issues,
            [PropertyIssue {
                part: rib,
                slot: PropertySlot::Property,
                index: 1
            }]
        );

        library.remove_property(1).unwrap();
        structure.part_mut(rib).unwrap().property_index = 0;
        let issues = structure.validate_part_properties(&library);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].slot, PropertySlot::CapProperty);
        assert!(issues.iter().all(|i| i.part != fix));
    }
}

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::geometry::FeaSurface;
use crate::math::{affine_inverse, Matrix4, Point3, Vector3};

slotmap::new_key_type! {
    /// Unique identifier for a parent component in the registry.
    pub struct ComponentId;
}

/// Mirror plane of a planar symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymmetryPlane {
    /// Reflects `z`.
    XY,
    /// Reflects `y`.
    XZ,
    /// Reflects `x`.
    YZ,
}

impl SymmetryPlane {
    #[must_use]
    pub fn reflection(self) -> Matrix4 {
        let s = match self {
            Self::XY => Vector3::new(1.0, 1.0, -1.0),
            Self::XZ => Vector3::new(1.0, -1.0, 1.0),
            Self::YZ => Vector3::new(-1.0, 1.0, 1.0),
        };
        Matrix4::new_nonuniform_scaling(&s)
    }
}

/// Spanwise section layout of a wing.
///
/// Wing surfaces advance one unit of `u` per section; an end cap adds one
/// extra unit at its end.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WingLayout {
    /// Span of each section, root first.
    pub section_spans: Vec<f64>,
    pub root_cap: bool,
    pub tip_cap: bool,
}

impl WingLayout {
    #[must_use]
    pub fn new(section_spans: Vec<f64>) -> Self {
        Self {
            section_spans,
            root_cap: false,
            tip_cap: false,
        }
    }

    #[must_use]
    pub fn with_caps(mut self, root_cap: bool, tip_cap: bool) -> Self {
        self.root_cap = root_cap;
        self.tip_cap = tip_cap;
        self
    }

    #[must_use]
    pub fn num_sections(&self) -> usize {
        self.section_spans.len()
    }

    /// Clamps an inclusive section range onto the layout.
    #[must_use]
    pub fn clamp_sections(&self, start: usize, end: usize) -> (usize, usize) {
        let last = self.num_sections().saturating_sub(1);
        let end = end.min(last);
        (start.min(end), end)
    }

    /// Spans of the sections covered by `limit` (all sections when `None`).
    #[must_use]
    pub fn spans(&self, limit: Option<(usize, usize)>) -> &[f64] {
        match limit {
            Some((start, end)) if !self.section_spans.is_empty() => {
                let (start, end) = self.clamp_sections(start, end);
                &self.section_spans[start..=end]
            }
            Some(_) => &[],
            None => &self.section_spans,
        }
    }

    #[must_use]
    pub fn total_span(&self, limit: Option<(usize, usize)>) -> f64 {
        self.spans(limit).iter().sum()
    }

    /// Surface `u` bounds of the sections covered by `limit`.
    #[must_use]
    pub fn u_bounds(&self, limit: Option<(usize, usize)>, u_max: f64) -> (f64, f64) {
        let cap_offset = if self.root_cap { 1.0 } else { 0.0 };
        match limit {
            Some((start, end)) => {
                let (start, end) = self.clamp_sections(start, end);
                #[allow(clippy::cast_precision_loss)]
                let u_min = start as f64 + cap_offset;
                #[allow(clippy::cast_precision_loss)]
                let u_hi = u_min + 1.0 + (end - start) as f64;
                (u_min, u_hi)
            }
            None => {
                let u_hi = if self.tip_cap { u_max - 1.0 } else { u_max };
                (cap_offset, u_hi)
            }
        }
    }
}

/// An aircraft component that owns a structural layout.
///
/// Main surfaces are supplied in the body frame; the component keeps the
/// absolute-frame surfaces of every symmetric copy, copy-major.
#[derive(Debug, Clone)]
pub struct ParentComponent {
    name: String,
    body_surfaces: Vec<FeaSurface>,
    model_matrix: Matrix4,
    symmetry: Vec<SymmetryPlane>,
    copy_transforms: Vec<Matrix4>,
    surfaces: Vec<FeaSurface>,
    wing: Option<WingLayout>,
}

impl ParentComponent {
    /// Creates a component without symmetry at the world origin.
    #[must_use]
    pub fn new(name: impl Into<String>, main_surfaces: Vec<FeaSurface>) -> Self {
        let mut component = Self {
            name: name.into(),
            body_surfaces: main_surfaces,
            model_matrix: Matrix4::identity(),
            symmetry: Vec::new(),
            copy_transforms: Vec::new(),
            surfaces: Vec::new(),
            wing: None,
        };
        component.rebuild();
        component
    }

    #[must_use]
    pub fn with_model_matrix(mut self, model_matrix: Matrix4) -> Self {
        self.model_matrix = model_matrix;
        self.rebuild();
        self
    }

    /// Each plane doubles the number of symmetric copies.
    #[must_use]
    pub fn with_symmetry(mut self, planes: &[SymmetryPlane]) -> Self {
        self.symmetry = planes.to_vec();
        self.rebuild();
        self
    }

    #[must_use]
    pub fn with_wing_layout(mut self, layout: WingLayout) -> Self {
        self.wing = Some(layout);
        self
    }

    fn rebuild(&mut self) {
        let mut transforms = vec![Matrix4::identity()];
        for plane in &self.symmetry {
            let reflect = plane.reflection();
            let mirrored: Vec<Matrix4> = transforms.iter().map(|t| reflect * t).collect();
            transforms.extend(mirrored);
        }

        self.surfaces.clear();
        for t in &transforms {
            let total = t * self.model_matrix;
            let mirrored = t.fixed_view::<3, 3>(0, 0).determinant() < 0.0;
            for s in &self.body_surfaces {
                let mut copy = s.transformed(&total);
                if mirrored {
                    copy.flip();
                }
                self.surfaces.push(copy);
            }
        }
        self.copy_transforms = transforms;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Surfaces of every copy, indexed `copy * num_main_surfaces + main`.
    #[must_use]
    pub fn surfaces(&self) -> &[FeaSurface] {
        &self.surfaces
    }

    #[must_use]
    pub fn num_main_surfaces(&self) -> usize {
        self.body_surfaces.len()
    }

    /// Absolute-frame surface of the primary copy.
    #[must_use]
    pub fn main_surface(&self, main_index: usize) -> Option<&FeaSurface> {
        self.surfaces.get(main_index).filter(|_| main_index < self.num_main_surfaces())
    }

    #[must_use]
    pub fn num_symmetry_copies(&self) -> usize {
        self.copy_transforms.len()
    }

    /// Surface indices of every copy of main surface `main_index`.
    #[must_use]
    pub fn symmetry_indices(&self, main_index: usize) -> Vec<usize> {
        let n_main = self.num_main_surfaces();
        if main_index >= n_main {
            return Vec::new();
        }
        (0..self.num_symmetry_copies()).map(|c| c * n_main + main_index).collect()
    }

    /// Transforms chaining each copy onto the next: copy `i` is copy `i - 1`
    /// transformed by entry `i`. Entry 0 is the identity.
    #[must_use]
    pub fn symmetry_transforms(&self) -> Vec<Matrix4> {
        let mut out = Vec::with_capacity(self.copy_transforms.len());
        for (i, t) in self.copy_transforms.iter().enumerate() {
            if i == 0 {
                out.push(Matrix4::identity());
            } else {
                out.push(t * affine_inverse(&self.copy_transforms[i - 1]));
            }
        }
        out
    }

    #[must_use]
    pub fn model_matrix(&self) -> &Matrix4 {
        &self.model_matrix
    }

    /// Body-frame origin in absolute coordinates.
    #[must_use]
    pub fn location(&self) -> Point3 {
        Point3::new(self.model_matrix[(0, 3)], self.model_matrix[(1, 3)], self.model_matrix[(2, 3)])
    }

    #[must_use]
    pub fn wing(&self) -> Option<&WingLayout> {
        self.wing.as_ref()
    }
}

/// Arena of parent components answering the geometry queries of the
/// structural layer. Unknown ids answer with empty results.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: SlotMap<ComponentId, ParentComponent>,
}

impl ComponentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component: ParentComponent) -> ComponentId {
        self.components.insert(component)
    }

    pub fn remove(&mut self, id: ComponentId) -> Option<ParentComponent> {
        self.components.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<&ParentComponent> {
        self.components.get(id)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut ParentComponent> {
        self.components.get_mut(id)
    }

    #[must_use]
    pub fn surface_list(&self, id: ComponentId) -> &[FeaSurface] {
        self.get(id).map_or(&[], ParentComponent::surfaces)
    }

    #[must_use]
    pub fn symmetry_indices(&self, id: ComponentId, main_index: usize) -> Vec<usize> {
        self.get(id).map(|c| c.symmetry_indices(main_index)).unwrap_or_default()
    }

    #[must_use]
    pub fn symmetry_transforms(&self, id: ComponentId) -> Vec<Matrix4> {
        self.get(id).map(ParentComponent::symmetry_transforms).unwrap_or_default()
    }

    #[must_use]
    pub fn num_symmetry_copies(&self, id: ComponentId) -> usize {
        self.get(id).map_or(0, ParentComponent::num_symmetry_copies)
    }

    #[must_use]
    pub fn model_matrix(&self, id: ComponentId) -> Option<Matrix4> {
        self.get(id).map(|c| *c.model_matrix())
    }
}

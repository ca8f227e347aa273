use serde::{Deserialize, Serialize};

use crate::geometry::{FeaSurface, SurfaceRole};

use super::ParentView;

/// The parent's own outer mold line, meshed as a part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skin {
    /// Drop the skin triangles from the final mesh, keeping only the
    /// internal structure.
    pub remove_skin_tris: bool,
}

impl Skin {
    pub(crate) fn surface(&self, view: &ParentView<'_>) -> FeaSurface {
        let mut surface = view.surface.clone();
        surface.set_role(SurfaceRole::Normal);
        surface
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::component::{ComponentRegistry, SymmetryPlane};
    use crate::context::FeaContext;
    use crate::part::tests::wing_component;
    use crate::part::{PartKind, PartType, StructuralPart};
    use crate::property::PropertyLibrary;

    #[test]
    fn copies_match_parent_surfaces() {
        let mut registry = ComponentRegistry::new();
        let id = registry.insert(wing_component().with_symmetry(&[SymmetryPlane::XZ]));
        let library = PropertyLibrary::new();
        let mut skin = StructuralPart::new("Skin", id, 0, PartKind::new(PartType::Skin));
        skin.update(&FeaContext::new(&registry, &library), None);

        let parents = registry.surface_list(id);
        assert_eq!(skin.surfaces().len(), parents.len());
        for (s, parent) in skin.surfaces().iter().zip(parents) {
            assert_eq!(s.role(), SurfaceRole::Normal);
            assert_eq!(s.flip_normal(), parent.flip_normal());
            assert!((s.point(0.5, 1.0) - parent.point(0.5, 1.0)).norm() < 1e-9);
        }
    }
}

//! JSON records for structures.
//!
//! Arena handles do not survive a save, so references between parts are
//! written as positions in the part list and resolved again on load.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::component::{ComponentId, ComponentRegistry};
use crate::error::{PersistenceError, Result};
use crate::part::{
    ArraySpacing, Bulkhead, CenterLocation, FixPoint, IncludedElements, PartId, PartKind, PartType, PerpendicularEdge,
    Rib, RibArray, Skin, Slice, Spar, StiffenerArray, StructuralPart,
};
use crate::structure::{GridDensity, RegionTest, StructSettings, Structure, SubSurface, SubSurfaceKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StructureRecord {
    name: String,
    main_surface_index: usize,
    #[serde(default)]
    settings: StructSettings,
    #[serde(default)]
    grid_density: GridDensity,
    #[serde(default)]
    part_count: usize,
    #[serde(default)]
    sub_surface_count: usize,
    parts: Vec<PartRecord>,
    #[serde(default)]
    sub_surfaces: Vec<SubSurfaceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PartRecord {
    name: String,
    #[serde(default)]
    included_elements: IncludedElements,
    #[serde(default)]
    draw: bool,
    #[serde(default)]
    location: CenterLocation,
    property_index: i32,
    cap_property_index: i32,
    #[serde(flatten)]
    kind: KindRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum KindRecord {
    Slice(Slice),
    Rib(RibRecord),
    Spar(Spar),
    FixPoint(FixPointRecord),
    Skin(Skin),
    Bulkhead(Bulkhead),
    RibArray { spacing: ArraySpacing, rib: RibRecord },
    StiffenerArray { spacing: ArraySpacing, slice: Slice },
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
enum EdgeRecord {
    #[default]
    None,
    LeadingEdge,
    TrailingEdge,
    /// Position of the referenced part.
    Part(usize),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct RibRecord {
    theta: f64,
    perpendicular_edge: EdgeRecord,
    limit_to_section: bool,
    start_section: usize,
    end_section: usize,
    bbox_trim: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct FixPointRecord {
    pos_u: f64,
    pos_w: f64,
    #[serde(default)]
    mass_flag: bool,
    #[serde(default)]
    mass: f64,
    /// Position of the parent part.
    parent: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubSurfaceRecord {
    name: String,
    #[serde(default)]
    included_elements: IncludedElements,
    #[serde(default)]
    test: RegionTest,
    property_index: i32,
    cap_property_index: i32,
    kind: SubSurfaceKind,
}

/// Maps part handles to list positions for writing.
fn position_of(structure: &Structure, id: PartId) -> Option<usize> {
    structure.part_index(id)
}

impl RibRecord {
    fn encode(rib: &Rib, structure: &Structure) -> Self {
        let perpendicular_edge = match rib.perpendicular_edge {
            PerpendicularEdge::None => EdgeRecord::None,
            PerpendicularEdge::LeadingEdge => EdgeRecord::LeadingEdge,
            PerpendicularEdge::TrailingEdge => EdgeRecord::TrailingEdge,
            PerpendicularEdge::Part(id) => position_of(structure, id).map_or(EdgeRecord::None, EdgeRecord::Part),
        };
        Self {
            theta: rib.theta,
            perpendicular_edge,
            limit_to_section: rib.limit_to_section,
            start_section: rib.start_section,
            end_section: rib.end_section,
            bbox_trim: rib.bbox_trim,
        }
    }

    fn decode(&self, ids: &[PartId]) -> Rib {
        let perpendicular_edge = match self.perpendicular_edge {
            EdgeRecord::None => PerpendicularEdge::None,
            EdgeRecord::LeadingEdge => PerpendicularEdge::LeadingEdge,
            EdgeRecord::TrailingEdge => PerpendicularEdge::TrailingEdge,
            EdgeRecord::Part(index) => resolve(ids, index).map_or(PerpendicularEdge::None, PerpendicularEdge::Part),
        };
        Rib {
            theta: self.theta,
            perpendicular_edge,
            limit_to_section: self.limit_to_section,
            start_section: self.start_section,
            end_section: self.end_section,
            bbox_trim: self.bbox_trim,
        }
    }
}

fn resolve(ids: &[PartId], index: usize) -> Option<PartId> {
    let id = ids.get(index).copied();
    if id.is_none() {
        warn!(index, parts = ids.len(), "part reference out of range, dropped");
    }
    id
}

impl KindRecord {
    fn encode(kind: &PartKind, structure: &Structure) -> Self {
        match kind {
            PartKind::Slice(slice) => Self::Slice(*slice),
            PartKind::Rib(rib) => Self::Rib(RibRecord::encode(rib, structure)),
            PartKind::Spar(spar) => Self::Spar(*spar),
            PartKind::FixPoint(fix) => Self::FixPoint(FixPointRecord {
                pos_u: fix.pos_u,
                pos_w: fix.pos_w,
                mass_flag: fix.mass_flag,
                mass: fix.mass,
                parent: fix.parent.and_then(|id| position_of(structure, id)),
            }),
            PartKind::Skin(skin) => Self::Skin(*skin),
            PartKind::Bulkhead(bulkhead) => Self::Bulkhead(*bulkhead),
            PartKind::RibArray(array) => Self::RibArray {
                spacing: array.spacing,
                rib: RibRecord::encode(&array.rib, structure),
            },
            PartKind::StiffenerArray(array) => Self::StiffenerArray {
                spacing: array.spacing,
                slice: array.slice,
            },
        }
    }

    fn decode(&self, ids: &[PartId]) -> PartKind {
        match self {
            Self::Slice(slice) => PartKind::Slice(*slice),
            Self::Rib(rib) => PartKind::Rib(rib.decode(ids)),
            Self::Spar(spar) => PartKind::Spar(*spar),
            Self::FixPoint(record) => {
                let mut fix = FixPoint::default();
                fix.mass_flag = record.mass_flag;
                fix.mass = record.mass;
                fix.parent = record.parent.and_then(|index| resolve(ids, index));
                fix.set_position(record.pos_u, record.pos_w);
                PartKind::FixPoint(fix)
            }
            Self::Skin(skin) => PartKind::Skin(*skin),
            Self::Bulkhead(bulkhead) => PartKind::Bulkhead(*bulkhead),
            Self::RibArray { spacing, rib } => {
                let mut array = RibArray::default();
                array.spacing = *spacing;
                array.rib = rib.decode(ids);
                PartKind::RibArray(array)
            }
            Self::StiffenerArray { spacing, slice } => {
                let mut array = StiffenerArray::default();
                array.spacing = *spacing;
                array.slice = *slice;
                PartKind::StiffenerArray(array)
            }
        }
    }
}

impl Structure {
    /// Writes the structure's definition. Computed surfaces are not saved;
    /// they come back with the next update.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let parts = self
            .parts()
            .map(|(_, part)| PartRecord {
                name: part.name().to_owned(),
                included_elements: part.included_elements,
                draw: part.draw,
                location: part.location,
                property_index: part.property_index,
                cap_property_index: part.cap_property_index,
                kind: KindRecord::encode(&part.kind, self),
            })
            .collect();
        let sub_surfaces = self
            .sub_surfaces()
            .map(|(_, sub)| SubSurfaceRecord {
                name: sub.name().to_owned(),
                included_elements: sub.included_elements,
                test: sub.test,
                property_index: sub.property_index,
                cap_property_index: sub.cap_property_index,
                kind: sub.kind.clone(),
            })
            .collect();
        let record = StructureRecord {
            name: self.name.clone(),
            main_surface_index: self.main_surface_index,
            settings: self.settings,
            grid_density: self.grid_density,
            part_count: self.part_count,
            sub_surface_count: self.sub_surface_count,
            parts,
            sub_surfaces,
        };
        Ok(serde_json::to_string_pretty(&record).map_err(PersistenceError::from)?)
    }

    /// Reads a structure written by [`Structure::to_json`] and attaches it
    /// to `component`.
    ///
    /// Part references that no longer resolve are dropped with a warning.
    /// The name counters never fall below the number of entries read.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, `component` is not in
    /// `components`, or the record names a main surface the component
    /// does not have.
    pub fn from_json(json: &str, component: ComponentId, components: &ComponentRegistry) -> Result<Self> {
        let record: StructureRecord = serde_json::from_str(json).map_err(PersistenceError::from)?;
        let parent = components.get(component).ok_or(PersistenceError::UnknownComponent)?;
        if record.main_surface_index >= parent.num_main_surfaces() {
            return Err(PersistenceError::InvalidRecord(format!(
                "main surface {} of {} does not exist",
                record.main_surface_index,
                parent.name()
            ))
            .into());
        }

        let skins = record
            .parts
            .iter()
            .filter(|r| matches!(r.kind, KindRecord::Skin(_)))
            .count();
        if skins > 1 {
            return Err(PersistenceError::InvalidRecord(format!("{skins} skin parts, at most one allowed")).into());
        }

        let mut structure = Self::empty(record.name, component, record.main_surface_index);
        structure.settings = record.settings;
        structure.grid_density = record.grid_density;

        // Handles first, so references can point forward in the list.
        let ids: Vec<PartId> = record
            .parts
            .iter()
            .map(|r| {
                structure.push_part(StructuralPart::new(
                    r.name.clone(),
                    component,
                    record.main_surface_index,
                    PartKind::new(PartType::Skin),
                ))
            })
            .collect();
        for (r, &id) in record.parts.iter().zip(&ids) {
            let kind = r.kind.decode(&ids);
            let mut part = StructuralPart::new(r.name.clone(), component, record.main_surface_index, kind);
            part.included_elements = r.included_elements;
            part.draw = r.draw;
            part.location = r.location;
            part.property_index = r.property_index;
            part.cap_property_index = r.cap_property_index;
            if let Some(slot) = structure.part_mut(id) {
                *slot = part;
            }
        }

        for r in record.sub_surfaces {
            let mut sub = SubSurface::new(r.name, r.kind);
            sub.included_elements = r.included_elements;
            sub.test = r.test;
            sub.property_index = r.property_index;
            sub.cap_property_index = r.cap_property_index;
            structure.push_sub_surface(sub);
        }

        structure.part_count = record.part_count.max(structure.num_parts());
        structure.sub_surface_count = record.sub_surface_count.max(structure.num_sub_surfaces());
        debug!(
            structure = %structure.name,
            parts = structure.num_parts(),
            sub_surfaces = structure.num_sub_surfaces(),
            "structure loaded"
        );
        Ok(structure)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FeaError;
    use crate::part::tests::wing_component;
    use crate::part::LocationMode;
    use crate::structure::{ReorderAction, SubSurfaceType};

    fn registry() -> (ComponentRegistry, ComponentId) {
        let mut registry = ComponentRegistry::new();
        let id = registry.insert(wing_component());
        (registry, id)
    }

    #[test]
    fn references_survive_reload() {
        let (registry, id) = registry();
        let mut structure = Structure::new("Struct", id, 0);
        let spar = structure.add_part(PartType::Spar).unwrap();
        let rib = structure.add_part(PartType::Rib).unwrap();
        structure.add_part(PartType::FixPoint);
        structure.reorder_part(1, ReorderAction::Bottom);
        if let PartKind::Rib(r) = &mut structure.part_mut(rib).unwrap().kind {
            r.perpendicular_edge = PerpendicularEdge::Part(spar);
            r.theta = 12.0;
        }
        structure.part_mut(rib).unwrap().location = CenterLocation::absolute(1.5);
        structure.add_sub_surface(SubSurfaceType::Ellipse);
        structure.settings.half_mesh = true;

        let json = structure.to_json().unwrap();
        let loaded = Structure::from_json(&json, id, &registry).unwrap();

        let names: Vec<_> = loaded.parts().map(|(_, p)| p.name().to_owned()).collect();
        assert_eq!(names, ["Skin_0", "Rib_2", "FixPoint_3", "Spar_1"]);
        let spar = loaded.part_at(3).unwrap();
        let rib = loaded.part(loaded.part_at(1).unwrap()).unwrap();
        let PartKind::Rib(r) = &rib.kind else { unreachable!() };
        assert_eq!(r.perpendicular_edge, PerpendicularEdge::Part(spar));
        assert_eq!(rib.location.mode, LocationMode::Absolute);
        let PartKind::FixPoint(f) = &loaded.part(loaded.part_at(2).unwrap()).unwrap().kind else {
            unreachable!()
        };
        assert_eq!(f.parent, loaded.skin());
        assert!(loaded.settings.half_mesh);
        assert_eq!(loaded.num_sub_surfaces(), 1);

        // counters carry on where they left off
        let mut loaded = loaded;
        let next = loaded.add_part(PartType::Slice).unwrap();
        assert_eq!(loaded.part(next).unwrap().name(), "Slice_4");
        let next = loaded.add_sub_surface(SubSurfaceType::Line);
        assert_eq!(loaded.sub_surface(next).unwrap().name(), "SSLine_1");
    }

    #[test]
    fn dangling_reference_is_dropped() {
        let (registry, id) = registry();
        let json = r#"{
            "name": "S",
            "main_surface_index": 0,
            "parts": [
                { "name": "Skin_0", "property_index": 0, "cap_property_index": 1, "type": "Skin" },
                { "name": "FixPoint_1", "property_index": -1, "cap_property_index": -1,
                  "type": "FixPoint", "pos_u": 1.5, "pos_w": 0.25, "parent": 7 }
            ]
        }"#;
        let loaded = Structure::from_json(json, id, &registry).unwrap();
        let PartKind::FixPoint(f) = &loaded.part(loaded.part_at(1).unwrap()).unwrap().kind else {
            unreachable!()
        };
        assert_eq!(f.parent, None);
        assert_eq!((f.pos_u, f.pos_w), (1.0, 0.25));
        assert_eq!(loaded.part_count, 2);
    }

    #[test]
    fn rejects_bad_input() {
        let (registry, id) = registry();
        let json = Structure::new("S", id, 0).to_json().unwrap();

        let mut empty = ComponentRegistry::new();
        let other = empty.insert(wing_component());
        assert!(empty.remove(other).is_some());
        assert!(matches!(
            Structure::from_json(&json, other, &empty),
            Err(FeaError::Persistence(PersistenceError::UnknownComponent))
        ));
        assert!(matches!(
            Structure::from_json("{ not json", id, &registry),
            Err(FeaError::Persistence(PersistenceError::Json(_)))
        ));
        let wrong_surface = json.replace("\"main_surface_index\": 0", "\"main_surface_index\": 3");
        assert!(matches!(
            Structure::from_json(&wrong_surface, id, &registry),
            Err(FeaError::Persistence(PersistenceError::InvalidRecord(_)))
        ));
    }

    #[test]
    fn second_skin_record_is_rejected() {
        let (registry, id) = registry();
        let json = r#"{
            "name": "S",
            "main_surface_index": 0,
            "part_count": 2,
            "sub_surface_count": 0,
            "parts": [
                { "name": "Skin_0", "property_index": 0, "cap_property_index": 1, "type": "Skin" },
                { "name": "Skin_1", "property_index": 0, "cap_property_index": 1, "type": "Skin" }
            ],
            "sub_surfaces": []
        }"#;
        assert!(matches!(
            Structure::from_json(json, id, &registry),
            Err(FeaError::Persistence(PersistenceError::InvalidRecord(_)))
        ));
        let one_skin = json.replace(
            r#",
                { "name": "Skin_1", "property_index": 0, "cap_property_index": 1, "type": "Skin" }"#,
            "",
        );
        let loaded = Structure::from_json(&one_skin, id, &registry).unwrap();
        assert_eq!(loaded.num_parts(), 1);
        assert!(loaded.skin().is_some());
    }
}

use crate::component::ComponentId;
use crate::geometry::FeaSurface;
use crate::math::Point3;
use crate::part::{PartKind, PartType};

use super::Structure;

/// One surface handed to the mesher, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct MesherSurface {
    pub surface: FeaSurface,
    pub component: ComponentId,
    pub main_surface_index: usize,
    /// Position of the owning part in the structure's part list.
    pub part_index: usize,
}

/// A fixed point resolved against every copy of its parent part.
#[derive(Debug, Clone, PartialEq)]
pub struct MesherFixPoint {
    pub part_index: usize,
    pub pos_u: f64,
    pub pos_w: f64,
    /// Location on each parent copy.
    pub points: Vec<Point3>,
    /// Per copy: whether the point sits on a patch edge.
    pub border: Vec<bool>,
    /// Per copy: split patches that contain the point.
    pub split_indices: Vec<Vec<usize>>,
    pub mass: Option<f64>,
}

impl Structure {
    /// Every computed part surface, skin first if it leads the list. Array
    /// members contribute one surface per copy.
    #[must_use]
    pub fn mesher_surfaces(&self) -> Vec<MesherSurface> {
        self.parts()
            .enumerate()
            .flat_map(|(part_index, (_, part))| {
                part.surfaces().iter().map(move |surface| MesherSurface {
                    surface: surface.clone(),
                    component: part.component(),
                    main_surface_index: part.main_surface_index(),
                    part_index,
                })
            })
            .collect()
    }

    /// Fixed points with the classification from the last update. Points
    /// whose parent part is gone are skipped.
    #[must_use]
    pub fn mesher_fix_points(&self) -> Vec<MesherFixPoint> {
        self.parts()
            .enumerate()
            .filter(|(_, (_, part))| part.part_type() == PartType::FixPoint)
            .filter_map(|(part_index, (_, part))| {
                let PartKind::FixPoint(fix) = &part.kind else {
                    return None;
                };
                let parent = fix.parent.and_then(|id| self.part(id))?;
                Some(MesherFixPoint {
                    part_index,
                    pos_u: fix.pos_u,
                    pos_w: fix.pos_w,
                    points: fix.points(parent.surfaces()),
                    border: fix.copies().iter().map(|c| c.border()).collect(),
                    split_indices: fix.copies().iter().map(|c| c.split_indices.clone()).collect(),
                    mass: fix.point_mass(),
                })
            })
            .collect()
    }
}

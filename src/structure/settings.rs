use serde::{Deserialize, Serialize};

/// Structure-wide meshing switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructSettings {
    /// Mesh only the `y >= 0` half; fixed points skip patches on the other side.
    pub half_mesh: bool,
    pub intersect_sub_surfaces: bool,
    pub convert_to_quads: bool,
    pub high_order_elements: bool,
}

impl Default for StructSettings {
    fn default() -> Self {
        Self {
            half_mesh: false,
            intersect_sub_surfaces: true,
            convert_to_quads: false,
            high_order_elements: false,
        }
    }
}

/// Target element sizing handed to the mesher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDensity {
    pub base_len: f64,
    pub min_len: f64,
    pub max_gap: f64,
    pub n_circ_seg: f64,
    pub grow_ratio: f64,
    pub rigor_limit: bool,
    pub far_max_len: f64,
    pub far_max_gap: f64,
    pub far_n_circ_seg: f64,
}

impl Default for GridDensity {
    fn default() -> Self {
        Self {
            base_len: 0.5,
            min_len: 0.1,
            max_gap: 0.005,
            n_circ_seg: 16.0,
            grow_ratio: 1.3,
            rigor_limit: false,
            far_max_len: 2.0,
            far_max_gap: 0.02,
            far_n_circ_seg: 16.0,
        }
    }
}

impl GridDensity {
    /// Returns a copy with mutually consistent limits.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut g = *self;
        g.base_len = g.base_len.max(f64::MIN_POSITIVE);
        g.min_len = g.min_len.clamp(0.0, g.base_len);
        g.max_gap = g.max_gap.max(0.0);
        g.n_circ_seg = g.n_circ_seg.max(1.0);
        g.grow_ratio = g.grow_ratio.max(1.0);
        g.far_max_len = g.far_max_len.max(g.base_len);
        g.far_max_gap = g.far_max_gap.max(0.0);
        g.far_n_circ_seg = g.far_n_circ_seg.max(1.0);
        g
    }
}

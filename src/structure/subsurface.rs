use serde::{Deserialize, Serialize};

use crate::part::{ArraySpacing, IncludedElements, LocationMode};
use crate::property::{DEFAULT_BEAM_PROPERTY, DEFAULT_SHELL_PROPERTY};

slotmap::new_key_type! {
    /// Handle of a sub-surface inside its structure.
    pub struct SubSurfaceId;
}

/// Point in the normalized `(u, w)` square of the parent surface.
pub type ParamPoint = nalgebra::Point2<f64>;

const DEFAULT_ELLIPSE_POINTS: usize = 20;

/// Variant tag of a sub-surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubSurfaceType {
    Line,
    Rectangle,
    Ellipse,
    ControlSurface,
    LineArray,
}

impl SubSurfaceType {
    /// Prefix used when naming new sub-surfaces.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Line => "SSLine",
            Self::Rectangle => "SSRect",
            Self::Ellipse => "SSEllipse",
            Self::ControlSurface => "SSConSurf",
            Self::LineArray => "SSLineArray",
        }
    }
}

/// Parameter held constant along a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstLine {
    #[default]
    U,
    W,
}

/// Side of a closed boundary the sub-surface covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionTest {
    #[default]
    Inside,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SSLine {
    pub direction: ConstLine,
    pub value: f64,
}

impl Default for SSLine {
    fn default() -> Self {
        Self {
            direction: ConstLine::U,
            value: 0.5,
        }
    }
}

impl SSLine {
    fn boundary(&self) -> Vec<ParamPoint> {
        let v = self.value.clamp(0.0, 1.0);
        match self.direction {
            ConstLine::U => vec![ParamPoint::new(v, 0.0), ParamPoint::new(v, 1.0)],
            ConstLine::W => vec![ParamPoint::new(0.0, v), ParamPoint::new(1.0, v)],
        }
    }
}

/// Rectangle centered at `(center_u, center_w)`, turned by `theta` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SSRectangle {
    pub center_u: f64,
    pub center_w: f64,
    pub u_length: f64,
    pub w_length: f64,
    pub theta: f64,
}

impl Default for SSRectangle {
    fn default() -> Self {
        Self {
            center_u: 0.5,
            center_w: 0.5,
            u_length: 0.2,
            w_length: 0.2,
            theta: 0.0,
        }
    }
}

/// Ellipse with the same placement fields as [`SSRectangle`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SSEllipse {
    pub center_u: f64,
    pub center_w: f64,
    pub u_length: f64,
    pub w_length: f64,
    pub theta: f64,
    pub num_points: usize,
}

impl Default for SSEllipse {
    fn default() -> Self {
        Self {
            center_u: 0.5,
            center_w: 0.5,
            u_length: 0.2,
            w_length: 0.2,
            theta: 0.0,
            num_points: DEFAULT_ELLIPSE_POINTS,
        }
    }
}

/// Hinged region running `u_start..u_end` along the span and `chord`
/// (a fraction of each side's `w` range) forward from the trailing edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SSControlSurface {
    pub u_start: f64,
    pub u_end: f64,
    pub chord: f64,
    pub upper: bool,
    pub lower: bool,
}

impl Default for SSControlSurface {
    fn default() -> Self {
        Self {
            u_start: 0.4,
            u_end: 0.6,
            chord: 0.25,
            upper: true,
            lower: true,
        }
    }
}

/// Evenly spaced constant-U or constant-W lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SSLineArray {
    pub direction: ConstLine,
    pub spacing: ArraySpacing,
}

impl Default for SSLineArray {
    fn default() -> Self {
        Self {
            direction: ConstLine::U,
            spacing: ArraySpacing {
                rel_start: 0.1,
                rel_end: 0.9,
                rel_spacing: 0.2,
                ..ArraySpacing::default()
            },
        }
    }
}

impl SSLineArray {
    /// The standalone lines this array stands for.
    pub fn lines(&mut self) -> Vec<SSLine> {
        let count = self.spacing.resolve(LocationMode::Relative, 1.0);
        (0..count)
            .map(|i| SSLine {
                direction: self.direction,
                value: self.spacing.member_location(LocationMode::Relative, i).rel.clamp(0.0, 1.0),
            })
            .collect()
    }
}

/// Variant payload of a sub-surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubSurfaceKind {
    Line(SSLine),
    Rectangle(SSRectangle),
    Ellipse(SSEllipse),
    ControlSurface(SSControlSurface),
    LineArray(SSLineArray),
}

impl SubSurfaceKind {
    #[must_use]
    pub fn new(sub_type: SubSurfaceType) -> Self {
        match sub_type {
            SubSurfaceType::Line => Self::Line(SSLine::default()),
            SubSurfaceType::Rectangle => Self::Rectangle(SSRectangle::default()),
            SubSurfaceType::Ellipse => Self::Ellipse(SSEllipse::default()),
            SubSurfaceType::ControlSurface => Self::ControlSurface(SSControlSurface::default()),
            SubSurfaceType::LineArray => Self::LineArray(SSLineArray::default()),
        }
    }

    #[must_use]
    pub fn sub_type(&self) -> SubSurfaceType {
        match self {
            Self::Line(_) => SubSurfaceType::Line,
            Self::Rectangle(_) => SubSurfaceType::Rectangle,
            Self::Ellipse(_) => SubSurfaceType::Ellipse,
            Self::ControlSurface(_) => SubSurfaceType::ControlSurface,
            Self::LineArray(_) => SubSurfaceType::LineArray,
        }
    }
}

/// Turned copy of `(du, dw)` around `center`.
fn turned(center: ParamPoint, du: f64, dw: f64, theta: f64) -> ParamPoint {
    let (s, c) = theta.to_radians().sin_cos();
    ParamPoint::new(center.x + du * c - dw * s, center.y + du * s + dw * c)
}

/// A region or line on the parent surface's parameter square that the
/// mesher keeps as its own element group.
#[derive(Debug, Clone, PartialEq)]
pub struct SubSurface {
    name: String,
    pub kind: SubSurfaceKind,
    pub included_elements: IncludedElements,
    pub test: RegionTest,
    pub property_index: i32,
    pub cap_property_index: i32,
    boundary: Vec<Vec<ParamPoint>>,
}

impl SubSurface {
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn new(name: impl Into<String>, kind: SubSurfaceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            included_elements: IncludedElements::default(),
            test: RegionTest::default(),
            property_index: DEFAULT_SHELL_PROPERTY as i32,
            cap_property_index: DEFAULT_BEAM_PROPERTY as i32,
            boundary: Vec::new(),
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
    pub fn sub_type(&self) -> SubSurfaceType {
        self.kind.sub_type()
    }

    /// Boundary polylines in the normalized parameter square, one per
    /// connected piece, as of the last update.
    #[must_use]
    pub fn boundary(&self) -> &[Vec<ParamPoint>] {
        &self.boundary
    }

    /// Recomputes the boundary polylines.
    pub fn update(&mut self) {
        self.boundary = match &mut self.kind {
            SubSurfaceKind::Line(line) => vec![line.boundary()],
            SubSurfaceKind::Rectangle(r) => {
                let c = ParamPoint::new(r.center_u, r.center_w);
                let (hu, hw) = (0.5 * r.u_length, 0.5 * r.w_length);
                let corners = [(-hu, -hw), (hu, -hw), (hu, hw), (-hu, hw), (-hu, -hw)];
                vec![corners.iter().map(|&(du, dw)| turned(c, du, dw, r.theta)).collect()]
            }
            SubSurfaceKind::Ellipse(e) => {
                let c = ParamPoint::new(e.center_u, e.center_w);
                let n = e.num_points.max(3);
                let ring = (0..=n)
                    .map(|i| {
                        #[allow(clippy::cast_precision_loss)]
                        let t = std::f64::consts::TAU * (i % n) as f64 / n as f64;
                        turned(c, 0.5 * e.u_length * t.cos(), 0.5 * e.w_length * t.sin(), e.theta)
                    })
                    .collect();
                vec![ring]
            }
            SubSurfaceKind::ControlSurface(cs) => {
                let (u0, u1) = (cs.u_start.clamp(0.0, 1.0), cs.u_end.clamp(0.0, 1.0));
                let depth = 0.5 * cs.chord.clamp(0.0, 1.0);
                let side = |edge: f64, inner: f64| {
                    vec![
                        ParamPoint::new(u0, edge),
                        ParamPoint::new(u0, inner),
                        ParamPoint::new(u1, inner),
                        ParamPoint::new(u1, edge),
                    ]
                };
                let mut pieces = Vec::new();
                if cs.upper {
                    pieces.push(side(0.0, depth));
                }
                if cs.lower {
                    pieces.push(side(1.0, 1.0 - depth));
                }
                pieces
            }
            SubSurfaceKind::LineArray(array) => array.lines().iter().map(SSLine::boundary).collect(),
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn updated(kind: SubSurfaceKind) -> SubSurface {
        let mut s = SubSurface::new("s", kind);
        s.update();
        s
    }

    #[test]
    fn line_spans_square() {
        let s = updated(SubSurfaceKind::Line(SSLine {
            direction: ConstLine::W,
            value: 0.3,
        }));
        assert_eq!(s.boundary(), &[vec![ParamPoint::new(0.0, 0.3), ParamPoint::new(1.0, 0.3)]]);
        assert_eq!(s.property_index, 0);
        assert_eq!(s.cap_property_index, 1);
    }

    #[test]
    fn rectangle_is_closed_and_turns() {
        let s = updated(SubSurfaceKind::Rectangle(SSRectangle {
            u_length: 0.4,
            theta: 90.0,
            ..SSRectangle::default()
        }));
        let ring = &s.boundary()[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        // long side now runs along w
        let (min_w, max_w) = ring.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        assert_relative_eq!(max_w - min_w, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn ellipse_samples_ring() {
        let s = updated(SubSurfaceKind::new(SubSurfaceType::Ellipse));
        let ring = &s.boundary()[0];
        assert_eq!(ring.len(), DEFAULT_ELLIPSE_POINTS + 1);
        for p in ring {
            assert_relative_eq!((p - ParamPoint::new(0.5, 0.5)).norm(), 0.1, epsilon = 1e-12);
        }
    }

    #[test]
    fn control_surface_sides() {
        let s = updated(SubSurfaceKind::new(SubSurfaceType::ControlSurface));
        assert_eq!(s.boundary().len(), 2);
        assert_relative_eq!(s.boundary()[0][1].y, 0.125, epsilon = 1e-12);
        assert_relative_eq!(s.boundary()[1][1].y, 0.875, epsilon = 1e-12);

        let s = updated(SubSurfaceKind::ControlSurface(SSControlSurface {
            lower: false,
            ..SSControlSurface::default()
        }));
        assert_eq!(s.boundary().len(), 1);
    }

    #[test]
    fn line_array_expands() {
        let mut array = SSLineArray::default();
        let lines = array.lines();
        assert_eq!(lines.len(), 5);
        assert_relative_eq!(lines[4].value, 0.9, epsilon = 1e-12);
        let s = updated(SubSurfaceKind::LineArray(array));
        assert_eq!(s.boundary().len(), 5);
        assert_eq!(s.sub_type().name(), "SSLineArray");
    }
}

use serde::{Deserialize, Serialize};

use crate::geometry::{ConformalSpine, FeaSurface, RevolvedSurface, SurfaceShape};
use crate::math::{rotation_matrix, Matrix4, Vector3};

use super::ParentView;

/// Rotation limit of a dome about each axis, degrees.
const MAX_ROTATION: f64 = 180.0;

/// Ellipsoidal dome placed inside the parent.
///
/// A unit hemisphere on `+X` is scaled to the three radii, rotated about its
/// own center, moved to its location and carried into the absolute frame.
/// No trimming against the parent takes place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bulkhead {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub x_loc: f64,
    pub y_loc: f64,
    pub z_loc: f64,
    /// Degrees.
    pub x_rot: f64,
    pub y_rot: f64,
    pub z_rot: f64,
    /// Open the dome toward `-X` instead.
    pub flip_direction: bool,
    /// Offset the dome by the parent spine center at `u_spine_loc`.
    pub spine_attach: bool,
    pub u_spine_loc: f64,
}

impl Default for Bulkhead {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 1.0,
            c: 1.0,
            x_loc: 0.0,
            y_loc: 0.0,
            z_loc: 0.0,
            x_rot: 0.0,
            y_rot: 0.0,
            z_rot: 0.0,
            flip_direction: false,
            spine_attach: false,
            u_spine_loc: 0.0,
        }
    }
}

impl Bulkhead {
    /// Rotations in degrees, each limited to ±180°.
    #[must_use]
    pub fn rotations(&self) -> Vector3 {
        Vector3::new(self.x_rot, self.y_rot, self.z_rot).map(|r| r.clamp(-MAX_ROTATION, MAX_ROTATION))
    }

    /// Absolute-frame placement of the unit hemisphere.
    fn placement(&self, view: &ParentView<'_>) -> Matrix4 {
        let r = self.rotations().map(f64::to_radians);
        let mirror = if self.flip_direction {
            Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0))
        } else {
            Matrix4::identity()
        };
        let local = Matrix4::new_translation(&Vector3::new(self.x_loc, self.y_loc, self.z_loc))
            * rotation_matrix(&Vector3::z(), r.z)
            * rotation_matrix(&Vector3::y(), r.y)
            * rotation_matrix(&Vector3::x(), r.x)
            * Matrix4::new_nonuniform_scaling(&Vector3::new(self.a, self.b, self.c))
            * mirror;
        let placed = view.model * local;
        if !self.spine_attach {
            return placed;
        }
        let spine = ConformalSpine::build(view.surface);
        let station = spine.center_at_u(self.u_spine_loc.clamp(0.0, 1.0) * view.surface.u_max());
        Matrix4::new_translation(&(station - view.component.location())) * placed
    }

    pub(crate) fn surface(&self, view: &ParentView<'_>) -> FeaSurface {
        let mut dome = FeaSurface::new(SurfaceShape::Revolved(RevolvedSurface::unit_hemisphere()));
        dome.transform(&self.placement(view));
        dome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::component::ParentComponent;
    use crate::math::BoundingBox;
    use crate::part::tests::{p, wing_component, wing_surface};

    fn dome_box(bulkhead: &Bulkhead, component: &ParentComponent) -> BoundingBox {
        let view = ParentView::new(component, 0).unwrap();
        bulkhead.surface(&view).bounding_box()
    }

    #[test]
    fn unit_dome_opens_on_plus_x() {
        let bbox = dome_box(&Bulkhead::default(), &wing_component());
        assert_relative_eq!(bbox.min, p(0.0, -1.0, -1.0), epsilon = 1e-9);
        assert_relative_eq!(bbox.max, p(1.0, 1.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn radii_and_location_shape_the_dome() {
        let bulkhead = Bulkhead {
            a: 2.0,
            b: 3.0,
            c: 0.5,
            x_loc: 5.0,
            ..Bulkhead::default()
        };
        let bbox = dome_box(&bulkhead, &wing_component());
        assert_relative_eq!(bbox.min, p(5.0, -3.0, -0.5), epsilon = 1e-9);
        assert_relative_eq!(bbox.max, p(7.0, 3.0, 0.5), epsilon = 1e-9);
    }

    #[test]
    fn flip_and_rotation_turn_the_dome() {
        let flipped = Bulkhead {
            flip_direction: true,
            ..Bulkhead::default()
        };
        let bbox = dome_box(&flipped, &wing_component());
        assert_relative_eq!(bbox.min.x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.x, 0.0, epsilon = 1e-9);

        let turned = Bulkhead {
            z_rot: 90.0,
            ..Bulkhead::default()
        };
        let bbox = dome_box(&turned, &wing_component());
        assert_relative_eq!(bbox.min.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn rotations_are_limited() {
        let bulkhead = Bulkhead {
            x_rot: 270.0,
            y_rot: -400.0,
            ..Bulkhead::default()
        };
        assert_eq!(bulkhead.rotations(), Vector3::new(180.0, -180.0, 0.0));
    }

    #[test]
    fn follows_model_and_spine() {
        let moved = ParentComponent::new("Wing", vec![wing_surface()])
            .with_model_matrix(Matrix4::new_translation(&Vector3::new(0.0, 0.0, 3.0)));
        let bbox = dome_box(&Bulkhead::default(), &moved);
        assert_relative_eq!(bbox.center().z, 3.0, epsilon = 1e-9);

        let attached = Bulkhead {
            spine_attach: true,
            u_spine_loc: 0.5,
            ..Bulkhead::default()
        };
        let bbox = dome_box(&attached, &wing_component());
        assert_relative_eq!(bbox.min.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.center().y, 2.0, epsilon = 1e-6);
    }
}

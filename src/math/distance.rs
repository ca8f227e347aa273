use crate::geometry::surface::Plane;

use super::{Point3, ANGLE_EPSILON};

/// Distance from `point` to `plane`, positive on the side the normal faces.
#[must_use]
pub fn signed_distance_to_plane(point: &Point3, plane: &Plane) -> f64 {
    plane.normal().dot(&(point - plane.point()))
}

/// Distance from `point` to the unbounded line through `a` and `b`, or
/// `None` if the two points coincide.
#[must_use]
pub fn point_line_distance(point: &Point3, a: &Point3, b: &Point3) -> Option<f64> {
    let along = b - a;
    let len = along.norm();
    (len > ANGLE_EPSILON).then(|| along.cross(&(point - a)).norm() / len)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Vector3;

    #[test]
    fn plane_distance_is_signed() {
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert_relative_eq!(signed_distance_to_plane(&Point3::new(3.0, 4.0, 3.0), &plane), 2.0);
        assert_relative_eq!(signed_distance_to_plane(&Point3::new(3.0, 4.0, 0.0), &plane), -1.0);
    }

    #[test]
    fn line_distance() {
        let d = point_line_distance(&Point3::new(0.0, 2.0, 0.0), &Point3::new(-1.0, 0.0, 0.0), &Point3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(d.unwrap(), 2.0, epsilon = 1e-12);
        let same = Point3::new(1.0, 1.0, 1.0);
        assert!(point_line_distance(&Point3::origin(), &same, &same).is_none());
    }
}

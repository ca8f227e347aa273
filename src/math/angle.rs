use std::f64::consts::PI;

use super::{Vector3, TOLERANCE};

/// Unsigned angle between two vectors in `[0, π]`.
///
/// Zero-length input yields `0`.
#[must_use]
pub fn angle(a: &Vector3, b: &Vector3) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < TOLERANCE {
        return 0.0;
    }
    let cos = a.dot(b) / denom;
    if cos >= 1.0 {
        0.0
    } else if cos <= -1.0 {
        PI
    } else {
        cos.acos()
    }
}

/// Angle from `a` to `b`, negative when `a × b` points away from `reference`.
#[must_use]
pub fn signed_angle(a: &Vector3, b: &Vector3, reference: &Vector3) -> f64 {
    let ang = angle(a, b);
    if a.cross(b).dot(reference) < 0.0 {
        -ang
    } else {
        ang
    }
}

/// Rotates `v` about the unit `axis` by `theta` radians.
///
/// The rotation sense follows `v × axis`, so a positive `theta` turns `v`
/// clockwise when viewed from the tip of `axis`.
#[must_use]
pub fn rodrigues_rotate(v: &Vector3, axis: &Vector3, theta: f64) -> Vector3 {
    let (s, c) = theta.sin_cos();
    v * c + v.cross(axis) * s + axis * (v.dot(axis) * (1.0 - c))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn signed_angle_sign_follows_reference() {
        let a = Vector3::new(1.0, 1.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);
        let z = Vector3::z();
        assert_relative_eq!(signed_angle(&a, &b, &z), -FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(signed_angle(&b, &a, &z), FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn angle_of_zero_vector_is_zero() {
        assert_eq!(angle(&Vector3::zeros(), &Vector3::x()), 0.0);
    }

    #[test]
    fn angle_of_opposite_vectors_is_pi() {
        assert_relative_eq!(angle(&Vector3::x(), &-Vector3::x()), PI, epsilon = 1e-12);
    }

    #[test]
    fn rodrigues_quarter_turn() {
        let r = rodrigues_rotate(&Vector3::x(), &Vector3::z(), FRAC_PI_2);
        assert_relative_eq!(r, -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn rodrigues_preserves_axis_component() {
        let v = Vector3::new(0.3, 0.4, 2.0);
        let r = rodrigues_rotate(&v, &Vector3::z(), 1.1);
        assert_relative_eq!(r.z, 2.0, epsilon = 1e-12);
        assert_relative_eq!(r.norm(), v.norm(), epsilon = 1e-12);
    }
}

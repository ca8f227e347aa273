pub mod angle;
pub mod bbox;
pub mod distance;
pub mod transform;

pub use angle::{angle, rodrigues_rotate, signed_angle};
pub use bbox::BoundingBox;
pub use distance::{point_line_distance, signed_distance_to_plane};
pub use transform::{
    affine_inverse, rotation_about_point, rotation_matrix, transform_direction, transform_point,
};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Degeneracy gate shared by every trim computation.
///
/// Sines, cosines and edge lengths at or below this value are treated as zero.
pub const ANGLE_EPSILON: f64 = f32::EPSILON as f64;

/// Returns `numerator / sin(angle)`, or `None` when the sine is degenerate.
#[must_use]
pub fn safe_div_sin(numerator: f64, angle: f64) -> Option<f64> {
    let s = angle.sin();
    if s.abs() <= ANGLE_EPSILON {
        None
    } else {
        Some(numerator / s)
    }
}

/// Returns `numerator / cos(angle)`, or `None` when the cosine is degenerate.
#[must_use]
pub fn safe_div_cos(numerator: f64, angle: f64) -> Option<f64> {
    let c = angle.cos();
    if c.abs() <= ANGLE_EPSILON {
        None
    } else {
        Some(numerator / c)
    }
}

/// Returns `true` if `a` and `b` are equal within [`TOLERANCE`].
#[must_use]
pub fn near(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn safe_div_sin_rejects_zero_angle() {
        assert!(safe_div_sin(1.0, 0.0).is_none());
        assert!(safe_div_sin(1.0, 1e-9).is_none());
    }

    #[test]
    fn safe_div_sin_divides() {
        let v = safe_div_sin(2.0, FRAC_PI_2).unwrap();
        assert!((v - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn safe_div_cos_rejects_right_angle() {
        assert!(safe_div_cos(1.0, FRAC_PI_2).is_none());
        assert!((safe_div_cos(3.0, 0.0).unwrap() - 3.0).abs() < TOLERANCE);
    }
}

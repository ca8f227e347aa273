use nalgebra::Vector4;

use super::{Matrix4, Point3, Vector3, TOLERANCE};

/// Builds a 4x4 rotation matrix around an axis by an angle (Rodrigues).
///
/// The axis is normalized internally; a zero axis yields the identity.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rotation_matrix(axis: &Vector3, angle: f64) -> Matrix4 {
    let len = axis.norm();
    if len < TOLERANCE {
        return Matrix4::identity();
    }
    let axis = axis / len;
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    #[rustfmt::skip]
    #[allow(clippy::suspicious_operation_groupings)]
    let m = Matrix4::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y, 0.0,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x, 0.0,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,     0.0,
        0.0,               0.0,               0.0,               1.0,
    );
    m
}

/// Rotation about an axis passing through `origin`.
#[must_use]
pub fn rotation_about_point(origin: &Point3, axis: &Vector3, angle: f64) -> Matrix4 {
    let t_neg = Matrix4::new_translation(&(-origin.coords));
    let rot = rotation_matrix(axis, angle);
    let t_pos = Matrix4::new_translation(&origin.coords);
    t_pos * rot * t_neg
}

/// Inverse of an affine transform; singular input yields the identity.
#[must_use]
pub fn affine_inverse(matrix: &Matrix4) -> Matrix4 {
    matrix.try_inverse().unwrap_or_else(|| {
        tracing::warn!("singular model matrix, using identity");
        Matrix4::identity()
    })
}

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let p = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
    if (p.w - 1.0).abs() > TOLERANCE && p.w.abs() > TOLERANCE {
        Point3::new(p.x / p.w, p.y / p.w, p.z / p.w)
    } else {
        Point3::new(p.x, p.y, p.z)
    }
}

/// Transforms a direction vector by a 4x4 matrix (ignores translation).
#[must_use]
pub fn transform_direction(matrix: &Matrix4, dir: &Vector3) -> Vector3 {
    let d = matrix * Vector4::new(dir.x, dir.y, dir.z, 0.0);
    Vector3::new(d.x, d.y, d.z)
}

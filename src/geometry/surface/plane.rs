use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Unbounded plane through `point` with unit `normal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    point: Point3,
    normal: Vector3,
}

impl Plane {
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if `normal` has no direction.
    pub fn from_normal(point: Point3, normal: Vector3) -> Result<Self> {
        let normal = normal
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        Ok(Self { point, normal })
    }

    #[must_use]
    pub fn point(&self) -> &Point3 {
        &self.point
    }

    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }
}

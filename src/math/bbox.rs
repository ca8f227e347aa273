use serde::{Deserialize, Serialize};

use super::{Point3, Vector3};

/// An axis-aligned bounding box.
///
/// A freshly created box is empty (`min > max`) until a point is added.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// Creates an empty box.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Creates the smallest box containing all `points`.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.add_point(p);
        }
        bbox
    }

    /// Returns `true` if no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Grows the box to contain `p`.
    pub fn add_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grows the box to contain `other`.
    pub fn merge(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.add_point(&other.min);
        self.add_point(&other.max);
    }

    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis; zero for an empty box.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    #[must_use]
    pub fn largest_dimension(&self) -> f64 {
        self.extents().max()
    }

    #[must_use]
    pub fn smallest_dimension(&self) -> f64 {
        self.extents().min()
    }

    /// Size-relative oversize margin used when building cut planes.
    #[must_use]
    pub fn expansion(&self) -> f64 {
        (self.largest_dimension() * 1e-3).max(1e-5)
    }
}

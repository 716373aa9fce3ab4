//! Axis-aligned bounds of a point cloud.

use nalgebra::Vector3;
use ndarray::Array2;

/// Axis-aligned bounding box measured in model units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Smallest coordinate along each axis.
    pub min: Vector3<f64>,
    /// Largest coordinate along each axis.
    pub max: Vector3<f64>,
}

impl Bounds {
    /// Create [`Bounds`] from explicit corners.
    #[must_use]
    pub const fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self { min, max }
    }

    /// Compute the bounds of an `(N, 3)` coordinate array.
    ///
    /// Returns `None` when there are no points or the array is not three columns wide.
    ///
    /// # Examples
    /// ```
    /// use fea_compare::Bounds;
    /// use ndarray::array;
    ///
    /// let bounds = Bounds::of_points(&array![[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]]).unwrap();
    /// assert_eq!(bounds.diagonal(), 5.0);
    /// ```
    #[must_use]
    pub fn of_points(points: &Array2<f64>) -> Option<Self> {
        if points.nrows() == 0 || points.ncols() != 3 {
            return None;
        }
        let mut min = Vector3::repeat(f64::INFINITY);
        let mut max = Vector3::repeat(f64::NEG_INFINITY);
        for row in points.rows() {
            let p = Vector3::new(row[0], row[1], row[2]);
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Some(Self { min, max })
    }

    /// Bounds as the `(xmin, xmax, ymin, ymax, zmin, zmax)` tuple renderers expect.
    #[must_use]
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64, f64) {
        (
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        )
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }
}

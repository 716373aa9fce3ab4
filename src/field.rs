//! Per-point field arrays and the vector-to-scalar reduction rule.

use ndarray::{Array1, Array2, ArrayView1, Axis};

/// A per-point field stored on a mesh.
///
/// Raw solver output is either one value per point or a small vector per point
/// (displacement components, stress invariants, packed node features). The two
/// layouts are kept distinct so that reduction to a colorable scalar is a single
/// exhaustive match.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldArray {
    /// One value per point, shape `(N,)`.
    Scalar(Array1<f64>),
    /// `k` components per point, shape `(N, k)`.
    Vector(Array2<f64>),
}

impl FieldArray {
    /// Number of rows (points) in the field.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            FieldArray::Scalar(values) => values.len(),
            FieldArray::Vector(values) => values.nrows(),
        }
    }

    /// Return `true` when the field holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of components per point; scalars report one.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            FieldArray::Scalar(_) => 1,
            FieldArray::Vector(values) => values.ncols(),
        }
    }

    /// Reduce the field to one value per point.
    ///
    /// Vectors with more than one component become their row-wise Euclidean
    /// norm, a single-column vector yields that column, and scalars pass
    /// through unchanged.
    ///
    /// # Examples
    /// ```
    /// use fea_compare::FieldArray;
    /// use ndarray::array;
    ///
    /// let field = FieldArray::Vector(array![[3.0, 4.0, 0.0], [0.0, 0.0, 2.0]]);
    /// assert_eq!(field.to_scalar(), array![5.0, 2.0]);
    /// ```
    #[must_use]
    pub fn to_scalar(&self) -> Array1<f64> {
        match self {
            FieldArray::Scalar(values) => values.clone(),
            FieldArray::Vector(values) if values.ncols() == 1 => values.column(0).to_owned(),
            FieldArray::Vector(values) => row_norms(values),
        }
    }

    /// Borrow a single component of a vector field.
    ///
    /// Returns `None` for scalar fields and for out-of-range columns.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        match self {
            FieldArray::Vector(values) if index < values.ncols() => Some(values.column(index)),
            _ => None,
        }
    }

    /// Keep only the rows listed in `rows`, in the given order.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> FieldArray {
        match self {
            FieldArray::Scalar(values) => FieldArray::Scalar(values.select(Axis(0), rows)),
            FieldArray::Vector(values) => FieldArray::Vector(values.select(Axis(0), rows)),
        }
    }
}

impl From<Array1<f64>> for FieldArray {
    fn from(values: Array1<f64>) -> Self {
        FieldArray::Scalar(values)
    }
}

impl From<Array2<f64>> for FieldArray {
    fn from(values: Array2<f64>) -> Self {
        FieldArray::Vector(values)
    }
}

/// Euclidean norm of every row of `values`.
#[must_use]
pub fn row_norms(values: &Array2<f64>) -> Array1<f64> {
    values.map_axis(Axis(1), |row| row.dot(&row).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn vector_reduces_to_row_norm() {
        let field = FieldArray::Vector(array![[1.0, 2.0, 2.0], [0.0, -3.0, 4.0]]);
        let scalar = field.to_scalar();
        assert_relative_eq!(scalar[0], 3.0);
        assert_relative_eq!(scalar[1], 5.0);
    }

    #[test]
    fn scalar_passes_through() {
        let values = array![1.5, -2.0, f64::NAN];
        let scalar = FieldArray::Scalar(values.clone()).to_scalar();
        assert_eq!(scalar.len(), 3);
        assert_eq!(scalar[0], values[0]);
        assert!(scalar[2].is_nan());
    }

    #[test]
    fn single_column_vector_is_flattened() {
        let field = FieldArray::Vector(array![[-1.0], [2.0]]);
        assert_eq!(field.to_scalar(), array![-1.0, 2.0]);
        assert_eq!(field.width(), 1);
    }

    #[test]
    fn column_access_is_bounds_checked() {
        let field = FieldArray::Vector(array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(field.column(1).map(|c| c.to_owned()), Some(array![2.0, 4.0]));
        assert!(field.column(2).is_none());
        assert!(FieldArray::Scalar(array![1.0]).column(0).is_none());
    }

    #[test]
    fn select_rows_keeps_requested_order() {
        let field = FieldArray::Scalar(array![10.0, 20.0, 30.0]);
        assert_eq!(
            field.select_rows(&[2, 0]),
            FieldArray::Scalar(array![30.0, 10.0])
        );
    }
}

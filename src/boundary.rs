//! Classification of mesh nodes into loaded and restrained sets.
//!
//! Boundary conditions travel in a packed per-node feature matrix: columns
//! `3..6` hold the applied load components and columns `6..9` the restraint
//! values of the three translational degrees of freedom. A restraint value of
//! zero means the degree of freedom is fixed.

use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use serde::Serialize;

use crate::errors::PostError;
use crate::field::FieldArray;
use crate::mesh::Mesh;

/// Point field holding the packed node feature matrix.
pub const NODE_FEATURES_FIELD: &str = "node_features";

/// Absolute tolerance below which a component counts as zero.
pub const ZERO_TOLERANCE: f64 = 1e-10;

/// Marker size as a fraction of the bounding-box diagonal.
const MARKER_FRACTION: f64 = 0.01;
/// Smallest marker size handed to the renderer.
const MIN_MARKER_SIZE: f64 = 2.0;

/// Minimum number of feature columns needed to classify nodes.
const REQUIRED_COLUMNS: usize = 9;

/// Loaded and restrained node coordinates.
///
/// The two sets are independent: a node may appear in both or in neither.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundarySets {
    /// Per-node flag: any load component is non-zero.
    pub is_load: Array1<bool>,
    /// Per-node flag: every restraint component is zero.
    pub is_fixed: Array1<bool>,
    /// Coordinates of the loaded nodes, shape `(L, 3)`.
    pub load_points: Array2<f64>,
    /// Coordinates of the restrained nodes, shape `(F, 3)`.
    pub fixed_points: Array2<f64>,
}

/// Boundary sets plus the renderer hint for marker size.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundaryOverlay {
    /// Classified nodes, or `None` when the mesh lacks usable boundary data.
    pub sets: Option<BoundarySets>,
    /// Suggested point-marker size.
    pub marker_size: f64,
}

/// Split nodes into loaded and restrained sets.
///
/// `points` and `features` are aligned by row.
///
/// # Errors
///
/// Returns [`PostError::InsufficientBoundaryData`] when `features` has fewer than
/// nine columns or a different number of rows than `points`.
///
/// # Examples
/// ```
/// use fea_compare::boundary::classify;
/// use ndarray::array;
///
/// let points = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
/// let features = array![
///     [0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
///     [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
/// ];
/// let sets = classify(&points, features.view()).unwrap();
/// assert_eq!(sets.load_points.nrows(), 1);
/// assert_eq!(sets.fixed_points.nrows(), 1);
/// ```
pub fn classify(
    points: &Array2<f64>,
    features: ArrayView2<'_, f64>,
) -> Result<BoundarySets, PostError> {
    if features.ncols() < REQUIRED_COLUMNS {
        return Err(PostError::InsufficientBoundaryData(format!(
            "node features have {} columns, need at least {REQUIRED_COLUMNS}",
            features.ncols()
        )));
    }
    if features.nrows() != points.nrows() {
        return Err(PostError::InsufficientBoundaryData(format!(
            "node features have {} rows but there are {} points",
            features.nrows(),
            points.nrows()
        )));
    }

    let loads = features.slice(s![.., 3..6]);
    let dofs = features.slice(s![.., 6..9]);
    let is_load = loads.map_axis(Axis(1), |row| row.iter().any(|&v| !is_zero(v)));
    let is_fixed = dofs.map_axis(Axis(1), |row| row.iter().all(|&v| is_zero(v)));

    let load_points = points.select(Axis(0), &selected(&is_load));
    let fixed_points = points.select(Axis(0), &selected(&is_fixed));

    log::info!(
        "boundary classification: {} loaded, {} fixed of {} nodes",
        load_points.nrows(),
        fixed_points.nrows(),
        points.nrows()
    );

    Ok(BoundarySets {
        is_load,
        is_fixed,
        load_points,
        fixed_points,
    })
}

/// Classify the nodes of a mesh from its [`NODE_FEATURES_FIELD`].
///
/// # Errors
///
/// Returns [`PostError::InsufficientBoundaryData`] when the field is absent, is
/// not a matrix, or is too narrow.
pub fn classify_mesh(mesh: &Mesh) -> Result<BoundarySets, PostError> {
    match mesh.field(NODE_FEATURES_FIELD) {
        Ok(FieldArray::Vector(features)) => classify(mesh.points(), features.view()),
        Ok(FieldArray::Scalar(_)) => Err(PostError::InsufficientBoundaryData(
            "node features are not a matrix".to_string(),
        )),
        Err(_) => Err(PostError::InsufficientBoundaryData(format!(
            "mesh has no `{NODE_FEATURES_FIELD}` field"
        ))),
    }
}

/// Build the boundary overlay for a mesh.
///
/// Missing or malformed boundary data yields an overlay with no sets rather than
/// an error, so the rest of the view can still be shown.
#[must_use]
pub fn overlay(mesh: &Mesh) -> BoundaryOverlay {
    let sets = match classify_mesh(mesh) {
        Ok(sets) => Some(sets),
        Err(err) => {
            log::warn!("{err}");
            None
        }
    };
    BoundaryOverlay {
        sets,
        marker_size: marker_size(mesh),
    }
}

/// Point-marker size: one percent of the bounding-box diagonal, never below two.
#[must_use]
pub fn marker_size(mesh: &Mesh) -> f64 {
    mesh.bounds()
        .map_or(MIN_MARKER_SIZE, |bounds| {
            (bounds.diagonal() * MARKER_FRACTION).max(MIN_MARKER_SIZE)
        })
}

/// Closeness to zero with the absolute tolerance; NaN is never close.
fn is_zero(value: f64) -> bool {
    value.abs() <= ZERO_TOLERANCE
}

/// Indices of the `true` entries of a mask.
fn selected(mask: &Array1<bool>) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(idx, &flag)| flag.then_some(idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn features(rows: &[[f64; 9]]) -> Array2<f64> {
        Array2::from_shape_vec((rows.len(), 9), rows.iter().flatten().copied().collect())
            .expect("rows are nine wide")
    }

    #[test]
    fn loaded_and_fixed_node_is_in_both_sets() {
        let points = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let feats = features(&[
            [0.0, 0.0, 0.0, 0.0, -10.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        ]);
        let sets = classify(&points, feats.view()).expect("nine columns");
        assert_eq!(sets.is_load, array![true, false]);
        assert_eq!(sets.is_fixed, array![true, false]);
        assert_eq!(sets.load_points, array![[0.0, 0.0, 0.0]]);
        assert_eq!(sets.fixed_points, array![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn partially_restrained_node_is_not_fixed() {
        let points = array![[0.0, 0.0, 0.0]];
        let feats = features(&[[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]]);
        let sets = classify(&points, feats.view()).expect("nine columns");
        assert_eq!(sets.is_fixed, array![false]);
        assert_eq!(sets.is_load, array![false]);
        assert_eq!(sets.fixed_points.nrows(), 0);
        assert_eq!(sets.load_points.nrows(), 0);
    }

    #[test]
    fn tolerance_is_absolute() {
        let points = array![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let feats = features(&[
            [0.0, 0.0, 0.0, 1e-11, 0.0, 0.0, 5e-11, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1e-9, 0.0, 0.0, 1e-9, 0.0, 0.0],
        ]);
        let sets = classify(&points, feats.view()).expect("nine columns");
        assert_eq!(sets.is_load, array![false, true]);
        assert_eq!(sets.is_fixed, array![true, false]);
    }

    #[test]
    fn nan_counts_as_non_zero() {
        let points = array![[0.0, 0.0, 0.0]];
        let feats = features(&[[0.0, 0.0, 0.0, f64::NAN, 0.0, 0.0, f64::NAN, 0.0, 0.0]]);
        let sets = classify(&points, feats.view()).expect("nine columns");
        assert_eq!(sets.is_load, array![true]);
        assert_eq!(sets.is_fixed, array![false]);
    }

    #[test]
    fn narrow_features_are_insufficient() {
        let points = array![[0.0, 0.0, 0.0]];
        let feats = Array2::<f64>::zeros((1, 6));
        let error = classify(&points, feats.view()).expect_err("six columns");
        assert!(matches!(error, PostError::InsufficientBoundaryData(_)));
    }

    #[test]
    fn misaligned_rows_are_insufficient() {
        let points = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let feats = Array2::<f64>::zeros((1, 9));
        let error = classify(&points, feats.view()).expect_err("one row for two points");
        assert!(matches!(error, PostError::InsufficientBoundaryData(_)));
    }

    #[test]
    fn mesh_without_features_yields_empty_overlay() {
        let mesh = Mesh::new(array![[0.0, 0.0, 0.0], [300.0, 400.0, 0.0]]).expect("valid mesh");
        assert!(matches!(
            classify_mesh(&mesh),
            Err(PostError::InsufficientBoundaryData(_))
        ));
        let overlay = overlay(&mesh);
        assert!(overlay.sets.is_none());
        assert_relative_eq!(overlay.marker_size, 5.0);
    }

    #[test]
    fn scalar_features_are_insufficient() {
        let mut mesh = Mesh::new(array![[0.0, 0.0, 0.0]]).expect("valid mesh");
        mesh.set_field(NODE_FEATURES_FIELD, array![1.0])
            .expect("field accepted");
        assert!(matches!(
            classify_mesh(&mesh),
            Err(PostError::InsufficientBoundaryData(_))
        ));
    }

    #[test]
    fn marker_size_has_a_floor() {
        let small = Mesh::new(array![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]).expect("valid mesh");
        assert_relative_eq!(marker_size(&small), 2.0);
        let empty = Mesh::new(Array2::zeros((0, 3))).expect("valid mesh");
        assert_relative_eq!(marker_size(&empty), 2.0);
    }
}

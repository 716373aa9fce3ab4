//! Error types produced while extracting, comparing or classifying result fields.

use thiserror::Error;

/// Error returned when a post-processing operation cannot produce a result.
///
/// None of these are fatal: each failure is local to a single observable,
/// metric or classification call so callers can fall back (for example to a
/// single-pane view) without aborting sibling computations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PostError {
    /// Returned when a named point field is absent from the mesh.
    #[error("mesh has no point field named `{0}`")]
    FieldNotFound(String),
    /// Returned when two arrays intended for comparison differ in length.
    #[error("shape mismatch: {left} vs {right}")]
    ShapeMismatch {
        /// Length of the left-hand array.
        left: usize,
        /// Length of the right-hand array.
        right: usize,
    },
    /// Returned when every compared value is NaN or infinite.
    #[error("no valid (finite) data to compare")]
    NoValidData,
    /// Returned when the node feature matrix is absent or too narrow to classify.
    #[error("boundary data insufficient: {0}")]
    InsufficientBoundaryData(String),
    /// Returned when no observable is registered under the requested key.
    #[error("unknown observable `{0}`")]
    UnknownObservable(String),
    /// Returned when no metric is registered under the requested key.
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),
    /// Returned when a field exists but does not have the layout an extractor needs.
    #[error("field `{name}` has an unexpected layout: {reason}")]
    InvalidField {
        /// Name of the offending field.
        name: String,
        /// Description of the layout problem.
        reason: String,
    },
    /// Returned when a field written to a mesh does not have one row per point.
    #[error("field `{name}` has {len} rows but the mesh has {points} points")]
    FieldLengthMismatch {
        /// Name of the rejected field.
        name: String,
        /// Number of rows in the rejected field.
        len: usize,
        /// Number of points in the mesh.
        points: usize,
    },
    /// Returned when a cell mask does not have one entry per cell.
    #[error("cell mask `{name}` has {len} entries but the mesh has {cells} cells")]
    CellMaskLengthMismatch {
        /// Name of the rejected mask.
        name: String,
        /// Number of entries in the rejected mask.
        len: usize,
        /// Number of cells in the mesh.
        cells: usize,
    },
    /// Returned when a two-sided comparison is requested with the dual view turned off.
    #[error("comparison needs the dual view enabled")]
    DualViewDisabled,
    /// Returned when the mesh carries no boolean cell component masks.
    #[error("mesh has no component masks")]
    NoComponentMasks,
    /// Returned when a component index is outside `1..=available`.
    #[error("invalid component index {index} (valid range is 1 to {available})")]
    InvalidComponent {
        /// Requested 1-based component index.
        index: usize,
        /// Number of available components.
        available: usize,
    },
}

/// Error returned when loading or validating a [`ViewerConfig`](crate::ViewerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the configuration file cannot be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Returned when the configuration is not valid JSON for the expected schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// Returned when the number of color levels is outside the supported range.
    #[error("n_colors must be between {min} and {max} (received {value})")]
    ColorLevels {
        /// Rejected number of levels.
        value: u32,
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },
}

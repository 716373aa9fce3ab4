#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod boundary;
mod color_range;
mod config;
mod errors;
mod field;
mod geometry;
mod mesh;
pub mod metric;
pub mod observable;
mod session;

pub use boundary::{classify, classify_mesh, BoundaryOverlay, BoundarySets};
pub use color_range::{unify, ColorRange};
pub use config::ViewerConfig;
pub use errors::{ConfigError, PostError};
pub use field::{row_norms, FieldArray};
pub use geometry::Bounds;
pub use mesh::Mesh;
pub use metric::MetricRegistry;
pub use observable::{ObservableRegistry, PlotPayload};
pub use session::{ComparisonSession, MetricReport, ViewPayload};

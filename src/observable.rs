//! Observables: scalar fields derived from raw solver output, and the registry
//! that maps result keys to their extractors.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array1;

use crate::errors::PostError;
use crate::field::FieldArray;
use crate::mesh::Mesh;

/// Key of the nodal displacement magnitude observable.
pub const DISPLACEMENT: &str = "displacement";
/// Key of the solver-reported Von Mises stress observable.
pub const MEASURED_STRESS: &str = "measured_stress";
/// Key of the model-predicted Von Mises stress observable.
pub const PREDICTED_STRESS: &str = "predicted_stress";

/// Point field holding nodal displacement vectors.
pub const DISPLACEMENT_FIELD: &str = "displacement";
/// Point field holding packed principal stress values; column 4 is Von Mises.
pub const STRESS_FIELD: &str = "stress";
/// Point field holding the predicted Von Mises stress.
pub const PREDICTED_STRESS_FIELD: &str = "von_mises_stress_pred";
/// Point field every plot extraction writes its derived scalar to.
pub const SOLUTION_FIELD: &str = "solution";

/// Column of [`STRESS_FIELD`] that carries the Von Mises equivalent stress.
const VON_MISES_COLUMN: usize = 4;

/// Signature of a plot extractor.
pub type PlotFn = dyn Fn(&Mesh) -> Result<PlotPayload, PostError> + Send + Sync;
/// Signature of a metric extractor.
pub type MetricFn = dyn Fn(&Mesh) -> Result<Array1<f64>, PostError> + Send + Sync;

/// A renderable result: a private mesh copy carrying the scalar to color by.
///
/// The payload owns its mesh, so writing derived fields never touches the base
/// mesh it was extracted from or a sibling payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotPayload {
    /// Private copy of the base mesh with the derived field written to it.
    mesh: Mesh,
    /// Name of the point field to color by.
    scalar_name: String,
    /// Display title for the pane and its legend.
    title: String,
}

impl PlotPayload {
    /// Bundle a mesh copy with the field to color by.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::FieldNotFound`] when `scalar_name` is not a field of `mesh`.
    pub fn new(
        mesh: Mesh,
        scalar_name: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, PostError> {
        let scalar_name = scalar_name.into();
        mesh.field(&scalar_name)?;
        Ok(Self {
            mesh,
            scalar_name,
            title: title.into(),
        })
    }

    /// The payload's private mesh.
    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Name of the field to color by.
    #[must_use]
    pub fn scalar_name(&self) -> &str {
        &self.scalar_name
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Values of the coloring field reduced to one per point.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::FieldNotFound`] if the field is missing from the mesh.
    pub fn scalars(&self) -> Result<Array1<f64>, PostError> {
        self.mesh.field(&self.scalar_name).map(FieldArray::to_scalar)
    }

    /// Split the payload into `(mesh, scalar_name, title)`.
    #[must_use]
    pub fn into_parts(self) -> (Mesh, String, String) {
        (self.mesh, self.scalar_name, self.title)
    }
}

/// A registered observable.
struct Observable {
    /// Display title.
    title: String,
    /// Produces a renderable payload.
    plot: Box<PlotFn>,
    /// Produces a flat array for metrics.
    metric: Box<MetricFn>,
}

/// Table of observables keyed by result identifier.
///
/// Registering an existing key replaces it, which is how callers override a
/// built-in extraction.
///
/// # Examples
/// ```
/// use fea_compare::{Mesh, ObservableRegistry};
/// use ndarray::array;
///
/// let registry = ObservableRegistry::default();
/// let mut mesh = Mesh::new(array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap();
/// mesh.set_field("displacement", array![[3.0, 4.0, 0.0], [0.0, 0.0, 0.0]]).unwrap();
///
/// let values = registry.extract_for_metrics("displacement", &mesh).unwrap();
/// assert_eq!(values, array![5.0, 0.0]);
/// assert!(!mesh.has_field("solution"));
/// ```
pub struct ObservableRegistry {
    /// Registered observables.
    entries: BTreeMap<String, Observable>,
}

impl fmt::Debug for ObservableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, entry)| (key, &entry.title)))
            .finish()
    }
}

impl Default for ObservableRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ObservableRegistry {
    /// Create a registry with no observables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Create a registry holding the displacement, measured stress and predicted
    /// stress observables.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            DISPLACEMENT,
            "Displacement (magnitude)",
            |mesh| {
                let values = displacement_magnitude(mesh)?;
                derive_plot(mesh, values, "dis_mag", "Displacement (magnitude)")
            },
            displacement_magnitude,
        );
        registry.register(
            MEASURED_STRESS,
            "Von Mises stress",
            |mesh| {
                let values = measured_von_mises(mesh)?;
                derive_plot(mesh, values, "von", "Von Mises stress")
            },
            measured_von_mises,
        );
        registry.register(
            PREDICTED_STRESS,
            "Predicted stress",
            |mesh| {
                let values = predicted_von_mises(mesh)?;
                derive_plot(mesh, values, "pred", "Predicted stress")
            },
            predicted_von_mises,
        );
        registry
    }

    /// Register an observable, replacing any existing entry with the same key.
    pub fn register<P, M>(
        &mut self,
        key: impl Into<String>,
        title: impl Into<String>,
        plot: P,
        metric: M,
    ) where
        P: Fn(&Mesh) -> Result<PlotPayload, PostError> + Send + Sync + 'static,
        M: Fn(&Mesh) -> Result<Array1<f64>, PostError> + Send + Sync + 'static,
    {
        let key = key.into();
        let observable = Observable {
            title: title.into(),
            plot: Box::new(plot),
            metric: Box::new(metric),
        };
        if self.entries.insert(key.clone(), observable).is_some() {
            log::debug!("observable `{key}` re-registered");
        }
    }

    /// Registered keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Return `true` when `key` is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Display title of an observable.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::UnknownObservable`] when `key` is not registered.
    pub fn title(&self, key: &str) -> Result<&str, PostError> {
        self.entry(key).map(|entry| entry.title.as_str())
    }

    /// Resolve a display label (or a key) to a registered key.
    ///
    /// Unknown labels fall back to [`DISPLACEMENT`].
    #[must_use]
    pub fn key_for_title<'a>(&'a self, label: &'a str) -> &'a str {
        if self.entries.contains_key(label) {
            return label;
        }
        self.entries
            .iter()
            .find(|(_, entry)| entry.title == label)
            .map_or(DISPLACEMENT, |(key, _)| key.as_str())
    }

    /// Produce the renderable payload for `key` from a copy of `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::UnknownObservable`] for unregistered keys and
    /// propagates any failure of the extractor, such as [`PostError::FieldNotFound`].
    pub fn extract_for_plot(&self, key: &str, mesh: &Mesh) -> Result<PlotPayload, PostError> {
        (self.entry(key)?.plot)(mesh)
    }

    /// Produce the one-value-per-point array for `key`, for use by metrics.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::UnknownObservable`] for unregistered keys,
    /// [`PostError::FieldLengthMismatch`] when the extractor does not return one
    /// value per point, and propagates any failure of the extractor.
    pub fn extract_for_metrics(&self, key: &str, mesh: &Mesh) -> Result<Array1<f64>, PostError> {
        let values = (self.entry(key)?.metric)(mesh)?;
        if values.len() != mesh.point_count() {
            return Err(PostError::FieldLengthMismatch {
                name: key.to_string(),
                len: values.len(),
                points: mesh.point_count(),
            });
        }
        Ok(values)
    }

    /// Look up an entry.
    fn entry(&self, key: &str) -> Result<&Observable, PostError> {
        self.entries
            .get(key)
            .ok_or_else(|| PostError::UnknownObservable(key.to_string()))
    }
}

/// Copy `base`, write `values` as both the solution field and `field_name`, and
/// wrap the copy as a payload.
///
/// # Errors
///
/// Returns [`PostError::FieldLengthMismatch`] when `values` does not have one entry per point.
pub fn derive_plot(
    base: &Mesh,
    values: Array1<f64>,
    field_name: &str,
    title: &str,
) -> Result<PlotPayload, PostError> {
    let mut mesh = base.clone();
    mesh.set_field(SOLUTION_FIELD, values.clone())?;
    mesh.set_field(field_name, values)?;
    PlotPayload::new(mesh, field_name, title)
}

/// Displacement magnitude per point.
fn displacement_magnitude(mesh: &Mesh) -> Result<Array1<f64>, PostError> {
    Ok(mesh.field(DISPLACEMENT_FIELD)?.to_scalar())
}

/// Von Mises stress read from the solver's packed stress field.
fn measured_von_mises(mesh: &Mesh) -> Result<Array1<f64>, PostError> {
    let stress = mesh.field(STRESS_FIELD)?;
    stress
        .column(VON_MISES_COLUMN)
        .map(|column| column.to_owned())
        .ok_or_else(|| PostError::InvalidField {
            name: STRESS_FIELD.to_string(),
            reason: format!(
                "expected at least {} columns, found {}",
                VON_MISES_COLUMN + 1,
                stress.width()
            ),
        })
}

/// Predicted Von Mises stress per point.
fn predicted_von_mises(mesh: &Mesh) -> Result<Array1<f64>, PostError> {
    Ok(mesh.field(PREDICTED_STRESS_FIELD)?.to_scalar())
}

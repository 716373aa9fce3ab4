//! Comparison metrics between two observables.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, Zip};

use crate::errors::PostError;

/// Key of the mean squared error metric.
pub const MSE: &str = "mse";
/// Key of the mean absolute error metric.
pub const MAE: &str = "mae";
/// Key of the root mean squared error metric.
pub const RMSE: &str = "rmse";

/// Signature of a metric: two equal-length arrays in, one discrepancy out.
pub type CompareFn = dyn Fn(&Array1<f64>, &Array1<f64>) -> Result<f64, PostError> + Send + Sync;

/// A registered metric.
struct Metric {
    /// Display title.
    title: String,
    /// The comparison itself.
    compare: Box<CompareFn>,
}

/// Table of comparison metrics keyed by identifier.
///
/// # Examples
/// ```
/// use fea_compare::MetricRegistry;
/// use ndarray::array;
///
/// let metrics = MetricRegistry::default();
/// let mse = metrics.compute("mse", &array![1.0, 2.0, f64::NAN], &array![1.0, 4.0, 0.0]).unwrap();
/// assert_eq!(mse, 2.0);
/// ```
pub struct MetricRegistry {
    /// Registered metrics.
    entries: BTreeMap<String, Metric>,
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, entry)| (key, &entry.title)))
            .finish()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl MetricRegistry {
    /// Create a registry with no metrics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Create a registry holding MSE, MAE and RMSE.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(MSE, "Mean Squared Error", mean_squared_error);
        registry.register(MAE, "Mean Absolute Error", mean_absolute_error);
        registry.register(RMSE, "Root Mean Squared Error", root_mean_squared_error);
        registry
    }

    /// Register a metric, replacing any existing entry with the same key.
    pub fn register<F>(&mut self, key: impl Into<String>, title: impl Into<String>, compare: F)
    where
        F: Fn(&Array1<f64>, &Array1<f64>) -> Result<f64, PostError> + Send + Sync + 'static,
    {
        let key = key.into();
        let metric = Metric {
            title: title.into(),
            compare: Box::new(compare),
        };
        if self.entries.insert(key.clone(), metric).is_some() {
            log::debug!("metric `{key}` re-registered");
        }
    }

    /// Registered keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Display title of a metric.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::UnknownMetric`] when `key` is not registered.
    pub fn title(&self, key: &str) -> Result<&str, PostError> {
        self.entry(key).map(|entry| entry.title.as_str())
    }

    /// Resolve a display label (or a key) to a registered key.
    ///
    /// Unknown labels fall back to [`MSE`].
    #[must_use]
    pub fn key_for_title<'a>(&'a self, label: &'a str) -> &'a str {
        if self.entries.contains_key(label) {
            return label;
        }
        self.entries
            .iter()
            .find(|(_, entry)| entry.title == label)
            .map_or(MSE, |(key, _)| key.as_str())
    }

    /// Compare `a` against `b` with the metric registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::UnknownMetric`] for unregistered keys,
    /// [`PostError::ShapeMismatch`] when the arrays differ in length, and
    /// propagates failures of the metric such as [`PostError::NoValidData`].
    pub fn compute(&self, key: &str, a: &Array1<f64>, b: &Array1<f64>) -> Result<f64, PostError> {
        let metric = self.entry(key)?;
        if a.len() != b.len() {
            return Err(PostError::ShapeMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        let value = (metric.compare)(a, b)?;
        log::debug!("{key} over {} points = {value}", a.len());
        Ok(value)
    }

    /// Look up an entry.
    fn entry(&self, key: &str) -> Result<&Metric, PostError> {
        self.entries
            .get(key)
            .ok_or_else(|| PostError::UnknownMetric(key.to_string()))
    }
}

/// Keep the positions where both `a` and `b` are finite.
///
/// # Errors
///
/// Returns [`PostError::ShapeMismatch`] when the inputs differ in length (before
/// or after filtering) and [`PostError::NoValidData`] when no position survives.
pub fn finite_pairs(
    a: &Array1<f64>,
    b: &Array1<f64>,
) -> Result<(Array1<f64>, Array1<f64>), PostError> {
    if a.len() != b.len() {
        return Err(PostError::ShapeMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let (kept_a, kept_b): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .unzip();
    if kept_a.is_empty() {
        return Err(PostError::NoValidData);
    }
    if kept_a.len() != kept_b.len() {
        return Err(PostError::ShapeMismatch {
            left: kept_a.len(),
            right: kept_b.len(),
        });
    }
    Ok((Array1::from(kept_a), Array1::from(kept_b)))
}

/// Mean of `(a - b)^2` over the positions where both are finite.
///
/// # Errors
///
/// See [`finite_pairs`].
pub fn mean_squared_error(a: &Array1<f64>, b: &Array1<f64>) -> Result<f64, PostError> {
    let (a, b) = finite_pairs(a, b)?;
    Ok(mean_of(&a, &b, |x, y| (x - y) * (x - y)))
}

/// Mean of `|a - b|` over the positions where both are finite.
///
/// # Errors
///
/// See [`finite_pairs`].
pub fn mean_absolute_error(a: &Array1<f64>, b: &Array1<f64>) -> Result<f64, PostError> {
    let (a, b) = finite_pairs(a, b)?;
    Ok(mean_of(&a, &b, |x, y| (x - y).abs()))
}

/// Square root of [`mean_squared_error`].
///
/// # Errors
///
/// See [`finite_pairs`].
pub fn root_mean_squared_error(a: &Array1<f64>, b: &Array1<f64>) -> Result<f64, PostError> {
    mean_squared_error(a, b).map(f64::sqrt)
}

/// Average of `f(a_i, b_i)` over non-empty, equal-length arrays.
fn mean_of(a: &Array1<f64>, b: &Array1<f64>, f: impl Fn(f64, f64) -> f64) -> f64 {
    let sum = Zip::from(a).and(b).fold(0.0, |acc, &x, &y| acc + f(x, y));
    sum / a.len() as f64
}

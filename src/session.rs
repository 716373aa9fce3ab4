//! A comparison session: two observables of one mesh, the metric between them,
//! and the payloads handed to the renderer.

use serde::Serialize;

use crate::boundary::{overlay, BoundaryOverlay};
use crate::color_range::{unify, ColorRange};
use crate::config::ViewerConfig;
use crate::errors::PostError;
use crate::mesh::Mesh;
use crate::metric::MetricRegistry;
use crate::observable::{ObservableRegistry, PlotPayload};

/// Outcome of comparing the left and right observables.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricReport {
    /// Key of the metric used.
    pub metric: String,
    /// Title of the metric used.
    pub title: String,
    /// Key of the left observable.
    pub left: String,
    /// Key of the right observable.
    pub right: String,
    /// Number of points compared (before non-finite filtering).
    pub points: usize,
    /// Metric value.
    pub value: f64,
}

impl MetricReport {
    /// Value with six decimals, as shown next to the metric selector.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{:.6}", self.value)
    }
}

/// Everything the renderer needs to draw a comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewPayload {
    /// Left pane.
    pub left: PlotPayload,
    /// Right pane, absent in single-pane mode or when its extraction failed.
    pub right: Option<PlotPayload>,
    /// Shared color range, or `None` to let each pane auto-range.
    pub color_range: Option<ColorRange>,
    /// Boundary-condition pane, when requested.
    pub boundary: Option<BoundaryOverlay>,
    /// Number of discrete color levels.
    pub n_colors: u32,
    /// Whether to draw cell edges.
    pub show_edges: bool,
}

impl ViewPayload {
    /// Number of panes the renderer lays out side by side.
    #[must_use]
    pub fn pane_count(&self) -> usize {
        1 + usize::from(self.right.is_some()) + usize::from(self.boundary.is_some())
    }
}

/// Binds registries and settings so a loaded mesh can be compared and viewed.
#[derive(Clone, Copy, Debug)]
pub struct ComparisonSession<'a> {
    /// Observable lookup.
    observables: &'a ObservableRegistry,
    /// Metric lookup.
    metrics: &'a MetricRegistry,
    /// Operator settings.
    config: &'a ViewerConfig,
}

impl<'a> ComparisonSession<'a> {
    /// Create a session over the given registries and settings.
    #[must_use]
    pub fn new(
        observables: &'a ObservableRegistry,
        metrics: &'a MetricRegistry,
        config: &'a ViewerConfig,
    ) -> Self {
        Self {
            observables,
            metrics,
            config,
        }
    }

    /// Key of the left observable after resolving display labels.
    #[must_use]
    pub fn left_key(&self) -> &'a str {
        let config: &'a ViewerConfig = self.config;
        self.observables.key_for_title(&config.left)
    }

    /// Key of the right observable after resolving display labels.
    #[must_use]
    pub fn right_key(&self) -> &'a str {
        let config: &'a ViewerConfig = self.config;
        self.observables.key_for_title(&config.right)
    }

    /// Key of the configured metric after resolving display labels.
    #[must_use]
    pub fn metric_key(&self) -> &'a str {
        let config: &'a ViewerConfig = self.config;
        self.metrics.key_for_title(&config.metric)
    }

    /// Compare the left and right observables of `mesh` with the configured metric.
    ///
    /// # Errors
    ///
    /// Returns [`PostError::DualViewDisabled`] in single-pane mode,
    /// [`PostError::FieldLengthMismatch`] when either side is not one value per
    /// point, and propagates extraction and metric failures.
    pub fn compute_metric(&self, mesh: &Mesh) -> Result<MetricReport, PostError> {
        if !self.config.dual {
            return Err(PostError::DualViewDisabled);
        }
        let (left, right, metric) = (self.left_key(), self.right_key(), self.metric_key());
        let a = self.observables.extract_for_metrics(left, mesh)?;
        // Both sides are one value per point, so their lengths agree.
        let b = self.observables.extract_for_metrics(right, mesh)?;

        let value = self.metrics.compute(metric, &a, &b)?;
        log::info!("{metric}({left}, {right}) = {value:.6}");
        Ok(MetricReport {
            metric: metric.to_string(),
            title: self.metrics.title(metric)?.to_string(),
            left: left.to_string(),
            right: right.to_string(),
            points: a.len(),
            value,
        })
    }

    /// Build the renderer payloads for `mesh`.
    ///
    /// A failing right-hand extraction degrades the view to a single pane.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the left-hand extraction.
    pub fn build_view(&self, mesh: &Mesh) -> Result<ViewPayload, PostError> {
        let left = self.observables.extract_for_plot(self.left_key(), mesh)?;

        let right = if self.config.dual {
            match self.observables.extract_for_plot(self.right_key(), mesh) {
                Ok(payload) => Some(payload),
                Err(err) => {
                    log::warn!("right pane unavailable, showing a single pane: {err}");
                    None
                }
            }
        } else {
            None
        };

        let color_range = match (&right, self.config.lock_color_range) {
            (Some(right), true) => unify(&left.scalars()?, &right.scalars()?),
            _ => None,
        };

        let boundary = self.config.show_boundary.then(|| overlay(mesh));

        Ok(ViewPayload {
            left,
            right,
            color_range,
            boundary,
            n_colors: self.config.n_colors,
            show_edges: self.config.show_edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::NODE_FEATURES_FIELD;
    use crate::observable::{
        derive_plot, DISPLACEMENT, MEASURED_STRESS, PREDICTED_STRESS, PREDICTED_STRESS_FIELD,
        STRESS_FIELD,
    };
    use approx::assert_relative_eq;
    use ndarray::{array, Array1, Array2};

    fn loaded_mesh() -> Mesh {
        let mut mesh = Mesh::new(array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .expect("valid mesh");
        mesh.set_field(
            STRESS_FIELD,
            array![
                [0.0, 0.0, 0.0, 0.0, 1.0],
                [0.0, 0.0, 0.0, 0.0, 2.0],
                [0.0, 0.0, 0.0, 0.0, 3.0]
            ],
        )
        .expect("field accepted");
        mesh.set_field(PREDICTED_STRESS_FIELD, array![1.0, 2.0, 5.0])
            .expect("field accepted");
        mesh
    }

    #[test]
    fn metric_compares_configured_sides() {
        let observables = ObservableRegistry::default();
        let metrics = MetricRegistry::default();
        let config = ViewerConfig::default();
        let session = ComparisonSession::new(&observables, &metrics, &config);

        let report = session.compute_metric(&loaded_mesh()).expect("both sides present");
        assert_eq!(report.left, MEASURED_STRESS);
        assert_eq!(report.right, PREDICTED_STRESS);
        assert_eq!(report.title, "Mean Squared Error");
        assert_relative_eq!(report.value, 4.0 / 3.0);
        assert_eq!(report.formatted(), "1.333333");
    }

    #[test]
    fn metric_needs_dual_view() {
        let observables = ObservableRegistry::default();
        let metrics = MetricRegistry::default();
        let config = ViewerConfig {
            dual: false,
            ..ViewerConfig::default()
        };
        let session = ComparisonSession::new(&observables, &metrics, &config);
        assert_eq!(
            session.compute_metric(&loaded_mesh()).expect_err("single pane"),
            PostError::DualViewDisabled
        );
    }

    #[test]
    fn ragged_side_is_refused_before_comparison() {
        let mut observables = ObservableRegistry::default();
        observables.register(
            "truncated",
            "Truncated stress",
            |mesh| {
                let values = Array1::from_elem(mesh.point_count(), 1.0);
                derive_plot(mesh, values, "truncated", "Truncated stress")
            },
            |mesh| Ok(Array1::from_elem(mesh.point_count() - 1, 1.0)),
        );
        let metrics = MetricRegistry::default();
        let config = ViewerConfig {
            right: "truncated".to_string(),
            ..ViewerConfig::default()
        };
        let session = ComparisonSession::new(&observables, &metrics, &config);
        assert_eq!(
            session.compute_metric(&loaded_mesh()).expect_err("lengths differ"),
            PostError::FieldLengthMismatch {
                name: "truncated".to_string(),
                len: 2,
                points: 3,
            }
        );
    }

    #[test]
    fn display_labels_resolve_to_keys() {
        let observables = ObservableRegistry::default();
        let metrics = MetricRegistry::default();
        let config = ViewerConfig {
            left: "Von Mises stress".to_string(),
            right: "Predicted stress".to_string(),
            metric: "Root Mean Squared Error".to_string(),
            ..ViewerConfig::default()
        };
        let session = ComparisonSession::new(&observables, &metrics, &config);
        assert_eq!(session.left_key(), MEASURED_STRESS);
        assert_eq!(session.right_key(), PREDICTED_STRESS);
        assert_eq!(session.metric_key(), "rmse");
    }

    #[test]
    fn view_falls_back_to_single_pane() {
        let observables = ObservableRegistry::default();
        let metrics = MetricRegistry::default();
        let config = ViewerConfig::default();
        let session = ComparisonSession::new(&observables, &metrics, &config);

        let mut mesh = Mesh::new(Array2::zeros((2, 3))).expect("valid mesh");
        mesh.set_field(STRESS_FIELD, Array2::<f64>::ones((2, 5)))
            .expect("field accepted");

        let view = session.build_view(&mesh).expect("left pane available");
        assert!(view.right.is_none());
        assert!(view.color_range.is_none());
        assert_eq!(view.pane_count(), 2);
        assert!(view.boundary.as_ref().is_some_and(|b| b.sets.is_none()));
    }

    #[test]
    fn view_shares_color_range_when_locked() {
        let observables = ObservableRegistry::default();
        let metrics = MetricRegistry::default();
        let config = ViewerConfig {
            show_boundary: false,
            ..ViewerConfig::default()
        };
        let session = ComparisonSession::new(&observables, &metrics, &config);
        let view = session.build_view(&loaded_mesh()).expect("both sides present");
        assert_eq!(view.color_range, Some(ColorRange { min: 1.0, max: 5.0 }));
        assert_eq!(view.pane_count(), 2);
        assert_eq!(view.left.title(), "Von Mises stress");
        assert_eq!(view.right.as_ref().map(PlotPayload::title), Some("Predicted stress"));
    }

    #[test]
    fn unlocked_view_has_no_shared_range() {
        let observables = ObservableRegistry::default();
        let metrics = MetricRegistry::default();
        let config = ViewerConfig {
            lock_color_range: false,
            ..ViewerConfig::default()
        };
        let session = ComparisonSession::new(&observables, &metrics, &config);
        let view = session.build_view(&loaded_mesh()).expect("both sides present");
        assert!(view.right.is_some());
        assert!(view.color_range.is_none());
    }

    #[test]
    fn missing_left_side_is_an_error() {
        let observables = ObservableRegistry::default();
        let metrics = MetricRegistry::default();
        let config = ViewerConfig {
            left: DISPLACEMENT.to_string(),
            ..ViewerConfig::default()
        };
        let session = ComparisonSession::new(&observables, &metrics, &config);
        assert!(matches!(
            session.build_view(&loaded_mesh()),
            Err(PostError::FieldNotFound(_))
        ));
    }

    #[test]
    fn boundary_pane_is_classified() {
        let observables = ObservableRegistry::default();
        let metrics = MetricRegistry::default();
        let config = ViewerConfig::default();
        let session = ComparisonSession::new(&observables, &metrics, &config);

        let mut mesh = loaded_mesh();
        let mut features = Array2::<f64>::ones((3, 9));
        features.row_mut(0).fill(0.0);
        mesh.set_field(NODE_FEATURES_FIELD, features)
            .expect("field accepted");

        let view = session.build_view(&mesh).expect("both sides present");
        assert_eq!(view.pane_count(), 3);
        let sets = view
            .boundary
            .and_then(|b| b.sets)
            .expect("nine feature columns");
        assert_eq!(sets.is_load, array![false, true, true]);
        assert_eq!(sets.is_fixed, array![true, false, false]);
    }

    #[test]
    fn custom_observable_is_compared() {
        let mut observables = ObservableRegistry::default();
        observables.register(
            "strain",
            "Strain",
            |mesh| derive_plot(mesh, Array1::zeros(mesh.point_count()), "strain", "Strain"),
            |mesh| Ok(Array1::zeros(mesh.point_count())),
        );
        let metrics = MetricRegistry::default();
        let config = ViewerConfig {
            left: "strain".to_string(),
            ..ViewerConfig::default()
        };
        let session = ComparisonSession::new(&observables, &metrics, &config);
        let report = session.compute_metric(&loaded_mesh()).expect("lengths agree");
        assert_eq!(report.left, "strain");
        assert_relative_eq!(report.value, (1.0 + 4.0 + 25.0) / 3.0);
    }
}

use fea_compare::{
    ComparisonSession, Mesh, MetricRegistry, MetricReport, ObservableRegistry, PostError,
    ViewerConfig,
};

/// What one pane of the view shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneSummary {
    /// Pane title.
    pub title: String,
    /// Smallest finite value in the pane.
    pub min: f64,
    /// Largest finite value in the pane.
    pub max: f64,
}

/// Summary of a comparison run over one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    /// Metric between the two sides, or the reason it is unavailable.
    pub metric: Result<MetricReport, PostError>,
    /// Left pane.
    pub left: PaneSummary,
    /// Right pane, when it could be built.
    pub right: Option<PaneSummary>,
    /// Shared color range as `(min, max)`.
    pub color_range: Option<(f64, f64)>,
    /// Loaded and fixed node counts, when boundary data is present.
    pub boundary: Option<(usize, usize)>,
    /// Marker size hint for the boundary pane.
    pub marker_size: Option<f64>,
    /// Number of panes laid out side by side.
    pub panes: usize,
}

/// Run the metric and build the view for `mesh` with the default registries.
///
/// A metric failure is kept in the summary; only a failure to build the left
/// pane aborts the run.
pub fn run_comparison(mesh: &Mesh, config: &ViewerConfig) -> Result<ComparisonSummary, PostError> {
    let observables = ObservableRegistry::default();
    let metrics = MetricRegistry::default();
    let session = ComparisonSession::new(&observables, &metrics, config);

    let metric = session.compute_metric(mesh);
    let view = session.build_view(mesh)?;

    let left = PaneSummary {
        title: view.left.title().to_string(),
        min: finite_extreme(&view.left.scalars()?, f64::min),
        max: finite_extreme(&view.left.scalars()?, f64::max),
    };
    let right = match &view.right {
        Some(payload) => {
            let values = payload.scalars()?;
            Some(PaneSummary {
                title: payload.title().to_string(),
                min: finite_extreme(&values, f64::min),
                max: finite_extreme(&values, f64::max),
            })
        }
        None => None,
    };
    let boundary = view
        .boundary
        .as_ref()
        .and_then(|overlay| overlay.sets.as_ref())
        .map(|sets| (sets.load_points.nrows(), sets.fixed_points.nrows()));

    Ok(ComparisonSummary {
        metric,
        left,
        right,
        color_range: view.color_range.map(|range| (range.min, range.max)),
        boundary,
        marker_size: view.boundary.as_ref().map(|overlay| overlay.marker_size),
        panes: view.pane_count(),
    })
}

/// Fold the finite values with `pick`, or NaN when there are none.
fn finite_extreme(values: &ndarray::Array1<f64>, pick: fn(f64, f64) -> f64) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .reduce(pick)
        .unwrap_or(f64::NAN)
}

use fea_compare::{Mesh, PostError};
use ndarray::{Array1, Array2};

/// Dimensions and loading of the demonstration plate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateProperties {
    /// Length along X in metres.
    pub length: f64,
    /// Height along Y in metres.
    pub height: f64,
    /// Nodes along X.
    pub nx: usize,
    /// Nodes along Y.
    pub ny: usize,
    /// Vertical load per tip node in newtons.
    pub tip_load: f64,
    /// Peak Von Mises stress at the clamped edge in pascals.
    pub root_stress: f64,
    /// Tip deflection in metres.
    pub tip_deflection: f64,
    /// Relative over-prediction of the surrogate model at the tip.
    pub model_bias: f64,
}

impl Default for PlateProperties {
    fn default() -> Self {
        Self {
            length: 2.0,
            height: 0.5,
            nx: 9,
            ny: 3,
            tip_load: -500.0,
            root_stress: 120.0e6,
            tip_deflection: -4.0e-3,
            model_bias: 0.05,
        }
    }
}

/// Build a cantilever plate clamped at `x = 0` and loaded at `x = length`,
/// with the point fields a result loader would attach.
///
/// The fields follow closed-form beam shapes rather than a solve: deflection
/// grows with `x^2`, the Von Mises stress falls linearly toward the tip, and
/// the predicted stress drifts away from it by up to `model_bias`.
///
/// Fails with [`PostError::InvalidField`] unless there are at least two nodes
/// along each axis.
pub fn build_cantilever_plate(properties: &PlateProperties) -> Result<Mesh, PostError> {
    let PlateProperties { nx, ny, .. } = *properties;
    if nx < 2 || ny < 2 {
        return Err(PostError::InvalidField {
            name: "points".to_string(),
            reason: format!("plate grid needs at least 2 x 2 nodes, got {nx} x {ny}"),
        });
    }
    let n = nx * ny;
    let mut points = Array2::<f64>::zeros((n, 3));
    let mut displacement = Array2::<f64>::zeros((n, 3));
    let mut stress = Array2::<f64>::zeros((n, 5));
    let mut predicted = Array1::<f64>::zeros(n);
    let mut features = Array2::<f64>::ones((n, 9));

    for j in 0..ny {
        for i in 0..nx {
            let idx = j * nx + i;
            let xi = i as f64 / (nx - 1) as f64;
            let x = xi * properties.length;
            let y = j as f64 / (ny - 1) as f64 * properties.height;
            points[[idx, 0]] = x;
            points[[idx, 1]] = y;

            displacement[[idx, 1]] = properties.tip_deflection * xi * xi;
            let von_mises = properties.root_stress * (1.0 - xi);
            stress[[idx, 0]] = von_mises;
            stress[[idx, 2]] = -0.3 * von_mises;
            stress[[idx, 4]] = von_mises;
            predicted[idx] = von_mises * (1.0 + properties.model_bias * xi);

            features[[idx, 0]] = x;
            features[[idx, 1]] = y;
            features[[idx, 2]] = 0.0;
            features[[idx, 3]] = 0.0;
            features[[idx, 4]] = if i == nx - 1 { properties.tip_load } else { 0.0 };
            features[[idx, 5]] = 0.0;
            if i == 0 {
                features[[idx, 6]] = 0.0;
                features[[idx, 7]] = 0.0;
                features[[idx, 8]] = 0.0;
            }
        }
    }

    let mut cells = Vec::new();
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let a = j * nx + i;
            cells.push(vec![a, a + 1, a + nx + 1, a + nx]);
        }
    }
    let half = (nx - 1) / 2;
    let root: Array1<bool> = (0..cells.len()).map(|c| c % (nx - 1) < half).collect();
    let tip = root.mapv(|in_root| !in_root);

    let mut mesh = Mesh::new(points)?.with_cells(cells)?;
    mesh.set_field("displacement", displacement)?;
    mesh.set_field("stress", stress)?;
    mesh.set_field("von_mises_stress_pred", predicted)?;
    mesh.set_field("node_features", features)?;
    mesh.set_cell_mask("root", root)?;
    mesh.set_cell_mask("tip", tip)?;
    Ok(mesh)
}

mod analysis;
mod conditions;
mod report;

use analysis::run_comparison;
use conditions::{build_cantilever_plate, PlateProperties};
use fea_compare::ViewerConfig;
use report::render_summary;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // An optional JSON file selects the panes, metric and display options;
    // without one the measured and predicted stress are compared.
    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::from_path(path)?,
        None => ViewerConfig::default(),
    };

    // Stand in for a loaded result file with a clamped plate carrying
    // displacement, stress, predicted stress and boundary features.
    let mesh = build_cantilever_plate(&PlateProperties::default())?;

    let summary = run_comparison(&mesh, &config)?;
    println!("{}", render_summary(&summary));

    Ok(())
}

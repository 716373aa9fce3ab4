use crate::analysis::{ComparisonSummary, PaneSummary};
use std::fmt::Write;

/// Render a textual summary of a comparison run.
///
/// One line per pane, then the metric and boundary counts, so a terminal user
/// sees what the renderer would have drawn.
#[must_use]
pub fn render_summary(summary: &ComparisonSummary) -> String {
    let mut output = String::new();

    writeln!(&mut output, "Comparison view ({} panes)", summary.panes)
        .expect("writing to string cannot fail");
    write_pane(&mut output, "Left", &summary.left);
    match &summary.right {
        Some(pane) => write_pane(&mut output, "Right", pane),
        None => output.push_str("Right: not available (single pane)\n"),
    }

    match summary.color_range {
        Some((min, max)) => writeln!(&mut output, "Shared color range: [{min:.4e}, {max:.4e}]")
            .expect("writing to string cannot fail"),
        None => output.push_str("Shared color range: none (each pane auto-ranges)\n"),
    }

    match &summary.metric {
        Ok(report) => writeln!(
            &mut output,
            "{} ({} vs {}): {}",
            report.title,
            report.left,
            report.right,
            report.formatted()
        )
        .expect("writing to string cannot fail"),
        Err(err) => writeln!(&mut output, "Metric: not available ({err})")
            .expect("writing to string cannot fail"),
    }

    match (summary.boundary, summary.marker_size) {
        (Some((loaded, fixed)), Some(size)) => writeln!(
            &mut output,
            "Boundary: {loaded} loaded nodes, {fixed} fixed nodes (marker size {size:.2})"
        )
        .expect("writing to string cannot fail"),
        (None, Some(_)) => output.push_str("Boundary: insufficient data\n"),
        _ => {}
    }

    output
}

/// Append one pane line.
fn write_pane(output: &mut String, side: &str, pane: &PaneSummary) {
    writeln!(
        output,
        "{side}: {} in [{:.4e}, {:.4e}]",
        pane.title, pane.min, pane.max
    )
    .expect("writing to string cannot fail");
}

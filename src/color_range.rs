//! Shared color range for side-by-side panes.

use ndarray::Array1;
use num::Float;
use serde::{Deserialize, Serialize};

/// Value interval mapped onto the color gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    /// Value mapped to the bottom of the gradient.
    pub min: f64,
    /// Value mapped to the top of the gradient.
    pub max: f64,
}

/// Compute one color range covering both observables.
///
/// NaN values are skipped on both sides, so an all-NaN side contributes
/// nothing. Returns `None` when neither side has a value, an extremum is
/// infinite, or the combined range has zero width; callers then let each pane
/// auto-range on its own.
///
/// # Examples
/// ```
/// use fea_compare::{unify, ColorRange};
/// use ndarray::array;
///
/// let range = unify(&array![1.0, 2.0, 3.0], &array![0.0, 5.0, 9.0]);
/// assert_eq!(range, Some(ColorRange { min: 0.0, max: 9.0 }));
/// assert_eq!(unify(&array![2.0, 2.0], &array![2.0]), None);
/// ```
#[must_use]
pub fn unify(a: &Array1<f64>, b: &Array1<f64>) -> Option<ColorRange> {
    let min = nan_min(a.iter().chain(b.iter()).copied())?;
    let max = nan_max(a.iter().chain(b.iter()).copied())?;
    if min.is_finite() && max.is_finite() && max > min {
        Some(ColorRange { min, max })
    } else {
        log::debug!("no shared color range for [{min}, {max}]");
        None
    }
}

/// Smallest non-NaN value, or `None` when every value is NaN.
fn nan_min<F: Float>(values: impl Iterator<Item = F>) -> Option<F> {
    values
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: F| m.min(v))))
}

/// Largest non-NaN value, or `None` when every value is NaN.
fn nan_max<F: Float>(values: impl Iterator<Item = F>) -> Option<F> {
    values
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: F| m.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn range_spans_both_inputs() {
        assert_eq!(
            unify(&array![1.0, 2.0, 3.0], &array![0.0, 5.0, 9.0]),
            Some(ColorRange { min: 0.0, max: 9.0 })
        );
    }

    #[test]
    fn nan_values_are_ignored() {
        assert_eq!(
            unify(&array![f64::NAN, 2.0], &array![-1.0, f64::NAN]),
            Some(ColorRange { min: -1.0, max: 2.0 })
        );
    }

    #[test]
    fn constant_inputs_have_no_range() {
        assert_eq!(unify(&array![4.0, 4.0], &array![4.0, 4.0, 4.0]), None);
    }

    #[test]
    fn degenerate_inputs_have_no_range() {
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(unify(&empty, &empty), None);
        assert_eq!(unify(&array![f64::NAN], &array![f64::NAN, f64::NAN]), None);
        assert_eq!(unify(&array![f64::INFINITY], &array![1.0, 2.0]), None);
    }

    #[test]
    fn side_without_values_defers_to_the_other() {
        assert_eq!(
            unify(&array![f64::NAN, f64::NAN], &array![1.0, 2.0]),
            Some(ColorRange { min: 1.0, max: 2.0 })
        );
        assert_eq!(
            unify(&array![3.0, 7.0], &Array1::<f64>::zeros(0)),
            Some(ColorRange { min: 3.0, max: 7.0 })
        );
    }

    #[test]
    fn nan_extrema_skip_nan() {
        assert_eq!(nan_min([3.0_f32, f32::NAN, -1.0].into_iter()), Some(-1.0));
        assert_eq!(nan_max([f64::NAN].into_iter()), None);
    }
}

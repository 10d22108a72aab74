//! Preference selection.
//!
//! The preference is written onto the diagonal of S and biases each item
//! toward becoming its own exemplar: raising it yields more clusters,
//! lowering it yields fewer.

use tracing::debug;

use crate::matrix::SquareMatrix;

/// Median of a slice; even lengths average the two middle values.
///
/// Returns `None` for an empty slice. Inputs are assumed finite.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Pick the preference: the explicit value if given, otherwise the median of
/// every entry of `s` as it currently stands (diagonal included).
pub fn select_preference(s: &SquareMatrix, explicit: Option<f64>) -> f64 {
    let preference = match explicit {
        Some(p) => p,
        None => median(s.as_slice()).unwrap_or(0.0),
    };
    debug!(preference, explicit = explicit.is_some(), "Preference selected");
    preference
}

/// Select the preference and write it onto the diagonal of `s`.
pub fn apply_preference(s: &mut SquareMatrix, explicit: Option<f64>) -> f64 {
    let preference = select_preference(s, explicit);
    s.fill_diagonal(preference);
    preference
}

//! Discrete-label to ramp-position mapping
//!
//! Categorical values are colored by their index in an ordered selection
//! list, not by a hash of the value. The same label gets a different color
//! when the selection is reordered.

use super::palettes;
use super::record::split_haplotree_path;

/// Ramp position for the `index`-th of `n` entries
///
/// A single entry sits at the middle of the ramp.
pub fn index_to_position(index: usize, n: usize) -> f64 {
    if n <= 1 {
        0.5
    } else {
        index as f64 / (n - 1) as f64
    }
}

/// Color a categorical value by its position in `ordered_values`
///
/// Absent values, empty selections and values not in the selection get
/// `default_color`.
pub fn categorical_color(
    value: Option<&str>,
    ordered_values: &[String],
    ramp: &str,
    default_color: &str,
) -> String {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return default_color.to_string(),
    };

    match ordered_values.iter().position(|s| s == value) {
        Some(index) => palettes::interpolate(ramp, index_to_position(index, ordered_values.len())),
        None => default_color.to_string(),
    }
}

/// Color a haplotree path by the first term (in term order) that matches a node
///
/// Matching is case-insensitive and exact against trimmed `>`-separated nodes.
pub fn token_match_color(
    path: Option<&str>,
    ordered_terms: &[String],
    ramp: &str,
    default_color: &str,
) -> String {
    match matching_term_index(path, ordered_terms) {
        Some(index) => palettes::interpolate(ramp, index_to_position(index, ordered_terms.len())),
        None => default_color.to_string(),
    }
}

/// Index of the first term matching any node of `path`
pub fn matching_term_index(path: Option<&str>, ordered_terms: &[String]) -> Option<usize> {
    let path = path.filter(|p| !p.trim().is_empty())?;
    if ordered_terms.is_empty() {
        return None;
    }

    let nodes = split_haplotree_path(path);
    ordered_terms.iter().position(|term| {
        let term = term.trim().to_lowercase();
        !term.is_empty() && nodes.iter().any(|node| *node == term)
    })
}

//! Scoring module - line clear points
//!
//! Points for clearing `n` lines in one lock are `100 * n^2`
//! (see [`LINE_SCORES`]), scaled by the mode's multiplier and truncated.

use crate::types::LINE_SCORES;

/// Base points for `lines` cleared at once, before any multiplier
pub fn base_points(lines: usize) -> u32 {
    match LINE_SCORES.get(lines) {
        Some(&points) => points,
        // Only reachable with a pre-filled board; keep the quadratic rule.
        None => 100u32.saturating_mul((lines * lines) as u32),
    }
}

/// Points awarded for one lock under `multiplier`
pub fn line_points(lines: usize, multiplier: f64) -> u32 {
    let scaled = f64::from(base_points(lines)) * multiplier;
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u32
    } else {
        0
    }
}

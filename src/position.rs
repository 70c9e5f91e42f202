//! Electrode position comparison.
//!
//! Positions are `[x, y, z]` in metres, head coordinate frame, exactly as
//! stored in `loc[0..3]` of a channel-info record. A NaN component means the
//! electrode was never digitised; such a position never matches anything.

/// 3-D electrode coordinate.
pub type Position = [f64; 3];

/// Default relative per-axis tolerance for [`positions_are_close`] (±1.5 %).
pub const POSITION_TOLERANCE: f64 = 0.015;

#[inline]
pub fn has_nan(pos: &Position) -> bool {
    pos.iter().any(|v| v.is_nan())
}

/// `true` when every axis of `candidate` lies within ±1.5 % of `reference`.
///
/// See [`positions_within`] for the band definition.
pub fn positions_are_close(reference: &Position, candidate: &Position) -> bool {
    positions_within(reference, candidate, POSITION_TOLERANCE)
}

/// Per-axis relative band check.
///
/// For a non-negative reference coordinate `r` the band is
/// `[r·(1−tol), r·(1+tol)]`; for a negative one it is `[r·(1+tol), r·(1−tol)]`,
/// i.e. the same absolute interval with its bounds swapped. A NaN anywhere in
/// `candidate` fails immediately. Stops at the first failing axis.
pub fn positions_within(reference: &Position, candidate: &Position, tol: f64) -> bool {
    if has_nan(candidate) {
        return false;
    }
    let (lo, hi) = (1.0 - tol, 1.0 + tol);
    reference.iter().zip(candidate.iter()).all(|(&r, &c)| {
        // Sign bit, so that -0.0 takes the negative branch.
        if r.is_sign_positive() {
            c <= r * hi && c >= r * lo
        } else {
            c >= r * hi && c <= r * lo
        }
    })
}

/// Euclidean distance between two positions, NaN when either is incomplete.
pub fn position_distance(reference: &Position, candidate: &Position) -> f64 {
    if has_nan(candidate) || has_nan(reference) {
        return f64::NAN;
    }
    reference
        .iter()
        .zip(candidate.iter())
        .map(|(r, c)| (c - r) * (c - r))
        .sum::<f64>()
        .sqrt()
}

//! Lane position arithmetic.
//!
//! A position is an `f64` that only has meaning inside one lane. Inserting a
//! task between two neighbors takes their midpoint, so a move touches one row
//! instead of renumbering the lane.
//!
//! Repeated inserts into the same gap halve it every time. After roughly fifty
//! halvings the midpoint rounds onto one of the neighbors and the gap is gone.
//! [`is_strictly_between`] lets callers notice that; the fix is an explicit
//! lane rebalance that reassigns positions in steps of [`REBALANCE_STRIDE`].

/// Position of the first task placed into an empty lane.
pub const SEED_POSITION: f64 = 1000.0;

/// Spacing used when a lane is rebalanced.
pub const REBALANCE_STRIDE: f64 = 1000.0;

/// Compute a position for a slot whose predecessor is `prev` and successor is
/// `next` (either may be missing at a lane edge).
pub fn position_between(prev: Option<f64>, next: Option<f64>) -> f64 {
    match (prev, next) {
        (None, None) => SEED_POSITION,
        (None, Some(next)) => next - 1.0,
        (Some(prev), None) => prev + 1.0,
        (Some(prev), Some(next)) => {
            let mid = (prev + next) / 2.0;
            // The sum overflows near f64::MAX; halving first keeps it finite.
            if mid.is_finite() {
                mid
            } else {
                prev / 2.0 + next / 2.0
            }
        }
    }
}

/// Whether `candidate` keeps the lane strictly ordered between its neighbors.
pub fn is_strictly_between(prev: Option<f64>, candidate: f64, next: Option<f64>) -> bool {
    prev.is_none_or(|p| p < candidate) && next.is_none_or(|n| candidate < n)
}

/// Evenly spaced positions for a lane of `len` tasks: stride, 2*stride, ...
pub fn rebalanced_positions(len: usize) -> impl Iterator<Item = f64> {
    (1..=len).map(|i| i as f64 * REBALANCE_STRIDE)
}

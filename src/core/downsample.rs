//! Purpose: Deterministic stride-based reduction of time-series arrays.
//! Exports: `plan`, `thin`.
//! Role: Bounds result payload sizes while preserving order and alignment.
//! Invariants: One stride is computed from the time-axis length and applied to
//! Invariants: every selected array, so index `i` stays aligned across arrays.
//! Invariants: Values are never reordered or interpolated; the caller maps a
//! Invariants: returned index back to the original as `i * stride`.

/// Compute the stride for reducing `len` samples toward `max_points`.
///
/// The stride is `len / max_points` (integer division). Returns `None` when the
/// sequence already fits or `max_points` is zero (an unset bound). A stride of
/// 1 (while `len < 2 * max_points`) keeps every element but still counts as a
/// triggered reduction, so callers report it.
pub fn plan(len: usize, max_points: usize) -> Option<usize> {
    if max_points == 0 || len <= max_points {
        return None;
    }
    Some(len / max_points)
}

/// Take every `stride`-th element starting at index 0, in original order.
///
/// Output length is `ceil(len / stride)`.
pub fn thin<T: Clone>(values: &[T], stride: usize) -> Vec<T> {
    values.iter().step_by(stride).cloned().collect()
}

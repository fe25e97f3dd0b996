//! Reconciliation of a time range with an auxiliary (inner) range.

/// Reconcile `(start, end)` with an auxiliary `(aux_start, aux_end)` range.
///
/// Both pairs are first put in order when both of their sides are present.
/// The returned start is `aux_start` clamped to `>= start` (or `start`
/// when there is no auxiliary start); the returned end is `aux_end` clamped
/// to `<= end` (or `end` when there is no auxiliary end). When both sides of
/// the result are present the end is raised to at least the start, so the
/// start takes priority.
///
/// ```
/// use tsidx_core::timeseries::bounds::reconcile_bounds;
///
/// assert_eq!(reconcile_bounds(Some(10), Some(20), Some(5), Some(30)), (Some(10), Some(20)));
/// assert_eq!(reconcile_bounds(None, Some(20), Some(12), None), (Some(12), Some(20)));
/// assert_eq!(reconcile_bounds(Some(10), Some(20), Some(25), Some(30)), (Some(25), Some(25)));
/// assert_eq!(reconcile_bounds::<i32>(None, None, None, None), (None, None));
/// ```
#[must_use]
pub fn reconcile_bounds<T: Ord + Copy>(
    start: Option<T>,
    end: Option<T>,
    aux_start: Option<T>,
    aux_end: Option<T>,
) -> (Option<T>, Option<T>) {
    let (start, end) = ordered(start, end);
    let (aux_start, aux_end) = ordered(aux_start, aux_end);

    let out_start = match (start, aux_start) {
        (Some(s), Some(a)) => Some(a.max(s)),
        (s, a) => a.or(s),
    };
    let out_end = match (end, aux_end) {
        (Some(e), Some(a)) => Some(a.min(e)),
        (e, a) => a.or(e),
    };
    let out_end = match (out_start, out_end) {
        (Some(s), Some(e)) => Some(e.max(s)),
        (_, e) => e,
    };
    (out_start, out_end)
}

fn ordered<T: Ord + Copy>(a: Option<T>, b: Option<T>) -> (Option<T>, Option<T>) {
    match (a, b) {
        (Some(x), Some(y)) if y < x => (Some(y), Some(x)),
        pair => pair,
    }
}

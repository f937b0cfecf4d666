use std::cmp::Ordering;

use tracing::trace;

/// Precision used by [`bisection_search`] when the caller passes a non-positive one.
pub const DEFAULT_PRECISION: f64 = 1e-13;

/// Binary search for `target` in an ascending slice.
///
/// Returns the index of an element equal to `target` if there is one, otherwise the index
/// at which `target` would have to be inserted to keep the slice sorted. An empty slice
/// gives 0.
pub fn bsearch<T: PartialOrd>(target: &T, sorted: &[T]) -> usize {
    bsearch_by(sorted, |probe| {
        probe.partial_cmp(target).unwrap_or(Ordering::Less)
    })
}

/// Like [`bsearch`], with a comparator that tells how a probe relates to the target.
pub fn bsearch_by<T, F>(sorted: &[T], cmp: F) -> usize
where
    F: FnMut(&T) -> Ordering,
{
    match sorted.binary_search_by(cmp) {
        Ok(index) | Err(index) => index,
    }
}

/// Find `x` in `[low, high]` where the increasing function `f` reaches `target`.
///
/// The search halves the bracket until `|f(x) - target| <= precision`, the bracket is no
/// wider than `precision`, or the midpoint can't be told apart from the bracket ends in
/// floating point. The last midpoint is returned.
pub fn bisection_search<F>(target: f64, low: f64, high: f64, precision: f64, mut f: F) -> f64
where
    F: FnMut(f64) -> f64,
{
    let precision = if precision > 0.0 {
        precision
    } else {
        DEFAULT_PRECISION
    };
    let mut low = low;
    let mut high = high;
    let mut mid = low + (high - low) / 2.0;
    let mut iterations = 0u32;
    while mid > low && mid < high {
        iterations += 1;
        let value = f(mid) - target;
        if value > precision {
            high = mid;
        } else if value < -precision {
            low = mid;
        } else {
            break;
        }
        if high - low <= precision {
            break;
        }
        mid = low + (high - low) / 2.0;
    }
    trace!(iterations, result = mid, "bisection search finished");
    mid
}

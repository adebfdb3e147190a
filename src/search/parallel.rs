//! Optional rayon fan-out for neighborhood evaluation.

use std::cmp::Ordering;

use rayon::prelude::*;

/// Maps `source` in order, on the rayon pool when `parallel` is set.
pub(crate) fn parallel_collect<T, F, R>(source: &[T], parallel: bool, map_op: F) -> Vec<R>
where
    T: Sync,
    F: Fn(&T) -> R + Sync + Send,
    R: Send,
{
    if parallel {
        source.par_iter().map(map_op).collect()
    } else {
        source.iter().map(map_op).collect()
    }
}

/// Smallest mapped value under `compare`, skipping `None`s.
///
/// `compare` must be a total order without ties between distinct items for
/// the parallel and sequential results to agree.
pub(crate) fn parallel_min<T, F, C, R>(source: &[T], parallel: bool, map_op: F, compare: C) -> Option<R>
where
    T: Sync,
    F: Fn(&T) -> Option<R> + Sync + Send,
    C: Fn(&R, &R) -> Ordering + Sync + Send,
    R: Send,
{
    if parallel {
        source.par_iter().filter_map(map_op).min_by(|a, b| compare(a, b))
    } else {
        source.iter().filter_map(map_op).min_by(|a, b| compare(a, b))
    }
}

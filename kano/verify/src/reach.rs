use kano_core::BitMatrix;
use tracing::{debug, instrument};

/// The number of bits an isolated pod's row may have set: only its own.
pub const ISOLATION_THRESHOLD: usize = 1;

/// Returns the pods that reach every pod (`want_reachable`) or that reach no pod but themselves.
pub fn reachability_check(matrix: &BitMatrix, want_reachable: bool) -> Vec<usize> {
    if want_reachable {
        all_reachable(matrix)
    } else {
        all_isolated(matrix)
    }
}

/// Returns the pods whose row is entirely set.
#[instrument(skip_all, fields(pods = matrix.rows()))]
pub fn all_reachable(matrix: &BitMatrix) -> Vec<usize> {
    let pods = matrix
        .iter()
        .enumerate()
        .filter(|(_, row)| row.is_full())
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    debug!(reachable = pods.len());
    pods
}

/// Returns the pods whose row has at most [`ISOLATION_THRESHOLD`] bits set.
pub fn all_isolated(matrix: &BitMatrix) -> Vec<usize> {
    at_most(matrix, ISOLATION_THRESHOLD)
}

/// Returns the pods whose row has at most `k` bits set.
#[instrument(skip(matrix), fields(pods = matrix.rows()))]
pub fn at_most(matrix: &BitMatrix, k: usize) -> Vec<usize> {
    let pods = matrix
        .iter()
        .enumerate()
        .filter(|(_, row)| row.count_ones() <= k)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    debug!(matched = pods.len());
    pods
}

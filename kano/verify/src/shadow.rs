use ahash::AHashSet as HashSet;
use kano_core::BitMatrix;
use tracing::{debug, instrument, trace};

/// Returns the ordered pairs `(j, k)` where policy `j` shadows policy `k`.
///
/// Only policies that select a common pod are compared, and each unordered pair is compared at
/// most once. Pairs are reported in the order they are first encountered, scanning pods and then
/// policies in ascending order; for each pair, `(j, k)` with `j < k` precedes `(k, j)`.
#[instrument(skip_all, fields(pods = pod_to_policy.rows(), policies = allowed.rows()))]
pub fn shadowed_policies(
    pod_to_policy: &BitMatrix,
    allowed: &BitMatrix,
    selected: &BitMatrix,
) -> Vec<(usize, usize)> {
    debug_assert_eq!(allowed.rows(), selected.rows());
    debug_assert_eq!(pod_to_policy.cols(), allowed.rows());

    let mut checked = HashSet::<(usize, usize)>::default();
    let mut pairs = Vec::new();
    for policies in pod_to_policy {
        let policies = policies.iter_ones().collect::<Vec<_>>();
        for (n, &j) in policies.iter().enumerate() {
            for &k in &policies[n + 1..] {
                if !checked.insert((j, k)) {
                    continue;
                }
                for (a, b) in [(j, k), (k, j)] {
                    if shadows(allowed, selected, a, b) {
                        trace!(shadowing = a, shadowed = b);
                        pairs.push((a, b));
                    }
                }
            }
        }
    }
    debug!(checked = checked.len(), shadowed = pairs.len());
    pairs
}

/// True if policy `j` allows and selects everything policy `k` does.
///
/// `allowed` and `selected` must have one row per policy, all of the same width, as produced by
/// [`kano_index::Reachability`]. Panics if `j` or `k` is not a policy index.
pub fn shadows(allowed: &BitMatrix, selected: &BitMatrix, j: usize, k: usize) -> bool {
    debug_assert_eq!(allowed.rows(), selected.rows(), "one row per policy");
    debug_assert_eq!(allowed.cols(), selected.cols(), "rows span the same pods");
    assert!(
        j < allowed.rows() && k < allowed.rows(),
        "policy index out of range: ({j}, {k}) for {} policies",
        allowed.rows()
    );
    allowed[j].is_superset(&allowed[k]) && selected[j].is_superset(&selected[k])
}

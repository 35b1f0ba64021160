use kano_core::{BitMatrix, Pod};
use kano_index::GroupIndex;
use tracing::{debug, instrument, trace};

/// Returns the pods whose reachability is confined to their own group.
///
/// A pod qualifies when its row, with the members of its group removed, is empty. Pods that
/// don't carry the group label are skipped.
#[instrument(skip_all, fields(key = %groups.key(), pods = pods.len()))]
pub fn group_cross_check(matrix: &BitMatrix, groups: &GroupIndex, pods: &[Pod]) -> Vec<usize> {
    debug_assert_eq!(matrix.rows(), pods.len());

    let mut confined = Vec::new();
    for (i, pod) in pods.iter().enumerate() {
        let Some(group) = groups.group_of(pod) else {
            trace!(%pod, "Pod has no group");
            continue;
        };

        let mut outside = matrix[i].clone();
        outside.difference_with(group);
        if outside.is_clear() {
            confined.push(i);
        }
    }
    debug!(confined = confined.len());
    confined
}

use crate::SelectorIndex;
use kano_core::{BitSet, Cluster, Labels, Namespace, Pod, Policy};
use tracing::{debug, trace};

/// A policy's footprint: the pods it governs and the peers it permits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub selected: BitSet,
    pub allowed: BitSet,
}

/// Resolves individual policies against a cluster's [`SelectorIndex`].
#[derive(Debug)]
pub struct Resolver<'c> {
    pods: &'c [Pod],
    namespaces: &'c [Namespace],
    index: &'c SelectorIndex,
}

// === impl Resolver ===

impl<'c> Resolver<'c> {
    pub fn new(cluster: &'c Cluster, index: &'c SelectorIndex) -> Self {
        debug_assert_eq!(cluster.pods().len(), index.pods());
        debug_assert_eq!(cluster.namespaces().len(), index.namespaces());
        Self {
            pods: cluster.pods(),
            namespaces: cluster.namespaces(),
            index,
        }
    }

    /// Resolves a policy's select-set and allow-set.
    ///
    /// Returns `None` when the policy's namespace contains no pods. Such a policy is void: it
    /// selects nothing and has no effect on reachability.
    pub fn resolve(&self, policy: &Policy) -> Option<Resolved> {
        let Some(ns_pods) = self.index.namespace_pods(policy.namespace()) else {
            debug!(%policy, "Namespace has no pods");
            return None;
        };

        let mut selected = ns_pods.clone();
        self.retain_matching_pods(&mut selected, policy.select_labels());

        let allowed = self.allowed(policy, ns_pods);
        trace!(
            %policy,
            selected = selected.count_ones(),
            allowed = allowed.count_ones(),
            "Resolved"
        );
        Some(Resolved { selected, allowed })
    }

    fn allowed(&self, policy: &Policy, ns_pods: &BitSet) -> BitSet {
        let mut allowed = if policy.is_deny_all() {
            BitSet::new(self.pods.len())
        } else if policy.allow_all() {
            BitSet::full(self.pods.len())
        } else if policy.allow_namespace_labels().is_empty() {
            // Without a namespace selector, peers are drawn from the policy's own namespace.
            ns_pods.clone()
        } else {
            let mut pods = BitSet::new(self.pods.len());
            let namespaces = self.matching_namespaces(policy.allow_namespace_labels());
            for i in namespaces.iter_ones() {
                match self.index.namespace_pods(self.namespaces[i].name()) {
                    Some(ns_pods) => pods.union_with(ns_pods),
                    None => trace!(ns = %self.namespaces[i].name(), "Namespace has no pods"),
                }
            }
            pods
        };

        // Pod labels narrow the peers on every path. For deny-all and allow-all policies this is
        // a no-op since the label map is empty or the set already is.
        self.retain_matching_pods(&mut allowed, policy.allow_labels());
        allowed
    }

    /// Narrows `set` to the pods carrying every label in `labels`, first by key presence and then
    /// by value.
    fn retain_matching_pods(&self, set: &mut BitSet, labels: &Labels) {
        for key in labels.keys() {
            match self.index.pods_with_key(key) {
                Some(pods) => set.intersect_with(pods),
                None => {
                    trace!(%key, "No pod carries label");
                    set.clear();
                    return;
                }
            }
        }

        let mismatched = BitSet::from_indices(
            set.width(),
            set.iter_ones()
                .filter(|&i| !matches(self.pods[i].labels(), labels)),
        );
        set.difference_with(&mismatched);
    }

    /// Returns the namespaces carrying every label in `labels`.
    ///
    /// Candidates are the union of the namespaces carrying any selector key; a candidate missing
    /// one of the keys is then rejected by the value check.
    fn matching_namespaces(&self, labels: &Labels) -> BitSet {
        let mut set = BitSet::new(self.namespaces.len());
        for key in labels.keys() {
            match self.index.namespaces_with_key(key) {
                Some(namespaces) => set.union_with(namespaces),
                None => {
                    trace!(%key, "No namespace carries label");
                    set.clear();
                    return set;
                }
            }
        }

        let mismatched = BitSet::from_indices(
            set.width(),
            set.iter_ones()
                .filter(|&i| !matches(self.namespaces[i].labels(), labels)),
        );
        set.difference_with(&mismatched);
        set
    }
}

/// True if `labels` carries each key of `selector` with the same value.
fn matches(labels: &Labels, selector: &Labels) -> bool {
    selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

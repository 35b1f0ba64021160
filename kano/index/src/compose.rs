use crate::{Resolved, Resolver, SelectorIndex};
use kano_core::{BitMatrix, BitSet, Cluster, Direction};
use tracing::{debug, info_span, instrument, trace};

/// Pairwise reachability between pods, along with the per-policy matrices the shadowing check
/// consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reachability {
    /// `egress[i][j]` is set when pod `i` may send to pod `j`.
    pub egress: BitMatrix,

    /// `ingress[i][j]` is set when pod `i` may receive from pod `j`. Always the transpose of
    /// `egress`.
    pub ingress: BitMatrix,

    /// `pod_to_policy[i][p]` is set when policy `p` selects pod `i`.
    pub pod_to_policy: BitMatrix,

    /// Row `p` is policy `p`'s allow-set. Void policies have an empty row.
    pub policy_allowed: BitMatrix,

    /// Row `p` is policy `p`'s select-set. Void policies have an empty row.
    pub policy_selected: BitMatrix,
}

/// Folds resolved policies, in input order, into directional reachability.
#[derive(Debug)]
pub struct Composer {
    egress: BitMatrix,
    ingress: BitMatrix,

    /// Pods selected by at least one policy so far.
    isolated: BitSet,

    pod_to_policy: BitMatrix,
    policy_allowed: BitMatrix,
    policy_selected: BitMatrix,
}

// === impl Reachability ===

impl Reachability {
    /// Computes reachability for every pair of pods in the cluster.
    #[instrument(skip_all, fields(pods = cluster.pods().len(), policies = cluster.policies().len()))]
    pub fn build(cluster: &Cluster) -> Self {
        let index = SelectorIndex::new(cluster.pods(), cluster.namespaces());
        let resolver = Resolver::new(cluster, &index);

        let mut composer = Composer::new(cluster.pods().len(), cluster.policies().len());
        for (p, policy) in cluster.policies().iter().enumerate() {
            let _span = info_span!("policy", index = p).entered();
            match resolver.resolve(policy) {
                Some(resolved) => composer.apply(p, policy.direction(), &resolved),
                None => debug!(%policy, "Skipping void policy"),
            }
        }

        let reach = composer.finish();
        debug!(
            isolated = reach.pod_to_policy.iter().filter(|r| !r.is_clear()).count(),
            "Composed"
        );
        reach
    }

    /// The number of pods.
    #[inline]
    pub fn pods(&self) -> usize {
        self.egress.rows()
    }

    /// The number of policies.
    #[inline]
    pub fn policies(&self) -> usize {
        self.policy_allowed.rows()
    }
}

// === impl Composer ===

impl Composer {
    pub fn new(pods: usize, policies: usize) -> Self {
        Self {
            egress: BitMatrix::full(pods, pods),
            ingress: BitMatrix::full(pods, pods),
            isolated: BitSet::new(pods),
            pod_to_policy: BitMatrix::new(pods, policies),
            policy_allowed: BitMatrix::new(policies, pods),
            policy_selected: BitMatrix::new(policies, pods),
        }
    }

    /// Folds in the resolution of the `p`th policy.
    ///
    /// The first time any policy selects a pod, the pod becomes isolated in *both* directions:
    /// each of its rows is reduced to itself before this policy's allow-set is added.
    pub fn apply(&mut self, p: usize, direction: Direction, resolved: &Resolved) {
        for i in resolved.selected.iter_ones() {
            self.pod_to_policy.set(i, p, true);

            if !self.isolated.contains(i) {
                trace!(pod = i, "Isolating");
                self.isolated.insert(i);
                for m in [&mut self.egress, &mut self.ingress] {
                    let row = m.row_mut(i);
                    row.clear();
                    row.insert(i);
                }
            }

            let row = match direction {
                Direction::Ingress => self.ingress.row_mut(i),
                Direction::Egress => self.egress.row_mut(i),
            };
            row.union_with(&resolved.allowed);
        }

        *self.policy_allowed.row_mut(p) = resolved.allowed.clone();
        *self.policy_selected.row_mut(p) = resolved.selected.clone();
    }

    /// Combines both sides: `i` may send to `j` only if `i`'s egress permits `j` and `j`'s
    /// ingress permits `i`.
    pub fn finish(self) -> Reachability {
        let Self {
            mut egress,
            mut ingress,
            pod_to_policy,
            policy_allowed,
            policy_selected,
            ..
        } = self;

        ingress.transpose();
        for i in 0..egress.rows() {
            egress.row_mut(i).intersect_with(ingress.row(i));
        }
        let ingress = egress.transposed();

        Reachability {
            egress,
            ingress,
            pod_to_policy,
            policy_allowed,
            policy_selected,
        }
    }
}

use ahash::AHashMap as HashMap;
use kano_core::{BitSet, Namespace, Pod};
use tracing::{debug, instrument};

/// Reverse indices from namespace names and label keys to the entities that carry them.
///
/// A key that no entity carries has no entry; callers must test for presence.
#[derive(Debug, Default)]
pub struct SelectorIndex {
    pods: usize,
    namespaces: usize,

    /// Pods by the name of their namespace. Every pod is in exactly one bucket.
    ns_to_pods: HashMap<String, BitSet>,

    /// Pods by label key, irrespective of value.
    key_to_pods: HashMap<String, BitSet>,

    /// Namespaces by label key, irrespective of value.
    ns_key_to_ns: HashMap<String, BitSet>,
}

// === impl SelectorIndex ===

impl SelectorIndex {
    #[instrument(skip_all, fields(pods = pods.len(), namespaces = namespaces.len()))]
    pub fn new(pods: &[Pod], namespaces: &[Namespace]) -> Self {
        let n = pods.len();
        let mut ns_to_pods = HashMap::<String, BitSet>::default();
        let mut key_to_pods = HashMap::<String, BitSet>::default();
        for (i, pod) in pods.iter().enumerate() {
            ns_to_pods
                .entry(pod.namespace().to_string())
                .or_insert_with(|| BitSet::new(n))
                .insert(i);
            for key in pod.labels().keys() {
                key_to_pods
                    .entry(key.to_string())
                    .or_insert_with(|| BitSet::new(n))
                    .insert(i);
            }
        }

        let m = namespaces.len();
        let mut ns_key_to_ns = HashMap::<String, BitSet>::default();
        for (i, ns) in namespaces.iter().enumerate() {
            for key in ns.labels().keys() {
                ns_key_to_ns
                    .entry(key.to_string())
                    .or_insert_with(|| BitSet::new(m))
                    .insert(i);
            }
        }

        debug!(
            populated_namespaces = ns_to_pods.len(),
            pod_keys = key_to_pods.len(),
            namespace_keys = ns_key_to_ns.len(),
            "Indexed selectors"
        );
        Self {
            pods: n,
            namespaces: m,
            ns_to_pods,
            key_to_pods,
            ns_key_to_ns,
        }
    }

    /// The number of pods indexed.
    #[inline]
    pub fn pods(&self) -> usize {
        self.pods
    }

    /// The number of namespaces indexed.
    #[inline]
    pub fn namespaces(&self) -> usize {
        self.namespaces
    }

    /// Returns the pods in the named namespace, or `None` if it has no pods.
    #[inline]
    pub fn namespace_pods(&self, ns: &str) -> Option<&BitSet> {
        self.ns_to_pods.get(ns)
    }

    /// Returns the pods carrying `key`, or `None` if no pod does.
    #[inline]
    pub fn pods_with_key(&self, key: &str) -> Option<&BitSet> {
        self.key_to_pods.get(key)
    }

    /// Returns the namespaces carrying `key`, or `None` if no namespace does.
    #[inline]
    pub fn namespaces_with_key(&self, key: &str) -> Option<&BitSet> {
        self.ns_key_to_ns.get(key)
    }
}

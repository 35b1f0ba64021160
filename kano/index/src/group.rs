use ahash::AHashMap as HashMap;
use kano_core::{BitSet, Pod};

/// Groups pods by the value of a single label key, e.g. a tenant or user label.
///
/// Pods that don't carry the key belong to no group.
#[derive(Debug)]
pub struct GroupIndex {
    key: String,
    groups: HashMap<String, BitSet>,
}

// === impl GroupIndex ===

impl GroupIndex {
    pub fn new(pods: &[Pod], key: impl Into<String>) -> Self {
        let key = key.into();
        let n = pods.len();
        let mut groups = HashMap::<String, BitSet>::default();
        for (i, pod) in pods.iter().enumerate() {
            if let Some(value) = pod.labels().get(&key) {
                groups
                    .entry(value.to_string())
                    .or_insert_with(|| BitSet::new(n))
                    .insert(i);
            }
        }
        Self { key, groups }
    }

    /// The label key pods are grouped by.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the pods whose group label has the given value.
    #[inline]
    pub fn group(&self, value: &str) -> Option<&BitSet> {
        self.groups.get(value)
    }

    /// Returns the pods sharing `pod`'s group, including `pod` itself.
    pub fn group_of(&self, pod: &Pod) -> Option<&BitSet> {
        pod.labels().get(&self.key).and_then(|v| self.group(v))
    }
}

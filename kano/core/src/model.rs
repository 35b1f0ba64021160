use crate::ModelError;
use ahash::AHashSet as HashSet;
use kano_api::{Labels, PolicyType};
use std::fmt;

/// The direction of traffic a policy governs, from the perspective of the selected pods.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Ingress,
    Egress,
}

/// A workload instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pod {
    name: Option<String>,
    namespace: String,
    labels: Labels,
}

/// A named grouping of pods, itself carrying labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
    name: String,
    labels: Labels,
}

/// A directional rule scoped to one namespace.
///
/// The policy governs the pods in `namespace` matching every select label (an empty selector
/// selects the whole namespace) and permits traffic with the peers described by its allow labels.
/// When both allow selectors are empty the policy allows all peers; see [`Policy::allow_all`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    name: Option<String>,
    namespace: String,
    direction: Direction,
    deny_all: bool,
    select_labels: Labels,
    allow_labels: Labels,
    allow_namespace_labels: Labels,
}

/// The complete, validated input to a single analysis run.
#[derive(Clone, Debug, Default)]
pub struct Cluster {
    pods: Vec<Pod>,
    namespaces: Vec<Namespace>,
    policies: Vec<Policy>,
}

// === impl Direction ===

impl From<PolicyType> for Direction {
    fn from(ty: PolicyType) -> Self {
        match ty {
            PolicyType::Ingress => Self::Ingress,
            PolicyType::Egress => Self::Egress,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => "ingress".fmt(f),
            Self::Egress => "egress".fmt(f),
        }
    }
}

// === impl Pod ===

impl Pod {
    pub fn new(namespace: impl Into<String>, labels: Labels) -> Self {
        Self {
            name: None,
            namespace: namespace.into(),
            labels,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}

impl fmt::Display for Pod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.as_deref() {
            Some(name) => write!(f, "{}/{}", self.namespace, name),
            None => write!(f, "{}{}", self.namespace, self.labels),
        }
    }
}

// === impl Namespace ===

impl Namespace {
    pub fn new(name: impl Into<String>, labels: Labels) -> Self {
        Self {
            name: name.into(),
            labels,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}

// === impl Policy ===

impl Policy {
    pub fn new(namespace: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: None,
            namespace: namespace.into(),
            direction,
            deny_all: false,
            select_labels: Labels::default(),
            allow_labels: Labels::default(),
            allow_namespace_labels: Labels::default(),
        }
    }

    pub fn ingress(namespace: impl Into<String>) -> Self {
        Self::new(namespace, Direction::Ingress)
    }

    pub fn egress(namespace: impl Into<String>) -> Self {
        Self::new(namespace, Direction::Egress)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn selecting(mut self, labels: Labels) -> Self {
        self.select_labels = labels;
        self
    }

    pub fn allowing(mut self, labels: Labels) -> Self {
        self.allow_labels = labels;
        self
    }

    pub fn allowing_namespaces(mut self, labels: Labels) -> Self {
        self.allow_namespace_labels = labels;
        self
    }

    /// Marks the policy as deny-all. Allow selectors are ignored for such a policy.
    pub fn denying_all(mut self) -> Self {
        self.deny_all = true;
        self
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn is_deny_all(&self) -> bool {
        self.deny_all
    }

    #[inline]
    pub fn select_labels(&self) -> &Labels {
        &self.select_labels
    }

    #[inline]
    pub fn allow_labels(&self) -> &Labels {
        &self.allow_labels
    }

    #[inline]
    pub fn allow_namespace_labels(&self) -> &Labels {
        &self.allow_namespace_labels
    }

    /// True iff the policy places no restriction on its peers.
    ///
    /// This is deliberately asymmetric with the select side, where an empty selector means "every
    /// pod in the policy's namespace" rather than "every pod".
    pub fn allow_all(&self) -> bool {
        !self.deny_all && self.allow_labels.is_empty() && self.allow_namespace_labels.is_empty()
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.as_deref() {
            Some(name) => write!(f, "{}/{} ({})", self.namespace, name, self.direction),
            None => write!(
                f,
                "{}{} ({})",
                self.namespace, self.select_labels, self.direction
            ),
        }
    }
}

// === impl Cluster ===

impl Cluster {
    /// Validates and takes ownership of a run's input.
    ///
    /// Namespace names must be non-empty and unique, and every pod and policy must name a
    /// namespace. A pod may reference a namespace that isn't declared; such a namespace simply
    /// carries no labels.
    pub fn new(
        pods: Vec<Pod>,
        namespaces: Vec<Namespace>,
        policies: Vec<Policy>,
    ) -> Result<Self, ModelError> {
        let mut names = HashSet::with_capacity(namespaces.len());
        for (index, ns) in namespaces.iter().enumerate() {
            if ns.name.is_empty() {
                return Err(ModelError::EmptyName {
                    kind: "namespace",
                    index,
                });
            }
            if !names.insert(ns.name.as_str()) {
                return Err(ModelError::DuplicateNamespace(ns.name.clone()));
            }
        }

        if let Some(index) = pods.iter().position(|p| p.namespace.is_empty()) {
            return Err(ModelError::EmptyName { kind: "pod", index });
        }
        if let Some(index) = policies.iter().position(|p| p.namespace.is_empty()) {
            return Err(ModelError::EmptyName {
                kind: "policy",
                index,
            });
        }

        Ok(Self {
            pods,
            namespaces,
            policies,
        })
    }

    #[inline]
    pub fn pods(&self) -> &[Pod] {
        &self.pods
    }

    #[inline]
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    #[inline]
    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }
}

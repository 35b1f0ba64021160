use crate::labels::Selector;
use serde::{Deserialize, Serialize};
use std::{fmt, num::NonZeroU16};

/// A namespaced network policy, shaped like `networking.k8s.io/v1` `NetworkPolicy`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicy {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NetworkPolicySpec,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicySpec {
    /// Selects the pods in the policy's namespace to which this policy applies. An empty selector
    /// selects all pods in the namespace.
    #[serde(default)]
    pub pod_selector: Selector,

    pub policy_types: Option<Vec<PolicyType>>,

    pub ingress: Option<Vec<Rule>>,

    pub egress: Option<Vec<Rule>>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum PolicyType {
    #[default]
    Ingress,
    Egress,
}

/// An ingress or egress rule. Ingress rules list their peers under `from` and egress rules under
/// `to`; both are accepted in either position.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default, alias = "to")]
    pub from: Vec<Peer>,

    #[serde(default)]
    pub ports: Vec<PolicyPort>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub pod_selector: Option<Selector>,
    pub namespace_selector: Option<Selector>,
    pub ip_block: Option<IpBlock>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpBlock {
    pub cidr: ipnet::IpNet,
    #[serde(default)]
    pub except: Vec<ipnet::IpNet>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyPort {
    pub protocol: Option<String>,
    pub port: Option<Port>,
    pub end_port: Option<u16>,
}

/// References a container port by name or number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Port {
    Number(NonZeroU16),
    Name(String),
}

// === impl NetworkPolicy ===

impl NetworkPolicy {
    /// Returns the directions this policy governs.
    ///
    /// When `policyTypes` is unset, a policy always governs ingress and additionally governs egress
    /// if it declares egress rules.
    pub fn policy_types(&self) -> Vec<PolicyType> {
        if let Some(types) = self.spec.policy_types.as_ref() {
            let mut seen = Vec::with_capacity(2);
            for ty in types {
                if !seen.contains(ty) {
                    seen.push(*ty);
                }
            }
            return seen;
        }

        let mut types = vec![PolicyType::Ingress];
        if self.spec.egress.is_some() {
            types.push(PolicyType::Egress);
        }
        types
    }

    pub fn rules(&self, ty: PolicyType) -> &[Rule] {
        match ty {
            PolicyType::Ingress => self.spec.ingress.as_deref().unwrap_or_default(),
            PolicyType::Egress => self.spec.egress.as_deref().unwrap_or_default(),
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => "Ingress".fmt(f),
            Self::Egress => "Egress".fmt(f),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Number(n) => fmt::Display::fmt(n, f),
            Port::Name(n) => fmt::Display::fmt(n, f),
        }
    }
}

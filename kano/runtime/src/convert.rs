//! Splits Kubernetes-shaped [`NetworkPolicy`] objects into flat [`Policy`] entities.
//!
//! A `NetworkPolicy` may govern both directions and list any number of rules, each with any
//! number of peers. The flat model has exactly one direction and one peer description per policy,
//! so every peer becomes its own policy. All policies produced for a direction share the network
//! policy's pod selector, so the union of their allow-sets is the set of peers the rules admit.

use kano_api::{
    labels::{Map, Operator},
    network_policy::Rule,
    Labels, NetworkPolicy, PolicyType, Selector,
};
use kano_core::{Direction, Policy};
use std::collections::btree_map::Entry;
use tracing::{debug, warn};

/// The namespace assumed for a policy whose metadata names none.
pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("{policy}: unsupported {operator:?} expression on label {key:?}; only `In` with a single value is supported")]
    UnsupportedExpression {
        policy: String,
        key: String,
        operator: Operator,
    },

    #[error("{policy}: selector requires label {key:?} to have two different values")]
    ConflictingLabel { policy: String, key: String },

    /// A peer selecting labeled pods in every namespace. Flat policies without namespace labels
    /// only allow pods in their own namespace, so the peer can't be represented.
    #[error("{policy}: peer selects pods by label in all namespaces; add namespace labels to the namespaceSelector")]
    PodsInAllNamespaces { policy: String },
}

/// Converts a network policy into one or more flat policies.
///
/// For each direction the policy governs:
/// - each peer of each rule becomes one policy allowing the peers it describes;
/// - a rule without peers becomes one policy allowing all peers;
/// - when no policy results (no rules, or only `ipBlock` peers), one deny-all policy isolates the
///   selected pods.
///
/// Ports are ignored.
pub fn network_policy(np: &NetworkPolicy) -> Result<Vec<Policy>, ConvertError> {
    let name = np.metadata.name.as_deref().unwrap_or("<unnamed>");
    let namespace = np
        .metadata
        .namespace
        .as_deref()
        .unwrap_or(DEFAULT_NAMESPACE);
    let select = selector_labels(name, &np.spec.pod_selector)?;

    let mut policies = Vec::new();
    for ty in np.policy_types() {
        let direction = Direction::from(ty);
        let base = Policy::new(namespace, direction).selecting(select.clone());

        let before = policies.len();
        for (r, rule) in np.rules(ty).iter().enumerate() {
            split_rule(name, ty, r, rule, &base, &mut policies)?;
        }

        if policies.len() == before {
            debug!(policy = %name, %direction, "No pod peers allowed");
            policies.push(base.named(format!("{name}/{direction}")).denying_all());
        }
    }
    Ok(policies)
}

fn split_rule(
    name: &str,
    ty: PolicyType,
    r: usize,
    rule: &Rule,
    base: &Policy,
    policies: &mut Vec<Policy>,
) -> Result<(), ConvertError> {
    let direction = Direction::from(ty);
    if !rule.ports.is_empty() {
        let ports = rule
            .ports
            .iter()
            .filter_map(|p| p.port.as_ref())
            .map(|p| p.to_string())
            .collect::<Vec<_>>();
        debug!(policy = %name, rule = r, ?ports, "Ignoring port restrictions");
    }

    if rule.from.is_empty() {
        policies.push(base.clone().named(format!("{name}/{direction}/{r}")));
        return Ok(());
    }

    for (p, peer) in rule.from.iter().enumerate() {
        if let Some(block) = peer.ip_block.as_ref() {
            warn!(policy = %name, rule = r, peer = p, cidr = %block.cidr, "Skipping ipBlock peer");
            continue;
        }

        let all_namespaces = peer
            .namespace_selector
            .as_ref()
            .is_some_and(Selector::is_empty);
        let pod_labels = peer
            .pod_selector
            .as_ref()
            .is_some_and(|sel| !sel.is_empty());
        if all_namespaces && pod_labels {
            return Err(ConvertError::PodsInAllNamespaces {
                policy: name.to_string(),
            });
        }

        let mut policy = base.clone().named(format!("{name}/{direction}/{r}/{p}"));
        if let Some(sel) = peer.pod_selector.as_ref() {
            policy = policy.allowing(selector_labels(name, sel)?);
        }
        if let Some(sel) = peer.namespace_selector.as_ref() {
            policy = policy.allowing_namespaces(selector_labels(name, sel)?);
        }
        policies.push(policy);
    }
    Ok(())
}

/// Flattens a selector into the equality labels it requires.
fn selector_labels(policy: &str, selector: &Selector) -> Result<Labels, ConvertError> {
    let mut labels = Map::new();
    let mut require = |key: &str, value: &str| match labels.entry(key.to_string()) {
        Entry::Vacant(e) => {
            e.insert(value.to_string());
            Ok(())
        }
        Entry::Occupied(e) if e.get() == value => Ok(()),
        Entry::Occupied(_) => Err(ConvertError::ConflictingLabel {
            policy: policy.to_string(),
            key: key.to_string(),
        }),
    };

    for (k, v) in selector.match_labels() {
        require(k.as_str(), v.as_str())?;
    }
    for expr in selector.match_expressions() {
        match (expr.operator, expr.values.len()) {
            (Operator::In, 1) => {
                if let Some(value) = expr.values.iter().next() {
                    require(expr.key.as_str(), value.as_str())?;
                }
            }
            (operator, _) => {
                return Err(ConvertError::UnsupportedExpression {
                    policy: policy.to_string(),
                    key: expr.key.clone(),
                    operator,
                })
            }
        }
    }
    Ok(labels.into())
}

use crate::{labels::Labels, network_policy::NetworkPolicy, PolicyType};
use serde::{Deserialize, Serialize};

/// Describes every workload, namespace, and policy to be analyzed in a single run.
///
/// Entities are identified by their position in these lists, so the order of
/// the manifest is significant.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManifest {
    #[serde(default)]
    pub namespaces: Vec<NamespaceManifest>,

    #[serde(default)]
    pub pods: Vec<PodManifest>,

    /// Policies already expressed in the flat select/allow model.
    #[serde(default)]
    pub policies: Vec<PolicyManifest>,

    /// Kubernetes-style policies. Each is split into one or more flat policies.
    #[serde(default)]
    pub network_policies: Vec<NetworkPolicy>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceManifest {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodManifest {
    pub name: Option<String>,
    pub namespace: String,
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyManifest {
    pub name: Option<String>,
    pub namespace: String,
    #[serde(default)]
    pub direction: PolicyType,
    #[serde(default)]
    pub deny_all: bool,
    #[serde(default)]
    pub select_labels: Labels,
    #[serde(default)]
    pub allow_labels: Labels,
    #[serde(default)]
    pub allow_namespace_labels: Labels,
}

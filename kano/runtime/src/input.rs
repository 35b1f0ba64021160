use crate::convert;
use ahash::AHashSet as HashSet;
use anyhow::{Context, Result};
use kano_api::{ClusterManifest, NamespaceManifest, PodManifest, PolicyManifest};
use kano_core::{Cluster, Namespace, Pod, Policy};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Reads a manifest from `path`. Files with a `.json` extension are parsed as JSON and anything
/// else as YAML.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<ClusterManifest> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let manifest = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?
    } else {
        serde_yaml::from_slice(&bytes)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?
    };
    Ok(manifest)
}

/// Builds the entity model from a manifest.
///
/// Entities keep their manifest order. Flat policies precede those split from network policies.
pub fn cluster(manifest: ClusterManifest) -> Result<Cluster> {
    let ClusterManifest {
        namespaces,
        pods,
        policies,
        network_policies,
    } = manifest;

    let declared = namespaces
        .iter()
        .map(|ns| ns.name.clone())
        .collect::<HashSet<_>>();
    for (i, pod) in pods.iter().enumerate() {
        if !declared.contains(&pod.namespace) {
            warn!(pod = i, ns = %pod.namespace, "Pod references an undeclared namespace");
        }
    }

    let namespaces = namespaces
        .into_iter()
        .map(|NamespaceManifest { name, labels }| Namespace::new(name, labels))
        .collect();
    let pods = pods.into_iter().map(pod).collect();

    let mut model = policies.into_iter().map(policy).collect::<Vec<_>>();
    for np in &network_policies {
        let split = convert::network_policy(np)?;
        debug!(
            name = np.metadata.name.as_deref().unwrap_or_default(),
            policies = split.len(),
            "Split network policy"
        );
        model.extend(split);
    }

    Cluster::new(pods, namespaces, model).context("invalid cluster manifest")
}

fn pod(
    PodManifest {
        name,
        namespace,
        labels,
    }: PodManifest,
) -> Pod {
    let pod = Pod::new(namespace, labels);
    match name {
        Some(name) => pod.named(name),
        None => pod,
    }
}

fn policy(manifest: PolicyManifest) -> Policy {
    let mut policy = Policy::new(manifest.namespace, manifest.direction.into())
        .selecting(manifest.select_labels)
        .allowing(manifest.allow_labels)
        .allowing_namespaces(manifest.allow_namespace_labels);
    if manifest.deny_all {
        policy = policy.denying_all();
    }
    if let Some(name) = manifest.name {
        policy = policy.named(name);
    }
    policy
}

use anyhow::{bail, Result};
use kano_core::{BitMatrix, Cluster};
use kano_index::{GroupIndex, Reachability};
use kano_verify::VerifyError;
use serde::Serialize;
use std::io;
use tracing::{info, instrument};

/// Selects the optional checks a [`Report`] includes.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    /// Label key identifying a pod's tenant. The tenant check is skipped when unset.
    pub group_key: Option<String>,

    /// Pods to report unreachable peers for.
    pub isolated_from: Vec<usize>,

    /// A pod whose ingress row has at most this many bits set is reported as isolated.
    pub isolation_threshold: usize,

    pub include_matrices: bool,
}

/// The results of every check over a single cluster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub pods: Vec<String>,
    pub policies: Vec<String>,

    /// Pods that every pod may reach.
    pub all_reachable: Vec<usize>,

    /// Pods that no other pod may reach.
    pub all_isolated: Vec<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_confined: Option<TenantReport>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub isolated_from: Vec<Isolation>,

    pub shadowed_policies: Vec<Shadow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrices: Option<Matrices>,
}

/// Pods whose reachability stays within their own tenant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TenantReport {
    pub key: String,
    pub pods: Vec<usize>,
}

/// The pods a given pod cannot send to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Isolation {
    pub pod: usize,
    pub unreachable: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Shadow {
    pub shadowing: usize,
    pub shadowed: usize,
}

/// Matrices rendered one row per string, e.g. `"1001"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Matrices {
    pub egress: Vec<String>,
    pub ingress: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

// === impl Report ===

impl Report {
    #[instrument(skip_all, fields(pods = cluster.pods().len(), policies = cluster.policies().len()))]
    pub fn generate(cluster: &Cluster, options: &ReportOptions) -> Result<Self, VerifyError> {
        let reach = Reachability::build(cluster);

        let all_reachable = kano_verify::all_reachable(&reach.ingress);
        let all_isolated = kano_verify::at_most(&reach.ingress, options.isolation_threshold);

        let tenant_confined = options.group_key.as_ref().map(|key| {
            let groups = GroupIndex::new(cluster.pods(), key.clone());
            TenantReport {
                key: key.clone(),
                pods: kano_verify::group_cross_check(&reach.ingress, &groups, cluster.pods()),
            }
        });

        let isolated_from = options
            .isolated_from
            .iter()
            .map(|&pod| {
                let unreachable = kano_verify::isolated_from(&reach.egress, pod)?;
                Ok(Isolation { pod, unreachable })
            })
            .collect::<Result<Vec<_>, VerifyError>>()?;

        let shadowed_policies = kano_verify::shadowed_policies(
            &reach.pod_to_policy,
            &reach.policy_allowed,
            &reach.policy_selected,
        )
        .into_iter()
        .map(|(shadowing, shadowed)| Shadow {
            shadowing,
            shadowed,
        })
        .collect::<Vec<_>>();

        info!(
            reachable = all_reachable.len(),
            isolated = all_isolated.len(),
            shadowed = shadowed_policies.len(),
            "Analyzed"
        );

        Ok(Self {
            pods: cluster.pods().iter().map(ToString::to_string).collect(),
            policies: cluster.policies().iter().map(ToString::to_string).collect(),
            all_reachable,
            all_isolated,
            tenant_confined,
            isolated_from,
            shadowed_policies,
            matrices: options.include_matrices.then(|| Matrices {
                egress: rows(&reach.egress),
                ingress: rows(&reach.ingress),
            }),
        })
    }

    pub fn write(&self, format: OutputFormat, mut w: impl io::Write) -> Result<()> {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut w, self)?;
                writeln!(w)?;
            }
            OutputFormat::Yaml => serde_yaml::to_writer(&mut w, self)?,
        }
        Ok(())
    }
}

fn rows(matrix: &BitMatrix) -> Vec<String> {
    matrix.iter().map(ToString::to_string).collect()
}

// === impl OutputFormat ===

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            _ => bail!("invalid output format: {s:?} (expected \"json\" or \"yaml\")"),
        }
    }
}

use crate::{input, LogFilter, LogFormat, OutputFormat, Report, ReportOptions};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[clap(name = "kano", about = "Verifies pod reachability under label-based network policies")]
pub struct Args {
    #[clap(long, default_value = "kano=info,warn", env = "KANO_LOG")]
    log_level: LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: LogFormat,

    /// Cluster manifest. Parsed as JSON if the file name ends in `.json`, or as YAML otherwise.
    #[clap(short, long, env = "KANO_CLUSTER")]
    file: PathBuf,

    /// Label key identifying each pod's tenant.
    ///
    /// When set, the report lists the pods that only exchange traffic with their own tenant.
    #[clap(long)]
    group_key: Option<String>,

    /// Reports the pods that the pod at this index cannot send to. May be repeated.
    #[clap(long)]
    isolated_from: Vec<usize>,

    /// A pod is isolated when at most this many pods, itself included, may reach it.
    #[clap(long, default_value = "1")]
    isolation_threshold: usize,

    /// Includes the final egress and ingress matrices in the report.
    #[clap(long)]
    include_matrices: bool,

    /// Report encoding: `json` or `yaml`.
    #[clap(long, default_value = "json")]
    output: OutputFormat,
}

impl Args {
    #[inline]
    pub fn parse_and_run() -> Result<()> {
        Self::parse().run()
    }

    pub fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            file,
            group_key,
            isolated_from,
            isolation_threshold,
            include_matrices,
            output,
        } = self;

        log_format.try_init(log_level)?;

        let manifest = input::load(&file)?;
        debug!(
            namespaces = manifest.namespaces.len(),
            pods = manifest.pods.len(),
            policies = manifest.policies.len(),
            network_policies = manifest.network_policies.len(),
            "Loaded manifest"
        );
        let cluster = input::cluster(manifest)?;
        info!(
            pods = cluster.pods().len(),
            namespaces = cluster.namespaces().len(),
            policies = cluster.policies().len(),
            "Analyzing"
        );

        let report = Report::generate(
            &cluster,
            &ReportOptions {
                group_key,
                isolated_from,
                isolation_threshold,
                include_matrices,
            },
        )?;
        report.write(output, std::io::stdout().lock())
    }
}

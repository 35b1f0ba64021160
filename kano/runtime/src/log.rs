use anyhow::{anyhow, bail, Result};
use tracing_subscriber::EnvFilter;

/// A validated `tracing-subscriber` filter directive, e.g. `kano=debug,warn`.
#[derive(Clone, Debug)]
pub struct LogFilter(String);

/// The encoding of log lines written to stderr.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

// === impl LogFilter ===

impl std::str::FromStr for LogFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        EnvFilter::try_new(s)?;
        Ok(Self(s.to_string()))
    }
}

// === impl LogFormat ===

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            _ => bail!("invalid log format: {s:?} (expected \"plain\" or \"json\")"),
        }
    }
}

impl LogFormat {
    /// Installs the global subscriber. Logs are written to stderr so that stdout carries only the
    /// report.
    pub fn try_init(self, filter: LogFilter) -> Result<()> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_new(&filter.0)?)
            .with_writer(std::io::stderr);
        match self {
            Self::Plain => builder.try_init(),
            Self::Json => builder.json().try_init(),
        }
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
    }
}

//! Command-line arguments shared by the `bsnmp-*` tools.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::Version;
use crate::client::{Backoff, ClientConfig, Retry};
use crate::config::AgentConfig;
use crate::table::{SmiVersion, TableLayout};

/// SNMP version for CLI argument parsing.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SnmpVersion {
    #[value(name = "1")]
    V1,
    #[default]
    #[value(name = "2c")]
    V2c,
}

impl From<SnmpVersion> for Version {
    fn from(v: SnmpVersion) -> Self {
        match v {
            SnmpVersion::V1 => Version::V1,
            SnmpVersion::V2c => Version::V2c,
        }
    }
}

/// Output format for CLI tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with type names.
    #[default]
    Human,
    /// JSON for scripting.
    Json,
    /// Tab-separated values.
    Raw,
}

/// Backoff between retries.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum BackoffStrategy {
    #[default]
    None,
    Fixed,
    Exponential,
}

/// Agent and request settings.
#[derive(Debug, Parser)]
pub struct CommonArgs {
    /// Agent host or host:port (default port 161).
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// SNMP version: 1 or 2c.
    #[arg(short = 'v', long = "snmp-version", default_value = "2c")]
    pub snmp_version: SnmpVersion,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = "public")]
    pub community: String,

    /// Per-attempt timeout in seconds.
    #[arg(short = 't', long = "timeout", default_value = "5")]
    pub timeout: f64,

    /// Retransmissions after a timeout.
    #[arg(short = 'r', long = "retries", default_value = "3")]
    pub retries: u32,

    /// Delay strategy between retries.
    #[arg(long = "backoff", default_value = "none")]
    pub backoff: BackoffStrategy,

    /// Retry delay in milliseconds (initial delay for exponential).
    #[arg(long = "backoff-delay", default_value = "1000")]
    pub backoff_delay: u64,

    /// Maximum retry delay in milliseconds (exponential only).
    #[arg(long = "backoff-max", default_value = "5000")]
    pub backoff_max: u64,
}

impl CommonArgs {
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(crate::config::DEFAULT_TIMEOUT)
    }

    pub fn retry_config(&self) -> Retry {
        let backoff = match self.backoff {
            BackoffStrategy::None => Backoff::None,
            BackoffStrategy::Fixed => Backoff::Fixed {
                delay: Duration::from_millis(self.backoff_delay),
            },
            BackoffStrategy::Exponential => Backoff::Exponential {
                initial: Duration::from_millis(self.backoff_delay),
                max: Duration::from_millis(self.backoff_max),
            },
        };
        Retry {
            max_attempts: self.retries,
            backoff,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            version: self.snmp_version.into(),
            community: self.community.clone().into(),
            timeout: self.timeout_duration(),
            retry: self.retry_config(),
        }
    }
}

/// Output and diagnostics.
#[derive(Debug, Parser)]
pub struct OutputArgs {
    /// Output format.
    #[arg(short = 'O', long = "output", default_value = "human")]
    pub format: OutputFormat,

    /// Print request and response details to stderr.
    #[arg(long)]
    pub verbose: bool,

    /// Print octet strings as hex even when printable.
    #[arg(short = 'x', long)]
    pub hex: bool,

    /// Report elapsed time.
    #[arg(long)]
    pub timing: bool,

    /// Debug logging to stderr.
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Trace logging to stderr (includes packet-level events).
    #[arg(long)]
    pub trace: bool,
}

impl OutputArgs {
    /// Install a stderr tracing subscriber.
    ///
    /// `RUST_LOG` wins over the flags when set.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let default = if self.trace {
            "basic_snmp=trace"
        } else if self.debug {
            "basic_snmp=debug"
        } else {
            "basic_snmp=warn"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(self.debug || self.trace)
            .try_init();
    }
}

/// Table shape, from flags or a JSON file.
#[derive(Debug, Parser)]
pub struct LayoutArgs {
    /// JSON file holding an AgentConfig; its layout and SMI version are used.
    #[arg(long = "config", value_name = "FILE", conflicts_with_all = ["keys", "first_column", "last_column"])]
    pub config: Option<PathBuf>,

    /// Number of index arcs at the end of each cell OID [default: taken
    /// from the first cell].
    #[arg(short = 'k', long = "keys")]
    pub keys: Option<usize>,

    /// First column number.
    #[arg(long = "first-column", default_value = "1")]
    pub first_column: u64,

    /// Last column number.
    #[arg(long = "last-column")]
    pub last_column: Option<u64>,

    /// Column holding RowStatus/EntryStatus.
    #[arg(long = "status-column")]
    pub status_column: Option<u64>,

    /// Read the status column as SMIv1 EntryStatus instead of RowStatus.
    #[arg(long = "smiv1")]
    pub smiv1: bool,
}

impl LayoutArgs {
    /// Build the layout, reading the config file if one was given.
    pub fn layout(&self) -> Result<TableLayout, String> {
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            let config: AgentConfig = serde_json::from_str(&text)
                .map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
            return config
                .table_layout()
                .map_err(|e| format!("invalid config {}: {}", path.display(), e));
        }

        let last = self
            .last_column
            .ok_or("--last-column is required without --config")?;

        let smi = if self.smiv1 {
            SmiVersion::V1
        } else {
            SmiVersion::V2
        };
        let mut layout = TableLayout::inferred_keys(self.first_column, last);
        layout.key_count = self.keys;
        layout.smi_version = smi;
        if let Some(column) = self.status_column {
            layout = layout.with_status_column(column, smi);
        }
        layout.validate().map_err(|e| e.to_string())?;
        Ok(layout)
    }
}

//! Plain configuration values.
//!
//! Nothing here touches the filesystem. With the `serde` feature enabled the
//! types derive `Serialize`/`Deserialize` so whoever persists settings can
//! load them in whatever format it likes.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;

use crate::client::Retry;
use crate::error::Result;
use crate::table::TableLayout;
use crate::version::Version;

/// Standard agent port.
pub const DEFAULT_AGENT_PORT: u16 = 161;
/// Standard trap listener port.
pub const DEFAULT_TRAP_PORT: u16 = 162;
/// Per-attempt timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by every request a [`Client`](crate::Client) makes.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Protocol version (default: V2c)
    pub version: Version,
    /// Community string (default: "public")
    pub community: Bytes,
    /// Time to wait for each attempt (default: 5s)
    pub timeout: Duration,
    /// Retransmissions after a timeout (default: 3, no backoff)
    pub retry: Retry,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: Version::V2c,
            community: Bytes::from_static(b"public"),
            timeout: DEFAULT_TIMEOUT,
            retry: Retry::default(),
        }
    }
}

/// Where the agent lives and what table to read from it.
///
/// ```
/// # #[cfg(feature = "serde")]
/// # {
/// use basic_snmp::config::AgentConfig;
///
/// let config: AgentConfig = serde_json::from_str(r#"{
///     "agent_address": "192.0.2.10",
///     "community": "private",
///     "layout": { "key_count": 1, "first_column": 1, "last_column": 5 }
/// }"#).unwrap();
///
/// assert_eq!(config.agent_port, 161);
/// assert_eq!(config.table_layout().unwrap().column_count(), 5);
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    /// Host name or IP address of the agent
    pub agent_address: String,
    pub agent_port: u16,
    pub trap_port: u16,
    pub community: String,
    pub version: Version,
    /// Table shape; its `smi_version` decides how the status column reads
    pub layout: TableLayout,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    pub retry: Retry,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_address: "127.0.0.1".into(),
            agent_port: DEFAULT_AGENT_PORT,
            trap_port: DEFAULT_TRAP_PORT,
            community: "public".into(),
            version: Version::V2c,
            layout: TableLayout::inferred_keys(1, 1),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            retry: Retry::default(),
        }
    }
}

impl AgentConfig {
    /// Client settings derived from this configuration.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            version: self.version,
            community: Bytes::copy_from_slice(self.community.as_bytes()),
            timeout: Duration::from_millis(self.timeout_ms),
            retry: self.retry.clone(),
        }
    }

    /// The configured table layout, once it has been checked.
    pub fn table_layout(&self) -> Result<TableLayout> {
        self.layout.validate()?;
        Ok(self.layout.clone())
    }

    /// Resolve the agent address and port.
    pub fn agent_socket_addr(&self) -> Result<SocketAddr> {
        crate::client::resolve_target(&self.host_port(self.agent_port))
    }

    /// Resolve the address traps from this agent are expected on.
    pub fn trap_socket_addr(&self) -> Result<SocketAddr> {
        crate::client::resolve_target(&self.host_port(self.trap_port))
    }

    fn host_port(&self, port: u16) -> String {
        if self.agent_address.contains(':') && !self.agent_address.starts_with('[') {
            format!("[{}]:{}", self.agent_address, port)
        } else {
            format!("{}:{}", self.agent_address, port)
        }
    }
}

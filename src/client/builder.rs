//! Builders for community-based clients.
//!
//! ```rust,no_run
//! # use basic_snmp::Client;
//! # use std::time::Duration;
//! # async fn example() -> basic_snmp::Result<()> {
//! let client = Client::v2c("192.0.2.1:161")
//!     .community(b"private")
//!     .timeout(Duration::from_secs(2))
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::config::DEFAULT_AGENT_PORT;
use crate::error::{Error, Result};
use crate::transport::{Transport, UdpTransport};
use crate::version::Version;

use super::{Client, ClientConfig, Retry};

/// Builder for v1 and v2c clients.
///
/// Created via [`Client::v1()`] or [`Client::v2c()`].
pub struct ClientBuilder {
    target: String,
    config: ClientConfig,
}

impl ClientBuilder {
    pub(crate) fn new(target: impl Into<String>, version: Version) -> Self {
        Self {
            target: target.into(),
            config: ClientConfig {
                version,
                ..ClientConfig::default()
            },
        }
    }

    /// Set the community string (default: `public`).
    pub fn community(mut self, community: &[u8]) -> Self {
        self.config.community = Bytes::copy_from_slice(community);
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: Retry) -> Self {
        self.config.retry = retry;
        self
    }

    /// Resolve the target and connect a UDP transport to it.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        Client::connect(&self.target, self.config).await
    }

    /// Build the client on a caller-supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Client<T> {
        Client::new(transport, self.config)
    }
}

/// Resolve `host:port`, adding port 161 when none is given.
pub(crate) fn resolve_target(target: &str) -> Result<SocketAddr> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_AGENT_PORT));
    }

    let resolved = if target.contains(':') {
        target.to_socket_addrs()
    } else {
        (target, DEFAULT_AGENT_PORT).to_socket_addrs()
    };

    resolved
        .map_err(|e| Error::Io {
            target: None,
            source: e,
        })?
        .next()
        .ok_or_else(|| Error::Io {
            target: None,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not resolve address",
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_resolve_default_port() {
        assert_eq!(
            resolve_target("127.0.0.1").unwrap(),
            "127.0.0.1:161".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_target("127.0.0.1:1161").unwrap(),
            "127.0.0.1:1161".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_target("::1").unwrap(),
            "[::1]:161".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_target("[::1]:16100").unwrap(),
            "[::1]:16100".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_builder_sets_config() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        let client = Client::v1("127.0.0.1")
            .community(b"private")
            .timeout(Duration::from_millis(250))
            .retry(Retry::none())
            .build(mock);

        let config = client.config();
        assert_eq!(config.version, Version::V1);
        assert_eq!(config.community.as_ref(), b"private");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.retry.max_attempts, 0);
    }
}

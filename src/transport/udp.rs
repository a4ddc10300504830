//! UDP transport with one connected socket per agent.

use super::{Transport, extract_request_id};
use crate::error::{Error, Result};
use crate::util::bind_udp_socket;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;

/// Largest datagram accepted by default.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 65535;

/// UDP transport bound to a single agent.
///
/// The socket is connected, so the kernel drops datagrams from any other
/// source.
///
/// ```rust,no_run
/// use basic_snmp::transport::UdpTransport;
///
/// # async fn example() -> basic_snmp::Result<()> {
/// let transport = UdpTransport::connect("192.0.2.1:161".parse().unwrap()).await?;
/// println!("bound to {}", basic_snmp::transport::Transport::local_addr(&transport));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpInner>,
}

struct UdpInner {
    socket: UdpSocket,
    target: SocketAddr,
    local_addr: SocketAddr,
    max_message_size: usize,
}

impl UdpTransport {
    /// Bind an ephemeral port of the matching address family and connect to `target`.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        Self::builder(target).build().await
    }

    /// Configure a transport for `target`.
    pub fn builder(target: SocketAddr) -> UdpTransportBuilder {
        UdpTransportBuilder {
            target,
            bind_addr: None,
            recv_buffer_size: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::Io {
            target: Some(self.inner.target),
            source,
        }
    }
}

/// Builder for [`UdpTransport`].
pub struct UdpTransportBuilder {
    target: SocketAddr,
    bind_addr: Option<SocketAddr>,
    recv_buffer_size: Option<usize>,
    max_message_size: usize,
}

impl UdpTransportBuilder {
    /// Local address to bind (default: unspecified address, port 0).
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Kernel receive buffer size. The kernel may cap it.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }

    /// Maximum accepted datagram size (default: 65535).
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Bind and connect the socket.
    pub async fn build(self) -> Result<UdpTransport> {
        let target = self.target;
        let bind_addr = self.bind_addr.unwrap_or_else(|| {
            if target.is_ipv6() {
                SocketAddr::from(([0u16; 8], 0))
            } else {
                SocketAddr::from(([0u8; 4], 0))
            }
        });

        let io = |source| Error::Io {
            target: Some(target),
            source,
        };
        let socket = bind_udp_socket(bind_addr, self.recv_buffer_size)
            .await
            .map_err(io)?;
        socket.connect(target).await.map_err(io)?;
        let local_addr = socket.local_addr().map_err(io)?;

        tracing::debug!(target: "basic_snmp::transport", { snmp.target = %target, snmp.local_addr = %local_addr }, "UDP transport connected");

        Ok(UdpTransport {
            inner: Arc::new(UdpInner {
                socket,
                target,
                local_addr,
                max_message_size: self.max_message_size,
            }),
        })
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(target: "basic_snmp::transport", { snmp.target = %self.inner.target, snmp.bytes = data.len() }, "UDP send");
        self.inner
            .socket
            .send(data)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let deadline = Instant::now() + timeout;
        let mut buf = vec![0u8; self.inner.max_message_size];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let received = tokio::time::timeout(remaining, self.inner.socket.recv(&mut buf)).await;
            let len = match received {
                Ok(Ok(len)) => len,
                Ok(Err(e)) => return Err(self.io_error(e)),
                Err(_) => {
                    tracing::trace!(target: "basic_snmp::transport", { snmp.target = %self.inner.target, snmp.request_id = request_id }, "UDP recv timeout");
                    return Err(Error::Timeout {
                        target: Some(self.inner.target),
                        elapsed: timeout,
                        request_id,
                        retries: 0,
                    });
                }
            };

            let data = Bytes::copy_from_slice(&buf[..len]);
            match extract_request_id(&data) {
                Some(id) if id == request_id => {
                    tracing::trace!(target: "basic_snmp::transport", { snmp.target = %self.inner.target, snmp.bytes = len }, "UDP recv complete");
                    return Ok((data, self.inner.target));
                }
                Some(id) => {
                    tracing::debug!(target: "basic_snmp::transport", { snmp.expected = request_id, snmp.request_id = id }, "discarding response for another request");
                }
                None => {
                    tracing::debug!(target: "basic_snmp::transport", { snmp.target = %self.inner.target, len }, "discarding malformed datagram");
                }
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.inner.target
    }

    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CommunityMessage;
    use crate::{Version, oid};

    async fn agent_socket() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_send_and_correlated_recv() {
        let agent = agent_socket().await;
        let transport = UdpTransport::connect(agent.local_addr().unwrap())
            .await
            .unwrap();

        let request = CommunityMessage::setup_get_request(
            Version::V2c,
            "public",
            42,
            &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)],
        )
        .encode()
        .unwrap();
        transport.send(&request).await.unwrap();

        let mut buf = [0u8; 1500];
        let (len, from) = agent.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], &request[..]);

        // A stale answer first, then the real one
        let stale = CommunityMessage::setup_get_request(
            Version::V2c,
            "public",
            41,
            &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)],
        )
        .encode()
        .unwrap();
        agent.send_to(&stale, from).await.unwrap();
        agent.send_to(&request, from).await.unwrap();

        let (data, source) = transport
            .recv(42, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(data, request);
        assert_eq!(source, agent.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_recv_timeout() {
        let agent = agent_socket().await;
        let transport = UdpTransport::connect(agent.local_addr().unwrap())
            .await
            .unwrap();

        let err = transport
            .recv(1, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { request_id: 1, .. }));
    }
}

//! Socket setup shared by the transports.

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Bind a non-blocking UDP socket and hand it to tokio.
///
/// IPv6 sockets are made dual-stack. `recv_buffer_size` is a request; the
/// kernel caps it at `net.core.rmem_max`.
pub(crate) async fn bind_udp_socket(
    addr: SocketAddr,
    recv_buffer_size: Option<usize>,
) -> io::Result<UdpSocket> {
    let domain = match addr {
        SocketAddr::V4(_) => Domain::IPV4,
        SocketAddr::V6(_) => Domain::IPV6,
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    if let Some(size) = recv_buffer_size
        && let Err(e) = socket.set_recv_buffer_size(size)
    {
        tracing::debug!(target: "basic_snmp::transport", { size, error = %e }, "receive buffer size not applied");
    }

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_v4() {
        let socket = bind_udp_socket("127.0.0.1:0".parse().unwrap(), None)
            .await
            .unwrap();
        let local = socket.local_addr().unwrap();
        assert!(local.is_ipv4());
        assert_ne!(local.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_with_buffer_size() {
        let socket = bind_udp_socket("127.0.0.1:0".parse().unwrap(), Some(256 * 1024))
            .await
            .unwrap();
        assert_ne!(socket.local_addr().unwrap().port(), 0);
    }
}

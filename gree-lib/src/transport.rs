use crate::constants::RECV_BUFFER_SIZE;
use crate::error::{GreeError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::timeout;
use tracing::debug;

/// One request datagram out, one reply datagram back.
///
/// Implementations do not retry. A reply that does not arrive within the
/// configured timeout is reported as [`GreeError::Timeout`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, request: &[u8]) -> Result<Bytes>;
}

/// UDP transport; opens a fresh ephemeral socket per exchange.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    host: String,
    port: u16,
    timeout: Duration,
}

impl UdpTransport {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    async fn resolve(&self) -> Result<SocketAddr> {
        lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| GreeError::AddressResolution(format!("{}:{}", self.host, self.port)))
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn exchange(&self, request: &[u8]) -> Result<Bytes> {
        let target = self.resolve().await?;
        let bind_addr: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(bind_addr).await?;

        let sent = socket.send_to(request, target).await?;
        debug!("Sent {} bytes to {}", sent, target);

        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];
        let (received, from) = timeout(self.timeout, socket.recv_from(&mut buffer)).await??;
        debug!("Received {} bytes from {}", received, from);

        Ok(Bytes::copy_from_slice(&buffer[..received]))
    }
}

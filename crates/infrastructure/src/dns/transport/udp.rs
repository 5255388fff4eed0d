//! UDP upstream exchange (RFC 1035 §4.2.1)
//!
//! Messages go out as-is, no framing. Responses above 4096 bytes are the
//! upstream's problem; a truncated reply is relayed truncated and the client
//! retries over TCP on its own.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use split_dns_domain::ProxyError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    server: SocketAddr,
}

impl UdpTransport {
    pub fn new(server: SocketAddr) -> Self {
        Self { server }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(&self, wire: &[u8], timeout: Duration) -> Result<TransportResponse, ProxyError> {
        let server = self.server.to_string();

        // Ephemeral port, connected so stray datagrams from other sources
        // are filtered by the kernel.
        let bind_addr: SocketAddr = if self.server.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };
        let socket = UdpSocket::bind(bind_addr).await.map_err(|e| {
            ProxyError::UpstreamConnect {
                server: server.clone(),
                reason: format!("failed to bind socket: {}", e),
            }
        })?;
        socket
            .connect(self.server)
            .await
            .map_err(|e| ProxyError::UpstreamConnect {
                server: server.clone(),
                reason: e.to_string(),
            })?;

        socket
            .send(wire)
            .await
            .map_err(|e| ProxyError::UpstreamExchange {
                server: server.clone(),
                reason: format!("failed to send query: {}", e),
            })?;

        let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let n = tokio::time::timeout(timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| ProxyError::UpstreamTimeout {
                server: server.clone(),
            })?
            .map_err(|e| ProxyError::UpstreamExchange {
                server: server.clone(),
                reason: format!("failed to receive response: {}", e),
            })?;
        buf.truncate(n);

        debug!(server = %self.server, bytes = n, "UDP exchange complete");

        Ok(TransportResponse {
            bytes: buf,
            transport: "UDP",
        })
    }

    fn name(&self) -> &'static str {
        "UDP"
    }
}

//! Client-facing response sinks.

use async_trait::async_trait;
use split_dns_application::ports::ResponseSink;
use split_dns_domain::ProxyError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::UdpSocket;

use crate::dns::transport::write_framed;

/// Answers a UDP query: one datagram per message, back to the source
/// address through the listener socket.
pub struct UdpResponseSink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpResponseSink {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

#[async_trait]
impl ResponseSink for UdpResponseSink {
    async fn send(&mut self, wire: &[u8]) -> Result<(), ProxyError> {
        self.socket
            .send_to(wire, self.peer)
            .await
            .map_err(|e| ProxyError::ClientWrite(e.to_string()))?;
        Ok(())
    }
}

/// Answers over the accepted TCP stream with RFC 1035 length framing.
/// Zone transfers call this once per relayed envelope.
pub struct TcpResponseSink {
    writer: OwnedWriteHalf,
}

impl TcpResponseSink {
    pub fn new(writer: OwnedWriteHalf) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl ResponseSink for TcpResponseSink {
    async fn send(&mut self, wire: &[u8]) -> Result<(), ProxyError> {
        write_framed(&mut self.writer, wire)
            .await
            .map_err(|e| ProxyError::ClientWrite(e.to_string()))
    }
}

//! TCP upstream exchange with RFC 1035 §4.2.2 two-byte length framing.
//!
//! Streams to the same upstream are pooled, a couple per host, so bursts of
//! TCP queries do not pay a connect round-trip each.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use dashmap::DashMap;
use split_dns_domain::ProxyError;
use std::io;
use std::net::SocketAddr;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;
const MAX_IDLE_PER_HOST: usize = 2;

static TCP_POOL: LazyLock<DashMap<SocketAddr, Vec<TcpStream>>> = LazyLock::new(DashMap::new);

pub struct TcpTransport {
    server: SocketAddr,
}

impl TcpTransport {
    pub fn new(server: SocketAddr) -> Self {
        Self { server }
    }

    fn take_pooled(&self) -> Option<TcpStream> {
        TCP_POOL.get_mut(&self.server)?.pop()
    }

    fn return_to_pool(&self, stream: TcpStream) {
        let mut entry = TCP_POOL.entry(self.server).or_default();
        if entry.len() < MAX_IDLE_PER_HOST {
            entry.push(stream);
        }
    }

    async fn connect_new(&self, timeout: Duration) -> Result<TcpStream, ProxyError> {
        let server = self.server.to_string();
        let stream = tokio::time::timeout(timeout, TcpStream::connect(self.server))
            .await
            .map_err(|_| ProxyError::UpstreamTimeout {
                server: server.clone(),
            })?
            .map_err(|e| ProxyError::UpstreamConnect {
                server: server.clone(),
                reason: e.to_string(),
            })?;
        stream
            .set_nodelay(true)
            .map_err(|e| ProxyError::UpstreamConnect {
                server,
                reason: format!("failed to set TCP_NODELAY: {}", e),
            })?;
        Ok(stream)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(&self, wire: &[u8], timeout: Duration) -> Result<TransportResponse, ProxyError> {
        let server = self.server.to_string();

        // A pooled stream may have been closed by the upstream while idle;
        // fall back to a fresh connection on the first write failure.
        let mut stream = match self.take_pooled() {
            Some(mut pooled) => {
                match tokio::time::timeout(timeout, write_framed(&mut pooled, wire)).await {
                    Ok(Ok(())) => pooled,
                    _ => {
                        let mut fresh = self.connect_new(timeout).await?;
                        tokio::time::timeout(timeout, write_framed(&mut fresh, wire))
                            .await
                            .map_err(|_| ProxyError::UpstreamTimeout {
                                server: server.clone(),
                            })?
                            .map_err(|e| ProxyError::UpstreamExchange {
                                server: server.clone(),
                                reason: format!("failed to send query: {}", e),
                            })?;
                        fresh
                    }
                }
            }
            None => {
                let mut fresh = self.connect_new(timeout).await?;
                tokio::time::timeout(timeout, write_framed(&mut fresh, wire))
                    .await
                    .map_err(|_| ProxyError::UpstreamTimeout {
                        server: server.clone(),
                    })?
                    .map_err(|e| ProxyError::UpstreamExchange {
                        server: server.clone(),
                        reason: format!("failed to send query: {}", e),
                    })?;
                fresh
            }
        };

        let response = tokio::time::timeout(timeout, read_framed(&mut stream))
            .await
            .map_err(|_| ProxyError::UpstreamTimeout {
                server: server.clone(),
            })?
            .map_err(|e| ProxyError::UpstreamExchange {
                server,
                reason: format!("failed to read response: {}", e),
            })?;

        debug!(server = %self.server, bytes = response.len(), "TCP exchange complete");

        self.return_to_pool(stream);

        Ok(TransportResponse {
            bytes: response,
            transport: "TCP",
        })
    }

    fn name(&self) -> &'static str {
        "TCP"
    }
}

/// Write one length-prefixed DNS message.
pub async fn write_framed<S>(stream: &mut S, wire: &[u8]) -> io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    if wire.len() > MAX_TCP_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("message too large: {} bytes", wire.len()),
        ));
    }
    let length = (wire.len() as u16).to_be_bytes();
    stream.write_all(&length).await?;
    stream.write_all(wire).await?;
    stream.flush().await
}

/// Read one length-prefixed DNS message.
pub async fn read_framed<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let length = u16::from_be_bytes(len_buf) as usize;
    let mut message = vec![0u8; length];
    stream.read_exact(&mut message).await?;
    Ok(message)
}

/// Read one length-prefixed message, or `None` if the peer closed the
/// connection before sending a length prefix.
pub async fn read_framed_or_eof<S>(stream: &mut S) -> io::Result<Option<Vec<u8>>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let length = u16::from_be_bytes(len_buf) as usize;
    let mut message = vec![0u8; length];
    stream.read_exact(&mut message).await?;
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_framed_round_trip() {
        let (mut client, mut server) = tokio::io::duplex(256);
        write_framed(&mut client, b"\x12\x34hello").await.unwrap();
        let frame = read_framed(&mut server).await.unwrap();
        assert_eq!(frame, b"\x12\x34hello");
    }

    #[tokio::test]
    async fn test_framed_preserves_boundaries() {
        let (mut client, mut server) = tokio::io::duplex(256);
        write_framed(&mut client, b"one").await.unwrap();
        write_framed(&mut client, b"second").await.unwrap();
        assert_eq!(read_framed(&mut server).await.unwrap(), b"one");
        assert_eq!(read_framed(&mut server).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_read_framed_or_eof_on_close() {
        let (client, mut server) = tokio::io::duplex(256);
        drop(client);
        assert!(read_framed_or_eof(&mut server).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_framed_or_eof_mid_frame_is_error() {
        let (mut client, mut server) = tokio::io::duplex(256);
        client.write_all(&[0, 10, 1, 2]).await.unwrap();
        drop(client);
        assert!(read_framed_or_eof(&mut server).await.is_err());
    }
}

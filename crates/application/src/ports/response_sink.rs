use async_trait::async_trait;
use split_dns_domain::ProxyError;

/// Write half of the client connection.
///
/// A sink delivers wire-format DNS messages back to the client: one
/// datagram per message on UDP, length-prefixed frames on TCP. Zone
/// transfers call `send` once per relayed envelope.
#[async_trait]
pub trait ResponseSink: Send {
    async fn send(&mut self, wire: &[u8]) -> Result<(), ProxyError>;
}

pub mod https;
pub mod tcp;
pub mod udp;

pub use https::HttpsTransport;
pub use tcp::{read_framed, read_framed_or_eof, write_framed, TcpTransport};
pub use udp::UdpTransport;

use async_trait::async_trait;
use split_dns_domain::ProxyError;
use std::time::Duration;

/// Raw bytes back from an upstream, tagged with the transport that served
/// the exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,
    pub transport: &'static str,
}

/// One upstream exchange: opaque wire payload out, opaque wire payload back.
///
/// The proxy relays the client's original bytes, so transports never build
/// or rewrite DNS messages.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(&self, wire: &[u8], timeout: Duration) -> Result<TransportResponse, ProxyError>;

    fn name(&self) -> &'static str;
}

use crate::ports::ResponseSink;
use crate::request::ProxyRequest;
use async_trait::async_trait;
use hickory_proto::op::Message;
use split_dns_domain::ProxyError;
use std::net::SocketAddr;

/// Reply from a classic upstream exchange.
#[derive(Debug, Clone)]
pub struct ExchangeReply {
    /// Raw upstream response bytes, relayed to the client unmodified.
    pub wire: Vec<u8>,
    /// Decoded copy, consumed by the passive log.
    pub message: Message,
}

/// Bookkeeping after a zone-transfer stream has been relayed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferStats {
    pub envelopes: usize,
    pub records: usize,
}

/// Upstream forwarding port with the three mutually exclusive modes.
///
/// Failure semantics are asymmetric on purpose: `exchange` and `transfer`
/// fail the query on any upstream error, while `resolve_via_https` omits
/// failed sub-lookups and still returns a reply.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Classic exchange against `addr`, using the same transport the query
    /// arrived on. The original query bytes go out unmodified.
    async fn exchange(
        &self,
        addr: SocketAddr,
        request: &ProxyRequest,
    ) -> Result<ExchangeReply, ProxyError>;

    /// Resolve through an RFC 8484 resolver and synthesize a reply.
    async fn resolve_via_https(
        &self,
        url: &str,
        request: &ProxyRequest,
    ) -> Result<Message, ProxyError>;

    /// Open a zone-transfer session against `addr` and relay the complete
    /// envelope stream to `sink` as-is.
    async fn transfer(
        &self,
        addr: SocketAddr,
        request: &ProxyRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<TransferStats, ProxyError>;
}

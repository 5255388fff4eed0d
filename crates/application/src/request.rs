use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use split_dns_domain::route_table::normalize_suffix;
use split_dns_domain::{InboundTransport, ProxyError};
use std::net::SocketAddr;

/// Per-request context, owned by the handling task for the lifetime of one
/// query. Carries both the decoded message and the original wire bytes so
/// classic forwards can relay the client's exact payload (ID included).
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub wire: Vec<u8>,
    pub message: Message,
    pub client: SocketAddr,
    pub transport: InboundTransport,
}

impl ProxyRequest {
    pub fn decode(
        wire: Vec<u8>,
        client: SocketAddr,
        transport: InboundTransport,
    ) -> Result<Self, ProxyError> {
        let message =
            Message::from_vec(&wire).map_err(|e| ProxyError::InvalidMessage(e.to_string()))?;
        Ok(Self {
            wire,
            message,
            client,
            transport,
        })
    }

    /// A query is a transfer iff any question asks for AXFR or IXFR.
    pub fn is_transfer(&self) -> bool {
        self.message
            .queries()
            .iter()
            .any(|q| matches!(q.query_type(), RecordType::AXFR | RecordType::IXFR))
    }

    /// First question's name, lower-cased with a trailing dot, ready for
    /// suffix lookup.
    pub fn query_name(&self) -> Option<String> {
        self.message
            .queries()
            .first()
            .map(|q| normalize_suffix(&q.name().to_utf8()))
    }
}

use super::doh::DohResolver;
use super::transfer::TransferSession;
use crate::dns::transport::{DnsTransport, TcpTransport, UdpTransport};
use async_trait::async_trait;
use hickory_proto::op::Message;
use split_dns_application::ports::{ExchangeReply, Forwarder, ResponseSink, TransferStats};
use split_dns_application::request::ProxyRequest;
use split_dns_domain::{InboundTransport, ProxyError};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Upstream forwarding adapter.
///
/// Classic exchanges reuse the inbound transport and relay bytes verbatim
/// (the client's message ID is preserved because the client's exact payload
/// goes out). Zone transfers and DoH delegate to their session modules.
pub struct ProxyForwarder {
    exchange_timeout: Duration,
    transfer_timeout: Duration,
}

impl ProxyForwarder {
    pub fn new(exchange_timeout: Duration, transfer_timeout: Duration) -> Self {
        Self {
            exchange_timeout,
            transfer_timeout,
        }
    }
}

impl Default for ProxyForwarder {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(60))
    }
}

#[async_trait]
impl Forwarder for ProxyForwarder {
    async fn exchange(
        &self,
        addr: SocketAddr,
        request: &ProxyRequest,
    ) -> Result<ExchangeReply, ProxyError> {
        let response = match request.transport {
            InboundTransport::Udp => {
                UdpTransport::new(addr)
                    .send(&request.wire, self.exchange_timeout)
                    .await?
            }
            InboundTransport::Tcp => {
                TcpTransport::new(addr)
                    .send(&request.wire, self.exchange_timeout)
                    .await?
            }
        };

        let message = Message::from_vec(&response.bytes).map_err(|e| {
            ProxyError::InvalidUpstreamResponse {
                server: addr.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!(
            server = %addr,
            transport = response.transport,
            answers = message.answers().len(),
            "Upstream exchange relayed"
        );

        Ok(ExchangeReply {
            wire: response.bytes,
            message,
        })
    }

    async fn resolve_via_https(
        &self,
        url: &str,
        request: &ProxyRequest,
    ) -> Result<Message, ProxyError> {
        DohResolver::resolve(url, request, self.exchange_timeout).await
    }

    async fn transfer(
        &self,
        addr: SocketAddr,
        request: &ProxyRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<TransferStats, ProxyError> {
        TransferSession::relay(addr, request, sink, self.transfer_timeout).await
    }
}

//! Zone-transfer relay.
//!
//! The upstream session is a plain TCP DNS stream: the client's query goes
//! out length-prefixed, then answer envelopes are read and relayed to the
//! client verbatim until the stream completes. Termination: the closing SOA
//! (second SOA overall), an IXFR up-to-date reply (single envelope with one
//! SOA answer), a non-NoError rcode, or the upstream closing the stream
//! after at least one envelope.

use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RecordType;
use split_dns_application::ports::{ResponseSink, TransferStats};
use split_dns_application::request::ProxyRequest;
use split_dns_domain::ProxyError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

use crate::dns::transport::{read_framed_or_eof, write_framed};

pub struct TransferSession;

impl TransferSession {
    pub async fn relay(
        addr: SocketAddr,
        request: &ProxyRequest,
        sink: &mut dyn ResponseSink,
        timeout: Duration,
    ) -> Result<TransferStats, ProxyError> {
        let server = addr.to_string();

        let mut stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ProxyError::UpstreamTimeout {
                server: server.clone(),
            })?
            .map_err(|e| ProxyError::UpstreamConnect {
                server: server.clone(),
                reason: e.to_string(),
            })?;

        tokio::time::timeout(timeout, write_framed(&mut stream, &request.wire))
            .await
            .map_err(|_| ProxyError::UpstreamTimeout {
                server: server.clone(),
            })?
            .map_err(|e| ProxyError::TransferFailed {
                server: server.clone(),
                reason: format!("failed to send query: {}", e),
            })?;

        let mut stats = TransferStats::default();
        let mut soa_seen = 0usize;
        loop {
            let envelope =
                match tokio::time::timeout(timeout, read_framed_or_eof(&mut stream)).await {
                    Err(_) => {
                        return Err(ProxyError::UpstreamTimeout { server });
                    }
                    Ok(Err(e)) => {
                        return Err(ProxyError::TransferFailed {
                            server,
                            reason: format!("failed reading envelope: {}", e),
                        });
                    }
                    Ok(Ok(None)) => {
                        if stats.envelopes == 0 {
                            return Err(ProxyError::TransferFailed {
                                server,
                                reason: "stream closed before any envelope".to_string(),
                            });
                        }
                        break;
                    }
                    Ok(Ok(Some(envelope))) => envelope,
                };

            let message = Message::from_vec(&envelope).map_err(|e| {
                ProxyError::InvalidUpstreamResponse {
                    server: server.clone(),
                    reason: e.to_string(),
                }
            })?;

            // Relay before inspecting: the stream reaches the client as-is.
            sink.send(&envelope).await?;
            let first = stats.envelopes == 0;
            stats.envelopes += 1;
            stats.records += message.answers().len();

            if message.response_code() != ResponseCode::NoError {
                break;
            }
            let soa_in_envelope = message
                .answers()
                .iter()
                .filter(|r| r.record_type() == RecordType::SOA)
                .count();
            if first && message.answers().len() == 1 && soa_in_envelope == 1 {
                // IXFR "already in sync" reply
                break;
            }
            soa_seen += soa_in_envelope;
            let ends_on_soa = message
                .answers()
                .last()
                .is_some_and(|r| r.record_type() == RecordType::SOA);
            if soa_seen >= 2 && ends_on_soa {
                break;
            }
        }

        debug!(
            server = %addr,
            envelopes = stats.envelopes,
            records = stats.records,
            "Transfer stream complete"
        );
        Ok(stats)
    }
}

//! DNS-over-HTTPS exchange (RFC 8484)
//!
//! Queries are POSTed as `application/dns-message`; the response body is the
//! raw wire-format reply.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use split_dns_domain::ProxyError;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP/2 client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

pub struct HttpsTransport {
    url: String,
}

impl HttpsTransport {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(&self, wire: &[u8], timeout: Duration) -> Result<TransportResponse, ProxyError> {
        let response = tokio::time::timeout(
            timeout,
            SHARED_CLIENT
                .post(&self.url)
                .header("Content-Type", DNS_MESSAGE_CONTENT_TYPE)
                .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
                .body(wire.to_vec())
                .send(),
        )
        .await
        .map_err(|_| ProxyError::UpstreamTimeout {
            server: self.url.clone(),
        })?
        .map_err(|e| ProxyError::UpstreamExchange {
            server: self.url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamExchange {
                server: self.url.clone(),
                reason: format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let body = tokio::time::timeout(timeout, response.bytes())
            .await
            .map_err(|_| ProxyError::UpstreamTimeout {
                server: self.url.clone(),
            })?
            .map_err(|e| ProxyError::UpstreamExchange {
                server: self.url.clone(),
                reason: format!("failed to read body: {}", e),
            })?;

        debug!(url = %self.url, bytes = body.len(), "DoH exchange complete");

        Ok(TransportResponse {
            bytes: body.to_vec(),
            transport: "HTTPS",
        })
    }

    fn name(&self) -> &'static str {
        "HTTPS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_transport_creation() {
        let transport = HttpsTransport::new("https://dns.google/dns-query".to_string());
        assert_eq!(transport.url, "https://dns.google/dns-query");
        assert_eq!(transport.name(), "HTTPS");
    }
}

//! DoH-backed resolution.
//!
//! HTTPS endpoints are not relayed to verbatim. The resolver issues one
//! independent sub-lookup per supported record kind and synthesizes a reply
//! from whatever resolved. A failed sub-lookup is warned about and its
//! records omitted; the client still receives a NoError reply, unlike the
//! classic path where any upstream failure fails the query.

use super::record_kind::RecordKind;
use crate::dns::transport::{DnsTransport, HttpsTransport};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, Record};
use split_dns_application::request::ProxyRequest;
use split_dns_application::response::encode;
use split_dns_domain::ProxyError;
use std::time::Duration;
use tracing::{debug, warn};

pub struct DohResolver;

impl DohResolver {
    pub async fn resolve(
        url: &str,
        request: &ProxyRequest,
        timeout: Duration,
    ) -> Result<Message, ProxyError> {
        let transport = HttpsTransport::new(url.to_string());
        Self::resolve_with(&transport, url, request, timeout).await
    }

    /// Resolution against any transport; the production path hands in the
    /// shared HTTPS client.
    pub async fn resolve_with<T: DnsTransport>(
        transport: &T,
        url: &str,
        request: &ProxyRequest,
        timeout: Duration,
    ) -> Result<Message, ProxyError> {
        let question = request
            .message
            .queries()
            .first()
            .ok_or(ProxyError::EmptyQuestion)?;
        let name = question.name().clone();

        let lookups = RecordKind::ALL.map(|kind| lookup(transport, url, &name, kind, timeout));
        let results = futures::future::join_all(lookups).await;

        let mut answers = Vec::new();
        for (kind, result) in RecordKind::ALL.iter().zip(results) {
            match result {
                Ok(records) => answers.extend(records),
                Err(e) => {
                    warn!(
                        url = %url,
                        kind = kind.label(),
                        error = %e,
                        "DoH sub-lookup failed, omitting its records"
                    );
                }
            }
        }

        debug!(url = %url, answers = answers.len(), "DoH resolution synthesized");
        Ok(synthesize(&request.message, answers))
    }
}

async fn lookup<T: DnsTransport>(
    transport: &T,
    url: &str,
    name: &Name,
    kind: RecordKind,
    timeout: Duration,
) -> Result<Vec<Record>, ProxyError> {
    let wire = build_sub_query(name, kind)?;
    let response = transport.send(&wire, timeout).await?;
    let message = Message::from_vec(&response.bytes).map_err(|e| {
        ProxyError::InvalidUpstreamResponse {
            server: url.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(message
        .answers()
        .iter()
        .filter(|record| kind.matches(record))
        .cloned()
        .collect())
}

fn build_sub_query(name: &Name, kind: RecordKind) -> Result<Vec<u8>, ProxyError> {
    let mut query = Query::new();
    query.set_name(name.clone());
    query.set_query_type(kind.query_type());
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    encode(&message)
}

/// The synthesized reply: authoritative, recursion-available cleared,
/// client's ID and question echoed, resolved records attached.
fn synthesize(request: &Message, answers: Vec<Record>) -> Message {
    let mut reply = Message::new(request.id(), MessageType::Response, request.op_code());
    reply.set_authoritative(true);
    reply.set_recursion_available(false);
    reply.set_recursion_desired(request.recursion_desired());
    reply.add_queries(request.queries().iter().cloned());
    reply.add_answers(answers);
    reply
}

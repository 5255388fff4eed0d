use crate::ports::{AnswerLog, Forwarder, ResponseSink};
use crate::request::ProxyRequest;
use crate::response::{encode, failure_response};
use crate::selector::BackendSelector;
use hickory_proto::op::Message;
use split_dns_domain::{Backend, PassiveRecord, ProxyError, RouteTable, TransferAcl};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-query dispatcher.
///
/// One pass through Validate → AccessCheck → Route → Select → Forward →
/// Respond, with answer logging after the response is on the wire. Route
/// table and allow-list are immutable and shared by reference; the only
/// mutable shared state on this path is the selector's randomness source.
pub struct HandleQueryUseCase {
    routes: Arc<RouteTable>,
    transfer_acl: Arc<TransferAcl>,
    default_backend: Option<Backend>,
    selector: Arc<dyn BackendSelector>,
    forwarder: Arc<dyn Forwarder>,
    answer_log: Arc<dyn AnswerLog>,
}

impl HandleQueryUseCase {
    pub fn new(
        routes: Arc<RouteTable>,
        transfer_acl: Arc<TransferAcl>,
        default_backend: Option<Backend>,
        selector: Arc<dyn BackendSelector>,
        forwarder: Arc<dyn Forwarder>,
        answer_log: Arc<dyn AnswerLog>,
    ) -> Self {
        Self {
            routes,
            transfer_acl,
            default_backend,
            selector,
            forwarder,
            answer_log,
        }
    }

    /// Handle one decoded query. The client always gets an answer, either
    /// the forwarded reply or a SERVFAIL, unless even the failure response
    /// cannot be written.
    pub async fn execute(&self, request: &ProxyRequest, sink: &mut dyn ResponseSink) {
        if let Err(e) = self.dispatch(request, sink).await {
            debug!(client = %request.client, error = %e, "Query failed, answering SERVFAIL");
            match encode(&failure_response(&request.message)) {
                Ok(wire) => {
                    if let Err(send_err) = sink.send(&wire).await {
                        warn!(client = %request.client, error = %send_err, "Failed to deliver failure response");
                    }
                }
                Err(encode_err) => {
                    warn!(client = %request.client, error = %encode_err, "Failed to build failure response");
                }
            }
        }
    }

    async fn dispatch(
        &self,
        request: &ProxyRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<(), ProxyError> {
        // Validate
        let name = request.query_name().ok_or(ProxyError::EmptyQuestion)?;

        // AccessCheck: a denied transfer never reaches a backend.
        let transfer = request.is_transfer();
        if transfer && !self.transfer_acl.allows(request.client.ip()) {
            return Err(ProxyError::TransferDenied(request.client.ip().to_string()));
        }

        // Route, falling back to the default backend on a miss.
        let backend = match self.routes.lookup(&name) {
            Some(candidates) => self.selector.select(candidates),
            None => self
                .default_backend
                .as_ref()
                .ok_or_else(|| ProxyError::NoRoute(name.clone()))?,
        };
        debug!(
            name = %name,
            backend = %backend,
            transport = %request.transport,
            transfer,
            "Routing query"
        );

        if transfer {
            return self.forward_transfer(backend, request, sink).await;
        }

        match backend {
            Backend::Https { url, .. } => {
                let reply = self.forwarder.resolve_via_https(url, request).await?;
                let wire = encode(&reply)?;
                sink.send(&wire).await?;
                self.log_answers(request, backend, &reply);
            }
            Backend::Classic { addr } => {
                let reply = self.forwarder.exchange(*addr, request).await?;
                sink.send(&reply.wire).await?;
                self.log_answers(request, backend, &reply.message);
            }
        }
        Ok(())
    }

    async fn forward_transfer(
        &self,
        backend: &Backend,
        request: &ProxyRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<(), ProxyError> {
        if !request.transport.is_stream() {
            return Err(ProxyError::TransferRequiresStream);
        }
        let addr: SocketAddr = match backend {
            Backend::Classic { addr } => *addr,
            Backend::Https { .. } => return Err(ProxyError::TransferOverHttps),
        };
        let stats = self.forwarder.transfer(addr, request, sink).await?;
        debug!(
            backend = %backend,
            envelopes = stats.envelopes,
            records = stats.records,
            "Zone transfer relayed"
        );
        Ok(())
    }

    /// Fire-and-forget: the response has already been sent when this runs.
    fn log_answers(&self, request: &ProxyRequest, backend: &Backend, reply: &Message) {
        if reply.answers().is_empty() {
            return;
        }
        let client = request.client.ip().to_string();
        let server = backend.to_string();
        let records: Vec<PassiveRecord> = reply
            .answers()
            .iter()
            .map(|record| {
                PassiveRecord::observed(
                    client.clone(),
                    server.clone(),
                    record.dns_class().to_string(),
                    record.name().to_utf8(),
                    record.record_type().to_string(),
                    record.data().to_string(),
                    record.ttl(),
                )
            })
            .collect();
        self.answer_log.record(records);
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use split_dns_application::ports::{
    AnswerLog, ExchangeReply, Forwarder, ResponseSink, TransferStats,
};
use split_dns_application::request::ProxyRequest;
use split_dns_application::response::encode;
use split_dns_application::selector::BackendSelector;
use split_dns_domain::{Backend, InboundTransport, PassiveRecord, ProxyError};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Mutex;

pub const QUERY_ID: u16 = 4242;

pub fn make_request(
    name: &str,
    record_type: RecordType,
    client: &str,
    transport: InboundTransport,
) -> ProxyRequest {
    let mut message = Message::new(QUERY_ID, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(make_question(name, record_type));
    finish_request(message, client, transport)
}

pub fn make_multi_request(
    questions: &[(&str, RecordType)],
    client: &str,
    transport: InboundTransport,
) -> ProxyRequest {
    let mut message = Message::new(QUERY_ID, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    for (name, record_type) in questions {
        message.add_query(make_question(name, *record_type));
    }
    finish_request(message, client, transport)
}

pub fn make_empty_request(client: &str, transport: InboundTransport) -> ProxyRequest {
    let message = Message::new(QUERY_ID, MessageType::Query, OpCode::Query);
    finish_request(message, client, transport)
}

fn make_question(name: &str, record_type: RecordType) -> Query {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);
    query
}

fn finish_request(message: Message, client: &str, transport: InboundTransport) -> ProxyRequest {
    let wire = encode(&message).unwrap();
    ProxyRequest {
        wire,
        message,
        client: client.parse().unwrap(),
        transport,
    }
}

/// A reply to `request` carrying one A record per address.
pub fn answer_reply(request: &ProxyRequest, addrs: &[[u8; 4]], ttl: u32) -> Message {
    let mut reply = Message::new(
        request.message.id(),
        MessageType::Response,
        request.message.op_code(),
    );
    reply.add_queries(request.message.queries().iter().cloned());
    if let Some(question) = request.message.queries().first() {
        for addr in addrs {
            reply.add_answer(Record::from_rdata(
                question.name().clone(),
                ttl,
                RData::A(hickory_proto::rr::rdata::A(std::net::Ipv4Addr::from(
                    *addr,
                ))),
            ));
        }
    }
    reply
}

pub fn exchange_reply(reply: Message) -> ExchangeReply {
    let wire = encode(&reply).unwrap();
    ExchangeReply {
        wire,
        message: reply,
    }
}

// ── mocks ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CaptureSink {
    pub sent: Vec<Vec<u8>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only_message(&self) -> Message {
        assert_eq!(self.sent.len(), 1, "expected exactly one response");
        Message::from_vec(&self.sent[0]).unwrap()
    }
}

#[async_trait]
impl ResponseSink for CaptureSink {
    async fn send(&mut self, wire: &[u8]) -> Result<(), ProxyError> {
        self.sent.push(wire.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockForwarder {
    exchange_result: Mutex<Option<Result<ExchangeReply, ProxyError>>>,
    doh_result: Mutex<Option<Result<Message, ProxyError>>>,
    transfer_envelopes: Mutex<Vec<Vec<u8>>>,
    transfer_error: Mutex<Option<ProxyError>>,
    calls: Mutex<Vec<String>>,
}

impl MockForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_exchange(&self, reply: ExchangeReply) {
        *self.exchange_result.lock().unwrap() = Some(Ok(reply));
    }

    pub fn set_exchange_error(&self, error: ProxyError) {
        *self.exchange_result.lock().unwrap() = Some(Err(error));
    }

    pub fn set_doh(&self, reply: Message) {
        *self.doh_result.lock().unwrap() = Some(Ok(reply));
    }

    pub fn set_doh_error(&self, error: ProxyError) {
        *self.doh_result.lock().unwrap() = Some(Err(error));
    }

    pub fn set_transfer_envelopes(&self, envelopes: Vec<Vec<u8>>) {
        *self.transfer_envelopes.lock().unwrap() = envelopes;
    }

    pub fn set_transfer_error(&self, error: ProxyError) {
        *self.transfer_error.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Forwarder for MockForwarder {
    async fn exchange(
        &self,
        addr: SocketAddr,
        _request: &ProxyRequest,
    ) -> Result<ExchangeReply, ProxyError> {
        self.calls.lock().unwrap().push(format!("exchange:{}", addr));
        self.exchange_result
            .lock()
            .unwrap()
            .clone()
            .expect("exchange result not configured")
    }

    async fn resolve_via_https(
        &self,
        url: &str,
        _request: &ProxyRequest,
    ) -> Result<Message, ProxyError> {
        self.calls.lock().unwrap().push(format!("doh:{}", url));
        self.doh_result
            .lock()
            .unwrap()
            .clone()
            .expect("doh result not configured")
    }

    async fn transfer(
        &self,
        addr: SocketAddr,
        _request: &ProxyRequest,
        sink: &mut dyn ResponseSink,
    ) -> Result<TransferStats, ProxyError> {
        self.calls.lock().unwrap().push(format!("transfer:{}", addr));
        if let Some(error) = self.transfer_error.lock().unwrap().clone() {
            return Err(error);
        }
        let envelopes = self.transfer_envelopes.lock().unwrap().clone();
        let mut stats = TransferStats::default();
        for envelope in &envelopes {
            sink.send(envelope).await?;
            stats.envelopes += 1;
        }
        Ok(stats)
    }
}

#[derive(Default)]
pub struct RecordingLog {
    records: Mutex<Vec<PassiveRecord>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<PassiveRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AnswerLog for RecordingLog {
    fn record(&self, mut records: Vec<PassiveRecord>) {
        self.records.lock().unwrap().append(&mut records);
    }
}

/// Always picks the first candidate, making routing assertions deterministic.
pub struct FirstSelector;

impl BackendSelector for FirstSelector {
    fn select<'a>(&self, backends: &'a [Backend]) -> &'a Backend {
        &backends[0]
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::{A, SOA};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use split_dns_application::ports::ResponseSink;
use split_dns_application::request::ProxyRequest;
use split_dns_application::response::encode;
use split_dns_domain::{InboundTransport, ProxyError};
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::net::{TcpListener, UdpSocket};

use split_dns_infrastructure::dns::transport::{read_framed, write_framed};

pub const CLIENT: &str = "192.0.2.10:43210";

pub fn make_request(
    name: &str,
    record_type: RecordType,
    transport: InboundTransport,
) -> ProxyRequest {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    let wire = encode(&message).unwrap();
    ProxyRequest {
        wire,
        message,
        client: CLIENT.parse().unwrap(),
        transport,
    }
}

/// Reply to `query` with one A record per address.
pub fn reply_for(query: &Message, addrs: &[[u8; 4]]) -> Message {
    let mut reply = Message::new(query.id(), MessageType::Response, query.op_code());
    reply.add_queries(query.queries().iter().cloned());
    if let Some(question) = query.queries().first() {
        for addr in addrs {
            reply.add_answer(Record::from_rdata(
                question.name().clone(),
                60,
                RData::A(A(std::net::Ipv4Addr::from(*addr))),
            ));
        }
    }
    reply
}

pub fn soa_record(zone: &str, serial: u32) -> Record {
    let name = Name::from_str(zone).unwrap();
    let soa = SOA::new(
        Name::from_str(&format!("ns1.{}", zone)).unwrap(),
        Name::from_str(&format!("hostmaster.{}", zone)).unwrap(),
        serial,
        3600,
        900,
        604800,
        300,
    );
    Record::from_rdata(name, 3600, RData::SOA(soa))
}

pub fn a_record(name: &str, addr: [u8; 4]) -> Record {
    Record::from_rdata(
        Name::from_str(name).unwrap(),
        60,
        RData::A(A(std::net::Ipv4Addr::from(addr))),
    )
}

/// A transfer envelope answering `query` with the given records.
pub fn envelope_for(query: &Message, answers: Vec<Record>, rcode: ResponseCode) -> Vec<u8> {
    let mut message = Message::new(query.id(), MessageType::Response, query.op_code());
    message.set_response_code(rcode);
    message.add_queries(query.queries().iter().cloned());
    message.add_answers(answers);
    encode(&message).unwrap()
}

/// One-shot UDP upstream answering every query with the given A records.
pub async fn spawn_udp_upstream(addrs: Vec<[u8; 4]>) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let local = socket.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        let (n, peer) = socket.recv_from(&mut buf).await.unwrap();
        let query = Message::from_vec(&buf[..n]).unwrap();
        let reply = encode(&reply_for(&query, &addrs)).unwrap();
        socket.send_to(&reply, peer).await.unwrap();
    });
    local
}

/// One-shot TCP upstream answering one framed query with the given A records.
pub async fn spawn_tcp_upstream(addrs: Vec<[u8; 4]>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let wire = read_framed(&mut stream).await.unwrap();
        let query = Message::from_vec(&wire).unwrap();
        let reply = encode(&reply_for(&query, &addrs)).unwrap();
        write_framed(&mut stream, &reply).await.unwrap();
    });
    local
}

/// Transfer upstream: reads the framed query, answers with envelopes built
/// by `build` from the parsed query, then closes the stream.
pub async fn spawn_transfer_upstream<F>(build: F) -> SocketAddr
where
    F: FnOnce(&Message) -> Vec<Vec<u8>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let wire = read_framed(&mut stream).await.unwrap();
        let query = Message::from_vec(&wire).unwrap();
        for envelope in build(&query) {
            write_framed(&mut stream, &envelope).await.unwrap();
        }
    });
    local
}

/// A TCP address that refuses connections.
pub async fn refused_tcp_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();
    drop(listener);
    local
}

#[derive(Default)]
pub struct CaptureSink {
    pub sent: Vec<Vec<u8>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseSink for CaptureSink {
    async fn send(&mut self, wire: &[u8]) -> Result<(), ProxyError> {
        self.sent.push(wire.to_vec());
        Ok(())
    }
}

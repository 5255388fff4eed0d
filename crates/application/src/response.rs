use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use split_dns_domain::ProxyError;

/// The uniform failure response: SERVFAIL echoing the request's ID, opcode
/// and question section.
pub fn failure_response(request: &Message) -> Message {
    let mut response = Message::new(request.id(), MessageType::Response, request.op_code());
    response.set_response_code(ResponseCode::ServFail);
    response.set_recursion_desired(request.recursion_desired());
    response.add_queries(request.queries().iter().cloned());
    response
}

/// Serialize a message to wire format.
pub fn encode(message: &Message) -> Result<Vec<u8>, ProxyError> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| ProxyError::InvalidMessage(format!("failed to serialize message: {}", e)))?;
    Ok(buf)
}

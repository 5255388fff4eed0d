use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ProxyError {
    #[error("Query has no question section")]
    EmptyQuestion,

    #[error("Zone transfer denied for client {0}")]
    TransferDenied(String),

    #[error("Zone transfer requires a stream transport")]
    TransferRequiresStream,

    #[error("Zone transfer cannot be served by an HTTPS endpoint")]
    TransferOverHttps,

    #[error("No route matched '{0}' and no default backend is configured")]
    NoRoute(String),

    #[error("Invalid DNS message: {0}")]
    InvalidMessage(String),

    #[error("Invalid response from {server}: {reason}")]
    InvalidUpstreamResponse { server: String, reason: String },

    #[error("Timeout waiting on {server}")]
    UpstreamTimeout { server: String },

    #[error("Connection to {server} failed: {reason}")]
    UpstreamConnect { server: String, reason: String },

    #[error("Exchange with {server} failed: {reason}")]
    UpstreamExchange { server: String, reason: String },

    #[error("Zone transfer from {server} failed: {reason}")]
    TransferFailed { server: String, reason: String },

    #[error("Failed to write response to client: {0}")]
    ClientWrite(String),
}

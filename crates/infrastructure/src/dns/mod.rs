pub mod forwarding;
pub mod query_logger;
pub mod sink;
pub mod transport;

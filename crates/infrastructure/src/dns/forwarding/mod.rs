pub mod doh;
pub mod forwarder;
pub mod record_kind;
pub mod transfer;

pub use doh::DohResolver;
pub use forwarder::ProxyForwarder;
pub use record_kind::RecordKind;
pub use transfer::TransferSession;

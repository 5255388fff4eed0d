//! Split DNS Domain Layer
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod passive_record;
pub mod route_table;
pub mod transfer_acl;

pub use config::{CliOverrides, Config, ConfigError};
pub use endpoint::{Backend, InboundTransport};
pub use errors::ProxyError;
pub use passive_record::PassiveRecord;
pub use route_table::{RouteEntry, RouteTable};
pub use transfer_acl::TransferAcl;

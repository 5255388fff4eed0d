pub mod errors;
pub mod logging;
pub mod proxy;
pub mod root;
pub mod server;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use proxy::ForwardingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;

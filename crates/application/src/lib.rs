//! Split DNS Application Layer
pub mod ports;
pub mod request;
pub mod response;
pub mod selector;
pub mod use_cases;

pub use request::ProxyRequest;
pub use selector::{BackendSelector, RandomSelector};
pub use use_cases::HandleQueryUseCase;

use serde::{Deserialize, Serialize};

/// Routing and access-control section.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ForwardingConfig {
    /// Backend for queries no route matches. Classic `IP:PORT` form only.
    #[serde(default)]
    pub default_server: Option<String>,

    /// `domain=endpoint[,endpoint...]` rules, longest suffix wins.
    #[serde(default)]
    pub routes: Vec<String>,

    /// Client addresses permitted to run zone transfers.
    #[serde(default)]
    pub allow_transfer: Vec<String>,
}

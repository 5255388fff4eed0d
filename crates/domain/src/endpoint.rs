use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// Transport a query arrived on. Classic forwards reuse it for the upstream
/// exchange; zone transfers require `Tcp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundTransport {
    Udp,
    Tcp,
}

impl InboundTransport {
    pub fn is_stream(&self) -> bool {
        matches!(self, InboundTransport::Tcp)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InboundTransport::Udp => "UDP",
            InboundTransport::Tcp => "TCP",
        }
    }
}

impl fmt::Display for InboundTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An upstream endpoint a route can point at.
///
/// `Classic` endpoints answer over plain DNS (UDP or TCP, matching the
/// inbound transport). `Https` endpoints are DNS-over-HTTPS resolvers and
/// are answered by synthesis instead of verbatim relay.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Backend {
    Classic { addr: SocketAddr },
    Https { url: Arc<str>, hostname: Arc<str> },
}

impl Backend {
    pub fn is_https(&self) -> bool {
        matches!(self, Backend::Https { .. })
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            Backend::Classic { addr } => Some(*addr),
            Backend::Https { .. } => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Backend::Https { url, .. } => Some(url),
            Backend::Classic { .. } => None,
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("https://") {
            let hostname: Arc<str> = s
                .strip_prefix("https://")
                .and_then(|rest| rest.split('/').next())
                .filter(|host| !host.is_empty())
                .ok_or_else(|| format!("Invalid HTTPS URL: '{}'", s))?
                .into();
            return Ok(Backend::Https {
                url: s.into(),
                hostname,
            });
        }
        let addr_str = s.strip_prefix("udp://").unwrap_or(s);
        if let Ok(addr) = addr_str.parse::<SocketAddr>() {
            return Ok(Backend::Classic { addr });
        }
        Err(format!(
            "Invalid endpoint '{}'. Expected IP:PORT or https://URL",
            s
        ))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Classic { addr } => write!(f, "{}", addr),
            Backend::Https { url, .. } => write!(f, "{}", url),
        }
    }
}

use std::collections::HashSet;
use std::net::IpAddr;

/// Clients permitted to run zone transfers (AXFR/IXFR).
///
/// Entries are literal address strings compared exactly: no CIDR, no
/// wildcard, no normalization. The client's port is stripped before the
/// comparison by taking only the `IpAddr`.
#[derive(Debug, Clone, Default)]
pub struct TransferAcl {
    allowed: HashSet<String>,
}

impl TransferAcl {
    pub fn new<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = addrs
            .into_iter()
            .map(|a| a.as_ref().trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn allows(&self, client: IpAddr) -> bool {
        self.allowed.contains(&client.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }
}

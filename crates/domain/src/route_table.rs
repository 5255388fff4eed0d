use crate::config::ConfigError;
use crate::endpoint::Backend;
use std::collections::HashSet;

/// One `domain=endpoint[,endpoint...]` routing rule.
///
/// The suffix is stored lower-cased with a guaranteed trailing dot so it can
/// be compared against normalized query names with a plain `ends_with`.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    suffix: String,
    backends: Vec<Backend>,
}

impl RouteEntry {
    pub fn parse(rule: &str) -> Result<Self, ConfigError> {
        let (domain, servers) = rule.split_once('=').ok_or_else(|| {
            ConfigError::Validation(format!("route '{}' is missing '='", rule))
        })?;
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(ConfigError::Validation(format!(
                "route '{}' has an empty domain",
                rule
            )));
        }

        let mut backends = Vec::new();
        for part in servers.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "route '{}' has an empty endpoint",
                    rule
                )));
            }
            let backend = part.parse::<Backend>().map_err(|e| {
                ConfigError::Validation(format!("route '{}': {}", rule, e))
            })?;
            backends.push(backend);
        }
        if backends.is_empty() {
            return Err(ConfigError::Validation(format!(
                "route '{}' has no endpoints",
                rule
            )));
        }

        Ok(Self {
            suffix: normalize_suffix(domain),
            backends,
        })
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn matches(&self, normalized_name: &str) -> bool {
        normalized_name.ends_with(&self.suffix)
    }
}

/// Lower-case a domain and append the trailing dot if absent, so suffix
/// comparison is safe against mixed-case incoming query names.
pub fn normalize_suffix(domain: &str) -> String {
    let mut s = domain.to_ascii_lowercase();
    if !s.ends_with('.') {
        s.push('.');
    }
    s
}

/// Immutable suffix routing table, built once at startup.
///
/// Entries are held sorted by suffix length descending, so `lookup` returns
/// the longest matching suffix by construction rather than by incidental
/// collection order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn build(rules: &[String]) -> Result<Self, ConfigError> {
        let mut entries = Vec::with_capacity(rules.len());
        let mut seen: HashSet<String> = HashSet::with_capacity(rules.len());
        for rule in rules {
            let entry = RouteEntry::parse(rule)?;
            if !seen.insert(entry.suffix().to_string()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate route for '{}'",
                    entry.suffix()
                )));
            }
            entries.push(entry);
        }
        // Longest suffix first; equal lengths ordered lexically so lookup
        // order stays deterministic.
        entries.sort_by(|a, b| {
            b.suffix
                .len()
                .cmp(&a.suffix.len())
                .then_with(|| a.suffix.cmp(&b.suffix))
        });
        Ok(Self { entries })
    }

    /// Backends of the longest suffix the (already normalized) query name
    /// ends with, if any.
    pub fn lookup(&self, normalized_name: &str) -> Option<&[Backend]> {
        self.entries
            .iter()
            .find(|entry| entry.matches(normalized_name))
            .map(|entry| entry.backends())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

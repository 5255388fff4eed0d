use split_dns_domain::Backend;

/// Picks one backend from a route's candidate list.
///
/// Injectable so tests can substitute a deterministic source. Implementations
/// must be safe under concurrent invocation from many request tasks.
pub trait BackendSelector: Send + Sync {
    /// `backends` is never empty: route entries reject empty lists at
    /// construction and the default backend is a single endpoint.
    fn select<'a>(&self, backends: &'a [Backend]) -> &'a Backend;
}

/// Uniformly-random selection over the process-wide `fastrand` generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl BackendSelector for RandomSelector {
    fn select<'a>(&self, backends: &'a [Backend]) -> &'a Backend {
        if backends.len() == 1 {
            return &backends[0];
        }
        &backends[fastrand::usize(..backends.len())]
    }
}

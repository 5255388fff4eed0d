use std::fmt;

/// One observed answer record for the passive DNS log.
///
/// Rendered as a pipe-delimited line:
/// `timestamp||client||server||class||query-name||query-type||answer||ttl||count`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassiveRecord {
    pub timestamp: i64,
    pub client: String,
    pub server: String,
    pub class: String,
    pub query_name: String,
    pub query_type: String,
    pub answer: String,
    pub ttl: u32,
    pub count: u32,
}

impl PassiveRecord {
    /// Stamp a record with the current epoch time. `count` is the constant 1
    /// carried for downstream pipe-parsers.
    #[allow(clippy::too_many_arguments)]
    pub fn observed(
        client: String,
        server: String,
        class: String,
        query_name: String,
        query_type: String,
        answer: String,
        ttl: u32,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
            client,
            server,
            class,
            query_name,
            query_type,
            answer,
            ttl,
            count: 1,
        }
    }
}

impl fmt::Display for PassiveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}||{}||{}||{}||{}||{}||{}||{}||{}",
            self.timestamp,
            self.client,
            self.server,
            self.class,
            self.query_name,
            self.query_type,
            self.answer,
            self.ttl,
            self.count
        )
    }
}

use hickory_proto::rr::{RData, Record, RecordType};

/// Record kinds a DoH-backed reply is populated with.
///
/// Closed on purpose: widening coverage means adding a variant here and the
/// compiler pointing at every match that must learn about it, instead of
/// runtime type inspection scattered over the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Ipv4,
    Ipv6,
    CanonicalName,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Ipv4,
        RecordKind::Ipv6,
        RecordKind::CanonicalName,
    ];

    pub fn query_type(&self) -> RecordType {
        match self {
            RecordKind::Ipv4 => RecordType::A,
            RecordKind::Ipv6 => RecordType::AAAA,
            RecordKind::CanonicalName => RecordType::CNAME,
        }
    }

    /// Whether `record` carries an answer of this kind.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RecordKind::Ipv4 => matches!(record.data(), RData::A(_)),
            RecordKind::Ipv6 => matches!(record.data(), RData::AAAA(_)),
            RecordKind::CanonicalName => matches!(record.data(), RData::CNAME(_)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Ipv4 => "A",
            RecordKind::Ipv6 => "AAAA",
            RecordKind::CanonicalName => "CNAME",
        }
    }
}

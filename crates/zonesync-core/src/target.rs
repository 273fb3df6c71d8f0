//! Reconcile targets
//!
//! A [`DomainTarget`] is one configured (domain, record-name, line, type)
//! tuple together with where its desired addresses come from. Targets are
//! immutable and live for one reconcile pass.

use serde::Serialize;

/// One reconcile target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainTarget {
    /// Zone name to resolve
    pub domain_name: String,
    /// Record set name to reconcile
    pub target_name: String,
    /// Routing line
    pub line: String,
    /// Record type, upper-case
    pub record_type: String,
    /// Address source reference (file path)
    pub address_source: String,
    /// Maximum number of addresses to read
    pub desired_count: usize,
    /// TTL used on create, if configured
    pub ttl: Option<u32>,
}

impl DomainTarget {
    /// The (name, line, type) triple record sets are matched against
    pub fn key(&self) -> RecordKey<'_> {
        RecordKey {
            name: &self.target_name,
            line: &self.line,
            record_type: &self.record_type,
        }
    }
}

/// Borrowed (name, line, type) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKey<'a> {
    pub name: &'a str,
    pub line: &'a str,
    pub record_type: &'a str,
}

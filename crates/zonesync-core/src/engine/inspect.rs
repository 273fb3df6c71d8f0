//! Record inspection
//!
//! Lists a zone's record sets and keeps those matching a target's
//! (name, line, type) triple. Filtering happens client-side; the provider
//! listing is never assumed to be pre-filtered.

use crate::error::Result;
use crate::target::RecordKey;
use crate::traits::{DnsProvider, RecordSet, ZoneId};
use tracing::info;

/// Whether `record` matches `key`
///
/// Name and type must be exactly equal. A record without a line matches the
/// `"default"` line.
pub fn matches_key(record: &RecordSet, key: &RecordKey<'_>) -> bool {
    record.name == key.name
        && record.record_type == key.record_type
        && record.effective_line() == key.line
}

/// Keep the records matching `key`, in their original order
pub fn filter_matching(records: Vec<RecordSet>, key: &RecordKey<'_>) -> Vec<RecordSet> {
    records
        .into_iter()
        .filter(|record| matches_key(record, key))
        .collect()
}

/// List the zone and return the record sets matching `key`
///
/// An empty result is not an error.
pub async fn find_matching(
    provider: &dyn DnsProvider,
    zone: &ZoneId,
    key: &RecordKey<'_>,
) -> Result<Vec<RecordSet>> {
    let records = provider.list_record_sets(zone).await?;
    let total = records.len();
    let matching = filter_matching(records, key);

    info!(
        "Found {} of {} records with name '{}', line '{}' and type '{}'",
        matching.len(),
        total,
        key.name,
        key.line,
        key.record_type
    );

    Ok(matching)
}

//! Huawei Cloud DNS API payloads

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use zonesync_core::traits::{RecordSet, Zone, ZoneId};

/// Pagination metadata for list APIs
#[derive(Debug, Deserialize)]
pub struct ListMetadata {
    pub total_count: Option<usize>,
}

/// Response payload for `ListPublicZones`
#[derive(Debug, Deserialize)]
pub struct ListZonesResponse {
    pub zones: Option<Vec<HuaweiZone>>,
    pub metadata: Option<ListMetadata>,
}

/// Public zone item
#[derive(Debug, Deserialize)]
pub struct HuaweiZone {
    pub id: String,
    pub name: String,
}

impl From<HuaweiZone> for Zone {
    fn from(zone: HuaweiZone) -> Self {
        Zone {
            id: ZoneId::new(zone.id),
            name: zone.name,
        }
    }
}

/// Response payload for `ListRecordSetsByZone`
#[derive(Debug, Deserialize)]
pub struct ListRecordSetsResponse {
    pub recordsets: Option<Vec<HuaweiRecordSet>>,
    pub metadata: Option<ListMetadata>,
}

/// Record set item, as returned by list, create and update calls
#[derive(Debug, Deserialize)]
pub struct HuaweiRecordSet {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub records: Option<Vec<String>>,
    pub ttl: Option<u32>,
    pub line: Option<String>,
    pub created_at: Option<String>,
}

impl From<HuaweiRecordSet> for RecordSet {
    fn from(record: HuaweiRecordSet) -> Self {
        RecordSet {
            created_at: record.created_at.as_deref().and_then(parse_timestamp),
            id: record.id,
            name: record.name,
            record_type: record.record_type,
            line: record.line,
            ttl: record.ttl,
            values: record.records.unwrap_or_default(),
        }
    }
}

/// Timestamps come without an offset ("2024-01-01T08:00:00.000") and are UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Request payload for `CreateRecordSetWithLine`
#[derive(Debug, Serialize)]
pub struct CreateRecordSetRequest<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub records: &'a [String],
    pub ttl: u32,
    pub line: &'a str,
}

/// Request payload for `BatchUpdateRecordSetWithLine`
#[derive(Debug, Serialize)]
pub struct BatchUpdateRequest<'a> {
    pub recordsets: Vec<BatchUpdateItem<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BatchUpdateItem<'a> {
    pub id: &'a str,
    pub records: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// Response payload for `BatchUpdateRecordSetWithLine`
#[derive(Debug, Deserialize)]
pub struct BatchUpdateResponse {
    pub recordsets: Option<Vec<HuaweiRecordSet>>,
}

/// Error payload
///
/// The v2 APIs report `code`/`message`, the gateway reports
/// `error_code`/`error_msg`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub error_code: Option<String>,
    pub error_msg: Option<String>,
}

impl ErrorResponse {
    /// "CODE: message", or `None` when the body carried neither
    pub fn describe(&self) -> Option<String> {
        let code = self.code.as_deref().or(self.error_code.as_deref());
        let message = self.message.as_deref().or(self.error_msg.as_deref());
        match (code, message) {
            (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

// # DNS Provider Trait
//
// Defines the interface the reconciler uses to read and mutate a
// provider's authoritative zone data.
//
// ## Implementations
//
// - Huawei Cloud DNS: `zonesync-provider-huaweicloud` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zones = provider.list_zones("example.com.").await?;
//     if let Some(zone) = zones.first() {
//         for record in provider.list_record_sets(&zone.id).await? {
//             println!("{} {} {:?}", record.name, record.record_type, record.values);
//         }
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing line assumed for records that carry no line attribute
pub const DEFAULT_LINE: &str = "default";

/// Opaque provider-side zone identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wrap a provider zone identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A zone as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Zone identifier
    pub id: ZoneId,
    /// Zone name as reported by the provider (usually with a trailing dot)
    pub name: String,
}

impl Zone {
    /// Whether this zone is `name`, ignoring case and the trailing dot
    pub fn has_name(&self, name: &str) -> bool {
        self.name
            .trim_end_matches('.')
            .eq_ignore_ascii_case(name.trim_end_matches('.'))
    }
}

/// A record set as returned by the provider
///
/// This is read-only remote state. It only changes through explicit
/// create/update/delete calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Record set identifier
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type (A, AAAA, CNAME, ...)
    pub record_type: String,
    /// Routing line, if the provider reported one
    pub line: Option<String>,
    /// Time-to-live
    pub ttl: Option<u32>,
    /// Record values in provider order
    pub values: Vec<String>,
    /// Creation time, if the provider reported one
    pub created_at: Option<DateTime<Utc>>,
}

impl RecordSet {
    /// The routing line, with a missing line read as [`DEFAULT_LINE`]
    pub fn effective_line(&self) -> &str {
        self.line.as_deref().unwrap_or(DEFAULT_LINE)
    }
}

/// Parameters for creating a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecordSet {
    pub name: String,
    pub record_type: String,
    pub line: String,
    pub ttl: u32,
    pub values: Vec<String>,
}

/// Parameters for updating an existing record set
///
/// `ttl` and `line` are `None` for a partial update, in which case the
/// provider must leave those fields untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSetUpdate {
    pub id: String,
    pub values: Vec<String>,
    pub ttl: Option<u32>,
    pub line: Option<String>,
}

impl RecordSetUpdate {
    /// Update that replaces only the value list
    pub fn values_only(id: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: id.into(),
            values,
            ttl: None,
            line: None,
        }
    }

    /// Update that resends the current TTL and line alongside new values
    pub fn full(current: &RecordSet, values: Vec<String>) -> Self {
        Self {
            id: current.id.clone(),
            values,
            ttl: current.ttl,
            line: Some(current.effective_line().to_string()),
        }
    }

    /// Whether this update carries only values
    pub fn is_partial(&self) -> bool {
        self.ttl.is_none() && self.line.is_none()
    }
}

/// Trait for DNS provider implementations
///
/// Each method is a single-shot call against the provider's API.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Page through a listing within a single call
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed call fails the domain, nothing else)
/// - ❌ Filter record sets on behalf of the engine
/// - ❌ Decide which duplicate survives (owned by `SyncEngine`)
/// - ❌ Cache zones or records across calls
///
/// Errors are reported as [`crate::Error::ProviderRequest`] carrying the
/// HTTP status (when one exists) and the provider's message.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List zones named exactly `name`
    ///
    /// Providers whose API matches names loosely filter the result with
    /// [`Zone::has_name`]. An empty vector means the provider hosts no such
    /// zone.
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>, crate::Error>;

    /// List every record set in the zone, in provider order
    async fn list_record_sets(&self, zone: &ZoneId) -> Result<Vec<RecordSet>, crate::Error>;

    /// Create a record set
    async fn create_record_set(
        &self,
        zone: &ZoneId,
        record: &NewRecordSet,
    ) -> Result<RecordSet, crate::Error>;

    /// Update an existing record set
    ///
    /// When `update.is_partial()`, TTL and line must be preserved by the
    /// provider.
    async fn update_record_set(
        &self,
        zone: &ZoneId,
        update: &RecordSetUpdate,
    ) -> Result<RecordSet, crate::Error>;

    /// Delete a record set
    async fn delete_record_set(&self, zone: &ZoneId, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}

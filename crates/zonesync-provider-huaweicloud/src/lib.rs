// # Huawei Cloud DNS Provider
//
// This crate provides a Huawei Cloud DNS provider implementation for zonesync.
//
// ## Behavior
//
// - ✅ One HTTP request per provider call (listing pages through the zone)
// - ✅ Full error propagation to the engine, status code included
// - ✅ HTTP timeout configured (`timeout_secs`, default 30 seconds)
// - ✅ Routing lines via the v2.1 record set APIs
// - ❌ NO retry logic (a failed call fails the domain)
// - ❌ NO filtering of record sets (owned by SyncEngine)
// - ❌ NO dry-run handling (owned by SyncEngine)
// - ❌ NO caching
//
// ## Trust Level: Untrusted (DNS Provider)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTPS API calls to the DNS endpoint only
// - ✅ Parse provider-specific responses
//
// **Forbidden Capabilities**:
// - ❌ Spawn tasks or threads
// - ❌ Retry, back off or schedule
// - ❌ Decide which duplicate survives
//
// ## Security Requirements
//
// - Secret access key NEVER appears in logs or Debug output
// - Provider MUST fail fast if credentials are empty
//
// ## API Reference
//
// - Endpoint: `https://dns.{region}.myhuaweicloud.com`
// - List Zones: GET `/v2/zones?type=public&name=...`
// - List Record Sets: GET `/v2.1/zones/{zone_id}/recordsets?limit=...&offset=...`
// - Create Record Set: POST `/v2.1/zones/{zone_id}/recordsets`
// - Batch Update Record Sets: PUT `/v2.1/zones/{zone_id}/recordsets`
// - Delete Record Set: DELETE `/v2.1/zones/{zone_id}/recordsets/{recordset_id}`

mod http;
mod sign;
mod types;

use async_trait::async_trait;
use std::time::Duration;
use zonesync_core::config::ProviderConfig;
use zonesync_core::traits::{
    DnsProvider, DnsProviderFactory, NewRecordSet, RecordSet, RecordSetUpdate, Zone, ZoneId,
};
use zonesync_core::{Error, PluginRegistry, Result};

use types::{
    BatchUpdateItem, BatchUpdateRequest, BatchUpdateResponse, CreateRecordSetRequest,
    HuaweiRecordSet, ListRecordSetsResponse, ListZonesResponse,
};

/// Provider type name used in configuration and the registry
pub const PROVIDER_NAME: &str = "huaweicloud";

/// Page size for record set listing (API maximum)
const PAGE_LIMIT: usize = 500;

/// Huawei Cloud DNS provider
///
/// # Trust Level: Untrusted
///
/// This provider is isolated, stateless, and single-shot. All coordination
/// is owned by `SyncEngine`.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the secret key.
pub struct HuaweiCloudProvider {
    /// Access key ID
    access_key_id: String,

    /// Secret access key
    /// ⚠️ NEVER log this value
    secret_access_key: String,

    /// Scheme and authority requests are sent to
    endpoint: String,

    /// Authority signed as the `Host` header
    host: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the secret key
impl std::fmt::Debug for HuaweiCloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuaweiCloudProvider")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl HuaweiCloudProvider {
    /// Create a provider from configuration
    ///
    /// The endpoint is `config.endpoint` when set, otherwise derived from
    /// `config.region`.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let access_key_id = config.credentials.key.trim().to_string();
        let secret_access_key = config.credentials.secret.trim().to_string();

        if access_key_id.is_empty() || secret_access_key.is_empty() {
            return Err(Error::config("Huawei Cloud access key and secret key are required"));
        }

        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None if !config.region.trim().is_empty() => {
                format!("https://dns.{}.myhuaweicloud.com", config.region.trim())
            }
            None => {
                return Err(Error::config(
                    "Huawei Cloud region is required when no endpoint is configured",
                ));
            }
        };
        let host = host_of(&endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            access_key_id,
            secret_access_key,
            endpoint,
            host,
            client,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Extract the authority of an endpoint URL
fn host_of(endpoint: &str) -> Result<String> {
    let rest = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .ok_or_else(|| Error::config(format!("Endpoint must be an http(s) URL: {}", endpoint)))?;

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(Error::config(format!("Endpoint has no host: {}", endpoint)));
    }
    Ok(host.to_string())
}

#[async_trait]
impl DnsProvider for HuaweiCloudProvider {
    /// List public zones by name
    ///
    /// The API matches names fuzzily, so only zones named exactly `name`
    /// (ignoring case and the trailing dot) are returned.
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>> {
        let query = format!("name={}&type=public", urlencoding::encode(name));
        let response: ListZonesResponse = self.get("/v2/zones", &query).await?;

        let zones: Vec<Zone> = response
            .zones
            .unwrap_or_default()
            .into_iter()
            .map(Zone::from)
            .filter(|zone| zone.has_name(name))
            .collect();

        tracing::debug!(
            "Listed {} zone(s) for '{}' (total reported: {:?})",
            zones.len(),
            name,
            response.metadata.and_then(|m| m.total_count)
        );
        Ok(zones)
    }

    /// List every record set of the zone
    ///
    /// Pages until `metadata.total_count` record sets were read or a short
    /// page is returned.
    async fn list_record_sets(&self, zone: &ZoneId) -> Result<Vec<RecordSet>> {
        let path = format!("/v2.1/zones/{}/recordsets", zone);
        let mut records: Vec<RecordSet> = Vec::new();

        loop {
            let query = format!("limit={}&offset={}", PAGE_LIMIT, records.len());
            let page: ListRecordSetsResponse = self.get(&path, &query).await?;

            let total = page.metadata.and_then(|m| m.total_count);
            let batch = page.recordsets.unwrap_or_default();
            let batch_len = batch.len();
            records.extend(batch.into_iter().map(RecordSet::from));

            let complete = batch_len < PAGE_LIMIT || total.is_some_and(|total| records.len() >= total);
            if complete {
                break;
            }
        }

        tracing::debug!("Listed {} record set(s) in zone {}", records.len(), zone);
        Ok(records)
    }

    async fn create_record_set(&self, zone: &ZoneId, record: &NewRecordSet) -> Result<RecordSet> {
        let path = format!("/v2.1/zones/{}/recordsets", zone);
        let body = CreateRecordSetRequest {
            name: &record.name,
            record_type: &record.record_type,
            records: &record.values,
            ttl: record.ttl,
            line: &record.line,
        };

        let created: HuaweiRecordSet = self.post(&path, &body).await?;
        Ok(created.into())
    }

    /// Update one record set through the batch-with-line API
    ///
    /// The API cannot move a record set to another line, so `update.line`
    /// is never sent.
    async fn update_record_set(&self, zone: &ZoneId, update: &RecordSetUpdate) -> Result<RecordSet> {
        if update.line.is_some() {
            tracing::debug!("Line of record set {} is fixed, not sending it", update.id);
        }

        let path = format!("/v2.1/zones/{}/recordsets", zone);
        let body = BatchUpdateRequest {
            recordsets: vec![BatchUpdateItem {
                id: &update.id,
                records: &update.values,
                ttl: update.ttl,
            }],
        };

        let response: BatchUpdateResponse = self.put(&path, &body).await?;
        response
            .recordsets
            .unwrap_or_default()
            .into_iter()
            .find(|r| r.id == update.id)
            .map(RecordSet::from)
            .ok_or_else(|| {
                Error::provider_request(
                    PROVIDER_NAME,
                    None,
                    format!("Update response does not contain record set {}", update.id),
                )
            })
    }

    async fn delete_record_set(&self, zone: &ZoneId, record_id: &str) -> Result<()> {
        let path = format!("/v2.1/zones/{}/recordsets/{}", zone, record_id);
        self.delete(&path).await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Huawei Cloud providers
pub struct HuaweiCloudFactory;

impl DnsProviderFactory for HuaweiCloudFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        if config.type_name() != PROVIDER_NAME {
            return Err(Error::config(format!(
                "Invalid provider type for Huawei Cloud factory: {}",
                config.type_name()
            )));
        }

        let provider = HuaweiCloudProvider::new(config)?;
        tracing::debug!("Huawei Cloud provider targeting {}", provider.endpoint());
        Ok(Box::new(provider))
    }
}

/// Register the Huawei Cloud provider with a registry
///
/// # Example
///
/// ```rust
/// use zonesync_core::PluginRegistry;
///
/// let registry = PluginRegistry::new();
/// zonesync_provider_huaweicloud::register(&registry);
/// assert!(registry.has_provider("huaweicloud"));
/// ```
pub fn register(registry: &PluginRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(HuaweiCloudFactory));
}

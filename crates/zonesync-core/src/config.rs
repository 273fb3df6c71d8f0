//! Configuration types for the zonesync system
//!
//! The configuration is a single YAML document:
//!
//! ```yaml
//! credentials:
//!   key: AK...
//!   secret: SK...
//! region: cn-north-4
//! csv:
//!   n_rows: 5
//! domains:
//!   - domain_name: example.com.
//!     target_name: www.example.com.
//!     line: default
//!     type: A
//!     csv_file: ips/www.csv
//! ```

use crate::target::DomainTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default TTL for created record sets
pub const DEFAULT_TTL: u32 = 300;

/// Largest TTL accepted in configuration
const MAX_TTL: u32 = 2_147_483_647;

/// Main zonesync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// DNS provider configuration (top-level keys of the document)
    #[serde(flatten)]
    pub provider: ProviderConfig,

    /// Address source configuration
    #[serde(rename = "csv")]
    pub address_source: AddressSourceConfig,

    /// Domains to reconcile, in processing order
    pub domains: Vec<DomainConfig>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Parse a configuration document
    pub fn from_yaml_str(document: &str) -> Result<Self, crate::Error> {
        serde_yaml::from_str(document)
            .map_err(|e| crate::Error::config(format!("Invalid configuration document: {}", e)))
    }

    /// Load a configuration document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&document)?;
        tracing::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domains.is_empty() {
            return Err(crate::Error::config("No domains configured"));
        }

        self.provider.validate()?;
        self.address_source.validate()?;
        self.engine.validate()?;

        for (index, domain) in self.domains.iter().enumerate() {
            domain
                .validate()
                .map_err(|e| crate::Error::config(format!("domains[{}]: {}", index, e)))?;
        }

        Ok(())
    }

    /// Resolve the configured domains into reconcile targets
    pub fn targets(&self) -> Vec<DomainTarget> {
        self.domains
            .iter()
            .map(|domain| domain.to_target(self.address_source.n_rows))
            .collect()
    }
}

/// Provider access key pair
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Access key ID
    #[serde(default)]
    pub key: String,
    /// Secret access key
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

// Custom Debug implementation that hides the secret
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type name used for registry lookup
    #[serde(rename = "provider", default = "default_provider_type")]
    pub provider_type: String,

    /// Access credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// Provider region (e.g., "cn-north-4")
    #[serde(default)]
    pub region: String,

    /// Endpoint override (scheme and host), mostly for tests
    #[serde(default)]
    pub endpoint: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Create a provider configuration with defaults
    pub fn new(credentials: Credentials, region: impl Into<String>) -> Self {
        Self {
            provider_type: default_provider_type(),
            credentials,
            region: region.into(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.provider_type.is_empty() {
            return Err(crate::Error::config("Provider type cannot be empty"));
        }
        if self.credentials.key.is_empty() {
            return Err(crate::Error::config("Credential key cannot be empty"));
        }
        if self.credentials.secret.is_empty() {
            return Err(crate::Error::config("Credential secret cannot be empty"));
        }
        if self.region.is_empty() && self.endpoint.is_none() {
            return Err(crate::Error::config(
                "Region cannot be empty unless an endpoint is configured",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Provider timeout must be > 0"));
        }
        Ok(())
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        &self.provider_type
    }
}

/// Address source configuration (the `csv` block)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressSourceConfig {
    /// Source type name used for registry lookup
    #[serde(rename = "type", default = "default_source_type")]
    pub source_type: String,

    /// Global cap on the number of addresses read per domain
    pub n_rows: usize,
}

impl AddressSourceConfig {
    pub fn new(n_rows: usize) -> Self {
        Self {
            source_type: default_source_type(),
            n_rows,
        }
    }

    /// Validate the address source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.source_type.is_empty() {
            return Err(crate::Error::config("Address source type cannot be empty"));
        }
        if self.n_rows == 0 {
            return Err(crate::Error::config("csv.n_rows must be > 0"));
        }
        Ok(())
    }

    /// Get the source type name
    pub fn type_name(&self) -> &str {
        &self.source_type
    }
}

/// One configured domain entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Zone name as hosted by the provider (e.g., "example.com.")
    pub domain_name: String,

    /// Record set name to reconcile (e.g., "www.example.com.")
    pub target_name: String,

    /// Routing line
    pub line: String,

    /// Record type
    #[serde(rename = "type", default = "default_record_type")]
    pub record_type: String,

    /// Address file reference
    pub csv_file: String,

    /// TTL used when the record set has to be created
    #[serde(default)]
    pub ttl: Option<u32>,

    /// Per-domain override of `csv.n_rows`
    #[serde(default)]
    pub n_rows: Option<usize>,
}

impl DomainConfig {
    /// Create a domain entry with record type `A`
    pub fn new(
        domain_name: impl Into<String>,
        target_name: impl Into<String>,
        line: impl Into<String>,
        csv_file: impl Into<String>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            target_name: target_name.into(),
            line: line.into(),
            record_type: default_record_type(),
            csv_file: csv_file.into(),
            ttl: None,
            n_rows: None,
        }
    }

    /// Set the record type
    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }

    /// Set the TTL used on create
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Validate the domain entry
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain_name.trim().is_empty() {
            return Err(crate::Error::config("domain_name cannot be empty"));
        }
        if self.target_name.trim().is_empty() {
            return Err(crate::Error::config("target_name cannot be empty"));
        }
        if self.line.trim().is_empty() {
            return Err(crate::Error::config("line cannot be empty"));
        }
        if self.record_type.trim().is_empty() {
            return Err(crate::Error::config("type cannot be empty"));
        }
        if self.csv_file.trim().is_empty() {
            return Err(crate::Error::config("csv_file cannot be empty"));
        }
        if let Some(ttl) = self.ttl
            && !(1..=MAX_TTL).contains(&ttl)
        {
            return Err(crate::Error::config(format!(
                "ttl must be between 1 and {}. Got: {}",
                MAX_TTL, ttl
            )));
        }
        if self.n_rows == Some(0) {
            return Err(crate::Error::config("n_rows must be > 0"));
        }
        Ok(())
    }

    /// Build the reconcile target for this entry
    pub fn to_target(&self, global_rows: usize) -> DomainTarget {
        DomainTarget {
            domain_name: self.domain_name.trim().to_string(),
            target_name: self.target_name.trim().to_string(),
            line: self.line.trim().to_string(),
            record_type: self.record_type.trim().to_ascii_uppercase(),
            address_source: self.csv_file.trim().to_string(),
            desired_count: self.n_rows.unwrap_or(global_rows),
            ttl: self.ttl,
        }
    }
}

/// How the surviving record is chosen among duplicates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivorStrategy {
    /// First record in provider listing order
    ///
    /// Listing order is not guaranteed stable across runs, so the survivor
    /// may differ between runs.
    #[default]
    ProviderOrder,
    /// Record with the lexicographically smallest id
    LowestId,
    /// Record with the earliest creation time
    Oldest,
}

/// How failures while deleting extras are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
    /// Attempt every deletion and collect the failures
    #[default]
    BestEffort,
    /// Stop deleting at the first failure
    AbortOnFirstError,
}

/// What an update sends to the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Values only; the provider preserves TTL and line
    #[default]
    Partial,
    /// Values plus the kept record's current TTL and line
    Full,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Survivor selection among duplicates
    #[serde(default)]
    pub survivor_strategy: SurvivorStrategy,

    /// Failure handling while deleting duplicates
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    /// Update payload shape
    #[serde(default)]
    pub update_mode: UpdateMode,

    /// TTL for created record sets without a per-domain TTL
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// Inspect zones and log intended changes without mutating anything
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the audit event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(1..=MAX_TTL).contains(&self.default_ttl) {
            return Err(crate::Error::config(format!(
                "engine.default_ttl must be between 1 and {}. Got: {}",
                MAX_TTL, self.default_ttl
            )));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "engine.event_channel_capacity must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            survivor_strategy: SurvivorStrategy::default(),
            deletion_policy: DeletionPolicy::default(),
            update_mode: UpdateMode::default(),
            default_ttl: default_ttl(),
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_provider_type() -> String {
    "huaweicloud".to_string()
}

fn default_source_type() -> String {
    "csv".to_string()
}

fn default_record_type() -> String {
    "A".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_event_channel_capacity() -> usize {
    1000
}

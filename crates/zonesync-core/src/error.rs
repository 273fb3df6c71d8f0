//! Error types for the zonesync system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zonesync system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal, abort the run)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No zone exists for the domain
    ///
    /// This is an expected outcome. The orchestrator reports it as a skip,
    /// never as a failure.
    #[error("Zone not found: {domain}")]
    ZoneNotFound {
        /// Domain name that was looked up
        domain: String,
    },

    /// A provider API call failed
    #[error("Provider request failed ({provider}, status {}): {message}", status.map(|s| s.to_string()).unwrap_or_else(|| "n/a".to_string()))]
    ProviderRequest {
        /// Provider name
        provider: String,
        /// HTTP status code, if the request got that far
        status: Option<u16>,
        /// Error message reported by the provider or the transport
        message: String,
    },

    /// The address list could not be read or is unusable
    #[error("Address source error: {0}")]
    AddressSource(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(domain: impl Into<String>) -> Self {
        Self::ZoneNotFound {
            domain: domain.into(),
        }
    }

    /// Create a provider request error
    pub fn provider_request(
        provider: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderRequest {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create an address source error
    pub fn address_source(msg: impl Into<String>) -> Self {
        Self::AddressSource(msg.into())
    }

    /// HTTP status carried by a provider error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ProviderRequest { status, .. } => *status,
            _ => None,
        }
    }
}

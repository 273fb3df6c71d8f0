// # Address Source Trait
//
// Defines the interface for reading the desired address list of a target.
//
// ## Implementations
//
// - CSV files: `zonesync-source-csv` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::AddressSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* AddressSource implementation */;
//
//     // First five addresses, in file order
//     let addresses = source.read("ips/www.csv", 5).await?;
//     println!("{:?}", addresses.as_slice());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::Serialize;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Ordered list of address strings
///
/// Order is preserved end-to-end into the record's value list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AddressList(Vec<String>);

impl AddressList {
    /// Create an address list, keeping at most `cap` entries
    pub fn with_cap(mut values: Vec<String>, cap: usize) -> Self {
        values.truncate(cap);
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Check the list is usable as the value list of a `record_type` record
    ///
    /// An empty list is always rejected. `A` and `AAAA` values must parse as
    /// IPv4 and IPv6 addresses respectively; other types are passed through.
    pub fn validate_for(&self, record_type: &str) -> Result<(), crate::Error> {
        if self.is_empty() {
            return Err(crate::Error::address_source("address list is empty"));
        }

        for value in &self.0 {
            let valid = match record_type {
                "A" => value.parse::<Ipv4Addr>().is_ok(),
                "AAAA" => value.parse::<Ipv6Addr>().is_ok(),
                _ => true,
            };
            if !valid {
                return Err(crate::Error::address_source(format!(
                    "'{}' is not a valid value for a {} record",
                    value, record_type
                )));
            }
        }

        Ok(())
    }
}

impl From<Vec<String>> for AddressList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

/// Trait for address source implementations
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Read the referenced file (or equivalent resource)
///
/// ## Forbidden Capabilities
/// - ❌ Call the DNS provider
/// - ❌ Return more than `limit` entries
///
/// A missing or malformed source is an [`crate::Error::AddressSource`].
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Read up to `limit` addresses from `reference`, in source order
    async fn read(&self, reference: &str, limit: usize) -> Result<AddressList, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing address sources from configuration
pub trait AddressSourceFactory: Send + Sync {
    /// Create an AddressSource instance from configuration
    fn create(
        &self,
        config: &crate::config::AddressSourceConfig,
    ) -> Result<Box<dyn AddressSource>, crate::Error>;
}

//! Core traits for the zonesync system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProvider`]: Read and mutate zone data via provider APIs
//! - [`AddressSource`]: Read the desired address list of a target

pub mod address_source;
pub mod dns_provider;

pub use address_source::{AddressList, AddressSource, AddressSourceFactory};
pub use dns_provider::{
    DEFAULT_LINE, DnsProvider, DnsProviderFactory, NewRecordSet, RecordSet, RecordSetUpdate, Zone,
    ZoneId,
};

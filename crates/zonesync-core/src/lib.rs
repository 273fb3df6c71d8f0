// # zonesync-core
//
// Core library for the zonesync DNS record-set reconciler.
//
// ## Architecture Overview
//
// For every configured domain the engine makes sure exactly one record set
// with the configured (name, line, type) exists and carries the addresses
// read from its address source:
// - **DnsProvider**: Trait for listing and mutating zone data via provider APIs
// - **AddressSource**: Trait for reading the desired address list
// - **SyncEngine**: Core engine running the per-domain reconcile state machine
// - **PluginRegistry**: Plugin-based registry for providers and address sources
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Isolation**: A failure in one domain never affects another

pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod target;
pub mod traits;

// Re-export core types for convenience
pub use config::{AddressSourceConfig, DomainConfig, EngineConfig, ProviderConfig, SyncConfig};
pub use engine::{DomainOutcome, DomainState, EngineEvent, SyncEngine, SyncReport, UpdateResult};
pub use error::{Error, Result};
pub use registry::PluginRegistry;
pub use target::DomainTarget;
pub use traits::{AddressList, AddressSource, DnsProvider};

//! Core reconcile engine
//!
//! The SyncEngine is responsible for:
//! - Resolving each configured domain to its zone
//! - Finding the record sets matching each target
//! - Removing duplicates and creating or updating the survivor
//! - Reporting every state transition as an [`EngineEvent`]
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────┐
//!                      │  SyncEngine  │─── EngineEvent ───▶ audit log
//!                      └──────────────┘
//!                             │  one domain at a time
//!        ┌──────────────┬─────┴────────┬───────────────┐
//!        ▼              ▼              ▼               ▼
//! ┌────────────┐ ┌────────────┐ ┌─────────────┐ ┌───────────────┐
//! │ zone       │ │ inspect    │ │ dedup       │ │ mutate        │
//! │ (resolve)  │ │ (filter)   │ │ (survivor)  │ │ (create/      │
//! └────────────┘ └────────────┘ └─────────────┘ │  update/del)  │
//!                                               └───────────────┘
//!                                                       ▲
//!                                              AddressSource (read
//!                                              only at create/update)
//! ```
//!
//! ## Per-domain state machine
//!
//! ```text
//! RESOLVING_ZONE ──no zone──▶ SKIPPED
//!       │
//!       ▼
//!   INSPECTING ──no match──▶ CREATING ──▶ DONE
//!       │
//!       ▼
//! DEDUPLICATING ──▶ UPDATING ──▶ DONE
//!
//! any error ──▶ FAILED
//! ```
//!
//! Domains are processed sequentially. A failed domain never stops the pass.

pub mod dedup;
pub mod inspect;
pub mod mutate;
pub mod zone;

pub use dedup::DuplicateGroup;
pub use mutate::{DeletionFailure, DeletionReport, RecordMutator, UpdateResult};

use crate::config::{EngineConfig, SyncConfig};
use crate::error::{Error, Result};
use crate::target::DomainTarget;
use crate::traits::{AddressList, AddressSource, DnsProvider, ZoneId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

/// Per-domain reconcile states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainState {
    ResolvingZone,
    Inspecting,
    Creating,
    Deduplicating,
    Updating,
    Done,
    Skipped,
    Failed,
}

impl fmt::Display for DomainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ResolvingZone => "RESOLVING_ZONE",
            Self::Inspecting => "INSPECTING",
            Self::Creating => "CREATING",
            Self::Deduplicating => "DEDUPLICATING",
            Self::Updating => "UPDATING",
            Self::Done => "DONE",
            Self::Skipped => "SKIPPED",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Pass started
    PassStarted { domains: usize, dry_run: bool },

    /// Zone found for a domain
    ZoneResolved { domain: String, zone_id: ZoneId },

    /// No zone for a domain; the domain is skipped
    ZoneNotFound { domain: String },

    /// Matching record sets counted
    RecordsInspected {
        domain: String,
        name: String,
        line: String,
        record_type: String,
        matched: usize,
    },

    /// More than one record set matched
    DuplicatesFound {
        domain: String,
        kept_id: String,
        extra_ids: Vec<String>,
    },

    /// A duplicate was deleted
    DuplicateDeleted { domain: String, record_id: String },

    /// A duplicate could not be deleted
    DuplicateDeleteFailed {
        domain: String,
        record_id: String,
        error: String,
    },

    /// A record set was created
    RecordCreated {
        domain: String,
        zone_id: ZoneId,
        record_id: String,
        name: String,
        line: String,
        record_type: String,
        ttl: u32,
        values: Vec<String>,
    },

    /// The kept record set got new values
    RecordUpdated {
        domain: String,
        zone_id: ZoneId,
        record_id: String,
        previous: Vec<String>,
        values: Vec<String>,
    },

    /// The kept record set already had the desired values
    RecordUnchanged { domain: String, record_id: String },

    /// The domain's pass failed
    DomainFailed {
        domain: String,
        state: DomainState,
        error: String,
    },

    /// Pass finished
    PassFinished {
        done: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Terminal outcome of one domain's pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DomainOutcome {
    /// Record set created, updated or confirmed
    Done {
        zone_id: ZoneId,
        result: UpdateResult,
        deletions: DeletionReport,
    },
    /// Nothing to do for this domain (no zone)
    Skipped { reason: String },
    /// The pass stopped in `state`
    Failed { state: DomainState, error: String },
}

impl DomainOutcome {
    pub fn state(&self) -> DomainState {
        match self {
            Self::Done { .. } => DomainState::Done,
            Self::Skipped { .. } => DomainState::Skipped,
            Self::Failed { .. } => DomainState::Failed,
        }
    }

    /// Whether at most one matching record set is known to remain
    pub fn is_converged(&self) -> bool {
        match self {
            Self::Done { deletions, .. } => deletions.is_complete(),
            _ => false,
        }
    }
}

/// Outcome of one domain, with its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    pub domain: String,
    pub target_name: String,
    pub line: String,
    pub record_type: String,
    pub outcome: DomainOutcome,
}

/// Outcome of a whole pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub domains: Vec<DomainReport>,
}

impl SyncReport {
    fn count(&self, state: DomainState) -> usize {
        self.domains
            .iter()
            .filter(|d| d.outcome.state() == state)
            .count()
    }

    pub fn done(&self) -> usize {
        self.count(DomainState::Done)
    }

    pub fn skipped(&self) -> usize {
        self.count(DomainState::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(DomainState::Failed)
    }

    /// Done domains whose duplicates were not all removed
    pub fn incomplete(&self) -> usize {
        self.domains
            .iter()
            .filter(|d| d.outcome.state() == DomainState::Done && !d.outcome.is_converged())
            .count()
    }

    /// Look up a domain's outcome by its (name, line, type) triple
    pub fn outcome_for(
        &self,
        target_name: &str,
        line: &str,
        record_type: &str,
    ) -> Option<&DomainOutcome> {
        self.domains
            .iter()
            .find(|d| d.target_name == target_name && d.line == line && d.record_type == record_type)
            .map(|d| &d.outcome)
    }
}

/// Core reconcile engine
///
/// The engine owns the provider and the address source, both injected at
/// construction. It runs one pass over the configured targets per call to
/// [`SyncEngine::run_once()`].
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Drain the returned event receiver (audit log)
/// 3. Call [`SyncEngine::run_once()`]
///
/// ## Threading
///
/// Everything runs on the calling task. Provider calls are awaited one at a
/// time, so a slow call delays the rest of the pass.
pub struct SyncEngine {
    /// DNS provider for zone data
    provider: Box<dyn DnsProvider>,

    /// Source of desired addresses
    address_source: Box<dyn AddressSource>,

    /// Targets in processing order
    targets: Vec<DomainTarget>,

    /// Engine settings
    settings: EngineConfig,

    /// Event sender for the audit log
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// Returns the engine and the receiver for its events.
    pub fn new(
        provider: Box<dyn DnsProvider>,
        address_source: Box<dyn AddressSource>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);
        let targets = config.targets();

        let engine = Self {
            provider,
            address_source,
            targets,
            settings: config.engine,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Targets this engine reconciles, in order
    pub fn targets(&self) -> &[DomainTarget] {
        &self.targets
    }

    /// Run one reconcile pass over every target
    ///
    /// Never fails: per-domain errors are reported in the returned
    /// [`SyncReport`] and as events.
    pub async fn run_once(&self) -> SyncReport {
        let started_at = Utc::now();
        info!(
            "Starting reconcile pass over {} domain(s) with provider {} [mode: {}]",
            self.targets.len(),
            self.provider.provider_name(),
            if self.settings.dry_run { "DRY-RUN" } else { "LIVE" }
        );
        self.emit_event(EngineEvent::PassStarted {
            domains: self.targets.len(),
            dry_run: self.settings.dry_run,
        });

        let mut domains = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            info!(
                "Processing domain: {}, record: {}, line: {}, type: {}",
                target.domain_name, target.target_name, target.line, target.record_type
            );

            let outcome = self.reconcile_domain(target).await;
            debug!("Domain {} finished in state {}", target.domain_name, outcome.state());

            domains.push(DomainReport {
                domain: target.domain_name.clone(),
                target_name: target.target_name.clone(),
                line: target.line.clone(),
                record_type: target.record_type.clone(),
                outcome,
            });
        }

        let report = SyncReport {
            started_at,
            finished_at: Utc::now(),
            domains,
        };

        info!(
            "Reconcile pass finished: {} done, {} skipped, {} failed",
            report.done(),
            report.skipped(),
            report.failed()
        );
        self.emit_event(EngineEvent::PassFinished {
            done: report.done(),
            skipped: report.skipped(),
            failed: report.failed(),
        });

        report
    }

    /// Run the state machine for one target, containing every failure
    pub async fn reconcile_domain(&self, target: &DomainTarget) -> DomainOutcome {
        let mut state = DomainState::ResolvingZone;

        match self.reconcile(target, &mut state).await {
            Ok(outcome) => outcome,
            Err(Error::ZoneNotFound { domain }) => self.zone_not_found(&domain),
            Err(e) => {
                error!(
                    "Failed to process domain '{}' in state {}: {}",
                    target.domain_name, state, e
                );
                self.emit_event(EngineEvent::DomainFailed {
                    domain: target.domain_name.clone(),
                    state,
                    error: e.to_string(),
                });
                DomainOutcome::Failed {
                    state,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn reconcile(
        &self,
        target: &DomainTarget,
        state: &mut DomainState,
    ) -> Result<DomainOutcome> {
        let provider = self.provider.as_ref();
        let domain = &target.domain_name;

        let zone_id = zone::resolve_zone(provider, domain)
            .await?
            .ok_or_else(|| Error::zone_not_found(domain.clone()))?;
        self.emit_event(EngineEvent::ZoneResolved {
            domain: domain.clone(),
            zone_id: zone_id.clone(),
        });

        *state = DomainState::Inspecting;
        let key = target.key();
        let matching = inspect::find_matching(provider, &zone_id, &key).await?;
        self.emit_event(EngineEvent::RecordsInspected {
            domain: domain.clone(),
            name: key.name.to_string(),
            line: key.line.to_string(),
            record_type: key.record_type.to_string(),
            matched: matching.len(),
        });

        let group = DuplicateGroup::resolve(matching, self.settings.survivor_strategy);
        let mutator = RecordMutator::new(
            provider,
            self.settings.update_mode,
            self.settings.deletion_policy,
            self.settings.dry_run,
        );

        let Some(kept) = group.kept.as_ref() else {
            *state = DomainState::Creating;
            info!(
                "No existing record for name '{}', line '{}' and type '{}' in domain '{}'. Creating new record",
                target.target_name, target.line, target.record_type, domain
            );

            let addresses = self.read_addresses(target).await?;
            let ttl = target.ttl.unwrap_or(self.settings.default_ttl);
            let result = mutator.create(&zone_id, target, &addresses, ttl).await?;

            self.emit_event(EngineEvent::RecordCreated {
                domain: domain.clone(),
                zone_id: zone_id.clone(),
                record_id: result.record_id().to_string(),
                name: target.target_name.clone(),
                line: target.line.clone(),
                record_type: target.record_type.clone(),
                ttl,
                values: addresses.into_inner(),
            });

            return Ok(DomainOutcome::Done {
                zone_id,
                result,
                deletions: DeletionReport::default(),
            });
        };

        let deletions = if group.has_duplicates() {
            *state = DomainState::Deduplicating;
            warn!(
                "Found {} duplicate record(s) for '{}' in domain '{}', keeping {}",
                group.extras.len(),
                target.target_name,
                domain,
                kept.id
            );
            self.emit_event(EngineEvent::DuplicatesFound {
                domain: domain.clone(),
                kept_id: kept.id.clone(),
                extra_ids: group.extra_ids(),
            });

            let report = mutator.delete_extras(&zone_id, &group.extras).await;
            for record_id in &report.deleted {
                self.emit_event(EngineEvent::DuplicateDeleted {
                    domain: domain.clone(),
                    record_id: record_id.clone(),
                });
            }
            for failure in &report.failed {
                self.emit_event(EngineEvent::DuplicateDeleteFailed {
                    domain: domain.clone(),
                    record_id: failure.record_id.clone(),
                    error: failure.error.clone(),
                });
            }
            if !report.not_attempted.is_empty() {
                warn!(
                    "Deletion aborted in domain '{}', records not attempted: {:?}",
                    domain, report.not_attempted
                );
            }
            report
        } else {
            DeletionReport::default()
        };

        *state = DomainState::Updating;
        let addresses = self.read_addresses(target).await?;
        let result = mutator.update(&zone_id, kept, &addresses).await?;

        match &result {
            UpdateResult::Updated {
                record_id,
                previous,
                values,
            } => self.emit_event(EngineEvent::RecordUpdated {
                domain: domain.clone(),
                zone_id: zone_id.clone(),
                record_id: record_id.clone(),
                previous: previous.clone(),
                values: values.clone(),
            }),
            UpdateResult::Unchanged { record_id } => self.emit_event(EngineEvent::RecordUnchanged {
                domain: domain.clone(),
                record_id: record_id.clone(),
            }),
            UpdateResult::Created { .. } => {}
        }

        Ok(DomainOutcome::Done {
            zone_id,
            result,
            deletions,
        })
    }

    fn zone_not_found(&self, domain: &str) -> DomainOutcome {
        warn!("Skipping domain '{}': zone not found", domain);
        self.emit_event(EngineEvent::ZoneNotFound {
            domain: domain.to_string(),
        });
        DomainOutcome::Skipped {
            reason: format!("zone not found for '{}'", domain),
        }
    }

    /// Read and check the desired addresses of `target`
    async fn read_addresses(&self, target: &DomainTarget) -> Result<AddressList> {
        let addresses = self
            .address_source
            .read(&target.address_source, target.desired_count)
            .await?;
        let addresses = AddressList::with_cap(addresses.into_inner(), target.desired_count);
        addresses.validate_for(&target.record_type)?;

        info!(
            "Extracted {} address(es) from {} via {}",
            addresses.len(),
            target.address_source,
            self.address_source.source_name()
        );
        Ok(addresses)
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // Bounded channel: drop rather than grow without limit
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Event receiver dropped, event discarded");
            }
        }
    }
}

//! Record mutation
//!
//! Create, update and delete calls against the provider, with dry-run
//! support. No call is retried.

use crate::config::{DeletionPolicy, UpdateMode};
use crate::error::Result;
use crate::target::DomainTarget;
use crate::traits::{AddressList, DnsProvider, NewRecordSet, RecordSet, RecordSetUpdate, ZoneId};
use serde::Serialize;
use tracing::{error, info};

/// Record id reported for mutations skipped in dry-run mode
pub const DRY_RUN_RECORD_ID: &str = "<dry-run>";

/// Result of a create or update step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpdateResult {
    /// Record set was created (none matched before)
    Created {
        record_id: String,
        values: Vec<String>,
        ttl: u32,
    },
    /// Kept record set got new values
    Updated {
        record_id: String,
        previous: Vec<String>,
        values: Vec<String>,
    },
    /// Kept record set already had the desired values
    Unchanged { record_id: String },
}

impl UpdateResult {
    pub fn record_id(&self) -> &str {
        match self {
            Self::Created { record_id, .. }
            | Self::Updated { record_id, .. }
            | Self::Unchanged { record_id } => record_id,
        }
    }
}

/// A deletion that failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    pub record_id: String,
    pub error: String,
}

/// Outcome of deleting a duplicate group's extras
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Deleted ids, in deletion order
    pub deleted: Vec<String>,
    /// Failed deletions, in attempt order
    pub failed: Vec<DeletionFailure>,
    /// Ids never attempted because an earlier deletion failed
    pub not_attempted: Vec<String>,
}

impl DeletionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.not_attempted.is_empty()
    }
}

/// Performs provider mutations for one domain
pub struct RecordMutator<'a> {
    provider: &'a dyn DnsProvider,
    update_mode: UpdateMode,
    deletion_policy: DeletionPolicy,
    dry_run: bool,
}

impl<'a> RecordMutator<'a> {
    pub fn new(
        provider: &'a dyn DnsProvider,
        update_mode: UpdateMode,
        deletion_policy: DeletionPolicy,
        dry_run: bool,
    ) -> Self {
        Self {
            provider,
            update_mode,
            deletion_policy,
            dry_run,
        }
    }

    /// Create the target's record set with `addresses`
    pub async fn create(
        &self,
        zone: &ZoneId,
        target: &DomainTarget,
        addresses: &AddressList,
        ttl: u32,
    ) -> Result<UpdateResult> {
        let record = NewRecordSet {
            name: target.target_name.clone(),
            record_type: target.record_type.clone(),
            line: target.line.clone(),
            ttl,
            values: addresses.as_slice().to_vec(),
        };

        if self.dry_run {
            info!(
                "[DRY-RUN] Would create record '{}' (line '{}', type '{}', ttl {}) in zone {} with values {:?}",
                record.name, record.line, record.record_type, record.ttl, zone, record.values
            );
            return Ok(UpdateResult::Created {
                record_id: DRY_RUN_RECORD_ID.to_string(),
                values: record.values,
                ttl,
            });
        }

        let created = self.provider.create_record_set(zone, &record).await?;

        info!(
            "Created record {} '{}' (line '{}', type '{}', ttl {}) in zone {} with values {:?}",
            created.id, record.name, record.line, record.record_type, ttl, zone, record.values
        );

        Ok(UpdateResult::Created {
            record_id: created.id,
            values: record.values,
            ttl,
        })
    }

    /// Replace the values of the kept record set
    ///
    /// Skips the call when `kept` already holds exactly `addresses`.
    pub async fn update(
        &self,
        zone: &ZoneId,
        kept: &RecordSet,
        addresses: &AddressList,
    ) -> Result<UpdateResult> {
        if kept.values.as_slice() == addresses.as_slice() {
            info!(
                "Record {} in zone {} already has values {:?}",
                kept.id, zone, kept.values
            );
            return Ok(UpdateResult::Unchanged {
                record_id: kept.id.clone(),
            });
        }

        let values = addresses.as_slice().to_vec();
        let update = match self.update_mode {
            UpdateMode::Partial => RecordSetUpdate::values_only(kept.id.clone(), values),
            UpdateMode::Full => RecordSetUpdate::full(kept, values),
        };

        if self.dry_run {
            info!(
                "[DRY-RUN] Would update record {} in zone {}: {:?} -> {:?}",
                kept.id, zone, kept.values, update.values
            );
        } else {
            self.provider.update_record_set(zone, &update).await?;
            info!(
                "Updated record {} in zone {}: {:?} -> {:?}",
                kept.id, zone, kept.values, update.values
            );
        }

        Ok(UpdateResult::Updated {
            record_id: kept.id.clone(),
            previous: kept.values.clone(),
            values: update.values,
        })
    }

    /// Delete `extras` in order, according to the deletion policy
    pub async fn delete_extras(&self, zone: &ZoneId, extras: &[RecordSet]) -> DeletionReport {
        let mut report = DeletionReport::default();

        for (index, extra) in extras.iter().enumerate() {
            if self.dry_run {
                info!("[DRY-RUN] Would delete record {} in zone {}", extra.id, zone);
                report.deleted.push(extra.id.clone());
                continue;
            }

            match self.provider.delete_record_set(zone, &extra.id).await {
                Ok(()) => {
                    info!("Deleted record {} in zone {}", extra.id, zone);
                    report.deleted.push(extra.id.clone());
                }
                Err(e) => {
                    error!("Failed to delete record {} in zone {}: {}", extra.id, zone, e);
                    report.failed.push(DeletionFailure {
                        record_id: extra.id.clone(),
                        error: e.to_string(),
                    });

                    if self.deletion_policy == DeletionPolicy::AbortOnFirstError {
                        report.not_attempted = extras[index + 1..]
                            .iter()
                            .map(|r| r.id.clone())
                            .collect();
                        break;
                    }
                }
            }
        }

        report
    }
}

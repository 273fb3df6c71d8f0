//! Contract Test: Dry Run
//!
//! This test verifies that dry-run mode reads but never writes.
//!
//! Constraints verified:
//! - Zones and record sets are still listed
//! - No create, update or delete call reaches the provider
//! - The report describes what a live pass would have done

mod common;

use common::*;
use zonesync_core::config::DomainConfig;
use zonesync_core::engine::mutate::DRY_RUN_RECORD_ID;
use zonesync_core::{DomainOutcome, UpdateResult};

#[tokio::test]
async fn dry_run_never_mutates() {
    let provider = FakeProvider::new().with_zone("x.com.", "zone-x");
    provider.seed("zone-x", record("rs-1", "www.x.com.", Some("default"), &["1.1.1.1"]));
    provider.seed("zone-x", record("rs-2", "www.x.com.", Some("default"), &["2.2.2.2"]));
    let before = provider.records("zone-x");

    let source = StaticAddressSource::new()
        .with_list("www.csv", &["9.9.9.9"])
        .with_list("api.csv", &["10.0.0.1"]);
    let mut config = config_for(
        vec![
            DomainConfig::new("x.com.", "www.x.com.", "default", "www.csv"),
            DomainConfig::new("x.com.", "api.x.com.", "default", "api.csv"),
        ],
        5,
    );
    config.engine.dry_run = true;

    let (engine, _rx) = engine_with(&provider, &source, config);
    let report = engine.run_once().await;

    assert_eq!(provider.mutation_count(), 0);
    assert_eq!(provider.records("zone-x"), before);

    match report.outcome_for("www.x.com.", "default", "A") {
        Some(DomainOutcome::Done {
            result, deletions, ..
        }) => {
            assert!(matches!(result, UpdateResult::Updated { .. }));
            assert_eq!(deletions.deleted, vec!["rs-2"]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    match report.outcome_for("api.x.com.", "default", "A") {
        Some(DomainOutcome::Done { result, .. }) => {
            assert_eq!(result.record_id(), DRY_RUN_RECORD_ID);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

//! Test doubles and common utilities for reconcile contract tests
//!
//! `FakeProvider` keeps an in-memory zone store and logs every call, so
//! tests can assert both on the final remote state and on the calls made.
//! Clones share state, which lets a test keep a handle after boxing one
//! into the engine.

#![allow(dead_code)]

use zonesync_core::config::{
    AddressSourceConfig, Credentials, DomainConfig, EngineConfig, ProviderConfig, SyncConfig,
};
use zonesync_core::error::{Error, Result};
use zonesync_core::traits::{
    AddressList, AddressSource, DnsProvider, NewRecordSet, RecordSet, RecordSetUpdate, Zone,
    ZoneId,
};
use zonesync_core::{EngineEvent, SyncEngine};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A provider call, as seen by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListZones(String),
    ListRecordSets(String),
    Create { zone: String, name: String },
    Update(RecordSetUpdate),
    Delete { zone: String, record_id: String },
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::Create { .. } | Call::Update(_) | Call::Delete { .. })
    }
}

/// Operations a failure can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Keyed by domain name
    ListZones,
    /// Keyed by zone id
    ListRecordSets,
    /// Keyed by record name
    Create,
    /// Keyed by record id
    Update,
    /// Keyed by record id
    Delete,
}

#[derive(Default)]
struct FakeState {
    zones: Vec<Zone>,
    records: HashMap<ZoneId, Vec<RecordSet>>,
    calls: Vec<Call>,
    failures: HashSet<(Op, String)>,
    next_id: usize,
}

/// In-memory DnsProvider
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host `domain` as zone `zone_id`
    pub fn with_zone(self, domain: &str, zone_id: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.zones.push(Zone {
                id: ZoneId::new(zone_id),
                name: domain.to_string(),
            });
            state.records.entry(ZoneId::new(zone_id)).or_default();
        }
        self
    }

    /// Add an existing record set to a zone, in listing order
    pub fn seed(&self, zone_id: &str, record: RecordSet) {
        let mut state = self.state.lock().unwrap();
        state
            .records
            .entry(ZoneId::new(zone_id))
            .or_default()
            .push(record);
    }

    /// Make `op` fail whenever it is called with `key`
    pub fn fail_on(&self, op: Op, key: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((op, key.to_string()));
    }

    /// Current record sets of a zone, in listing order
    pub fn records(&self, zone_id: &str) -> Vec<RecordSet> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(&ZoneId::new(zone_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Record sets of a zone matching a (name, line, type) triple
    pub fn matching(&self, zone_id: &str, name: &str, line: &str, record_type: &str) -> Vec<RecordSet> {
        self.records(zone_id)
            .into_iter()
            .filter(|r| r.name == name && r.effective_line() == line && r.record_type == record_type)
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_mutation()).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn check(state: &FakeState, op: Op, key: &str) -> Result<()> {
        if state.failures.contains(&(op, key.to_string())) {
            return Err(Error::provider_request(
                "fake",
                Some(500),
                format!("injected {:?} failure for {}", op, key),
            ));
        }
        Ok(())
    }

    fn not_found(record_id: &str) -> Error {
        Error::provider_request("fake", Some(404), format!("record set {} not found", record_id))
    }
}

#[async_trait::async_trait]
impl DnsProvider for FakeProvider {
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListZones(name.to_string()));
        Self::check(&state, Op::ListZones, name)?;

        // Substring match, like a provider API that matches names loosely
        Ok(state
            .zones
            .iter()
            .filter(|zone| zone.name.contains(name))
            .cloned()
            .collect())
    }

    async fn list_record_sets(&self, zone: &ZoneId) -> Result<Vec<RecordSet>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListRecordSets(zone.to_string()));
        Self::check(&state, Op::ListRecordSets, zone.as_str())?;

        Ok(state.records.get(zone).cloned().unwrap_or_default())
    }

    async fn create_record_set(&self, zone: &ZoneId, record: &NewRecordSet) -> Result<RecordSet> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            zone: zone.to_string(),
            name: record.name.clone(),
        });
        Self::check(&state, Op::Create, &record.name)?;

        state.next_id += 1;
        let created = RecordSet {
            id: format!("created-{}", state.next_id),
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            line: Some(record.line.clone()),
            ttl: Some(record.ttl),
            values: record.values.clone(),
            created_at: None,
        };
        state
            .records
            .entry(zone.clone())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_record_set(&self, zone: &ZoneId, update: &RecordSetUpdate) -> Result<RecordSet> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update(update.clone()));
        Self::check(&state, Op::Update, &update.id)?;

        let record = state
            .records
            .get_mut(zone)
            .and_then(|records| records.iter_mut().find(|r| r.id == update.id))
            .ok_or_else(|| Self::not_found(&update.id))?;

        record.values = update.values.clone();
        if let Some(ttl) = update.ttl {
            record.ttl = Some(ttl);
        }
        if let Some(line) = &update.line {
            record.line = Some(line.clone());
        }
        Ok(record.clone())
    }

    async fn delete_record_set(&self, zone: &ZoneId, record_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete {
            zone: zone.to_string(),
            record_id: record_id.to_string(),
        });
        Self::check(&state, Op::Delete, record_id)?;

        let records = state
            .records
            .get_mut(zone)
            .ok_or_else(|| Self::not_found(record_id))?;
        let before = records.len();
        records.retain(|r| r.id != record_id);
        if records.len() == before {
            return Err(Self::not_found(record_id));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Address source serving fixed lists by reference
#[derive(Clone, Default)]
pub struct StaticAddressSource {
    lists: Arc<Mutex<HashMap<String, Vec<String>>>>,
    read_count: Arc<AtomicUsize>,
}

impl StaticAddressSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, reference: &str, values: &[&str]) -> Self {
        self.lists.lock().unwrap().insert(
            reference.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Get the number of times read() was called
    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AddressSource for StaticAddressSource {
    async fn read(&self, reference: &str, limit: usize) -> Result<AddressList> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        let lists = self.lists.lock().unwrap();
        let values = lists
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::address_source(format!("{} not found", reference)))?;
        Ok(AddressList::with_cap(values, limit))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// A record set in provider form
pub fn record(id: &str, name: &str, line: Option<&str>, values: &[&str]) -> RecordSet {
    RecordSet {
        id: id.to_string(),
        name: name.to_string(),
        record_type: "A".to_string(),
        line: line.map(str::to_string),
        ttl: Some(600),
        values: values.iter().map(|v| v.to_string()).collect(),
        created_at: None,
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Helper to create a SyncConfig for testing
pub fn config_for(domains: Vec<DomainConfig>, n_rows: usize) -> SyncConfig {
    SyncConfig {
        provider: ProviderConfig::new(Credentials::new("test-ak", "test-sk"), "cn-north-4"),
        address_source: AddressSourceConfig::new(n_rows),
        domains,
        engine: EngineConfig {
            event_channel_capacity: 100,
            ..EngineConfig::default()
        },
    }
}

/// Build an engine over clones of the given doubles
pub fn engine_with(
    provider: &FakeProvider,
    source: &StaticAddressSource,
    config: SyncConfig,
) -> (SyncEngine, mpsc::Receiver<EngineEvent>) {
    SyncEngine::new(Box::new(provider.clone()), Box::new(source.clone()), config)
        .expect("engine construction succeeds")
}

/// Drain every event currently buffered
pub fn drain_events(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

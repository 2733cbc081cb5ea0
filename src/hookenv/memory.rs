//! In-memory hook environment.
//!
//! Holds the relation graph, leader settings and options a test arranges,
//! and records every write a handler performs so assertions can inspect
//! them afterwards.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::config::CharmOptions;
use crate::error::Result;
use crate::hookenv::{HookEnvironment, RelationData, WorkloadStatus};

#[derive(Debug, Default)]
struct Relation {
    endpoint: String,
    units: BTreeMap<String, RelationData>,
}

#[derive(Debug, Default)]
struct Inner {
    options: CharmOptions,
    relations: BTreeMap<String, Relation>,
    bindings: BTreeMap<String, String>,
    leader: RelationData,
    is_leader: bool,
    relation_sets: Vec<(Option<String>, RelationData)>,
    leader_sets: Vec<RelationData>,
    opened_ports: Vec<u16>,
    statuses: Vec<WorkloadStatus>,
    action_results: Vec<RelationData>,
    action_failures: Vec<String>,
}

#[derive(Debug)]
pub struct MemoryEnvironment {
    unit: String,
    private_address: String,
    inner: Mutex<Inner>,
}

impl Default for MemoryEnvironment {
    fn default() -> Self {
        Self::new("heat/0", "10.5.0.10")
    }
}

impl MemoryEnvironment {
    pub fn new(unit: impl Into<String>, private_address: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            private_address: private_address.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_options(&self, options: CharmOptions) {
        self.lock().options = options;
    }

    pub fn update_options(&self, f: impl FnOnce(&mut CharmOptions)) {
        f(&mut self.lock().options);
    }

    pub fn set_leader(&self, is_leader: bool) {
        self.lock().is_leader = is_leader;
    }

    pub fn set_leader_data(&self, data: RelationData) {
        self.lock().leader = data;
    }

    pub fn set_binding(&self, binding: &str, address: &str) {
        self.lock()
            .bindings
            .insert(binding.to_string(), address.to_string());
    }

    /// Establish a relation without any remote units yet.
    pub fn add_relation(&self, endpoint: &str, relation_id: &str) {
        self.lock()
            .relations
            .entry(relation_id.to_string())
            .or_insert_with(|| Relation {
                endpoint: endpoint.to_string(),
                units: BTreeMap::new(),
            });
    }

    /// Add (or replace) a remote unit's settings on a relation.
    pub fn add_unit(&self, endpoint: &str, relation_id: &str, unit: &str, data: RelationData) {
        self.add_relation(endpoint, relation_id);
        if let Some(rel) = self.lock().relations.get_mut(relation_id) {
            rel.units.insert(unit.to_string(), data);
        }
    }

    pub fn relation_sets(&self) -> Vec<(Option<String>, RelationData)> {
        self.lock().relation_sets.clone()
    }

    /// Settings most recently published on a relation id.
    pub fn last_relation_set(&self, relation_id: Option<&str>) -> Option<RelationData> {
        self.lock()
            .relation_sets
            .iter()
            .rev()
            .find(|(rid, _)| rid.as_deref() == relation_id)
            .map(|(_, data)| data.clone())
    }

    pub fn leader_sets(&self) -> Vec<RelationData> {
        self.lock().leader_sets.clone()
    }

    pub fn leader_data(&self) -> RelationData {
        self.lock().leader.clone()
    }

    pub fn opened_ports(&self) -> Vec<u16> {
        self.lock().opened_ports.clone()
    }

    pub fn statuses(&self) -> Vec<WorkloadStatus> {
        self.lock().statuses.clone()
    }

    pub fn action_results(&self) -> Vec<RelationData> {
        self.lock().action_results.clone()
    }

    pub fn action_failures(&self) -> Vec<String> {
        self.lock().action_failures.clone()
    }
}

#[async_trait]
impl HookEnvironment for MemoryEnvironment {
    async fn config(&self) -> Result<CharmOptions> {
        Ok(self.lock().options.clone())
    }

    async fn relation_ids(&self, endpoint: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .relations
            .iter()
            .filter(|(_, rel)| rel.endpoint == endpoint)
            .map(|(rid, _)| rid.clone())
            .collect())
    }

    async fn related_units(&self, relation_id: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .relations
            .get(relation_id)
            .map(|rel| rel.units.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn relation_get(&self, relation_id: &str, unit: &str) -> Result<RelationData> {
        Ok(self
            .lock()
            .relations
            .get(relation_id)
            .and_then(|rel| rel.units.get(unit).cloned())
            .unwrap_or_default())
    }

    async fn relation_set(&self, relation_id: Option<&str>, settings: &RelationData) -> Result<()> {
        self.lock()
            .relation_sets
            .push((relation_id.map(str::to_string), settings.clone()));
        Ok(())
    }

    async fn leader_get(&self) -> Result<RelationData> {
        Ok(self.lock().leader.clone())
    }

    async fn leader_set(&self, settings: &RelationData) -> Result<()> {
        let mut inner = self.lock();
        inner.leader_sets.push(settings.clone());
        for (k, v) in settings {
            if v.is_empty() {
                inner.leader.remove(k);
            } else {
                inner.leader.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }

    async fn is_leader(&self) -> Result<bool> {
        Ok(self.lock().is_leader)
    }

    fn local_unit(&self) -> String {
        self.unit.clone()
    }

    async fn private_address(&self) -> Result<String> {
        Ok(self.private_address.clone())
    }

    async fn binding_address(&self, binding: &str) -> Result<Option<String>> {
        Ok(self.lock().bindings.get(binding).cloned())
    }

    async fn open_port(&self, port: u16) -> Result<()> {
        self.lock().opened_ports.push(port);
        Ok(())
    }

    async fn status_set(&self, status: &WorkloadStatus) -> Result<()> {
        self.lock().statuses.push(status.clone());
        Ok(())
    }

    async fn action_set(&self, values: &RelationData) -> Result<()> {
        self.lock().action_results.push(values.clone());
        Ok(())
    }

    async fn action_fail(&self, message: &str) -> Result<()> {
        self.lock().action_failures.push(message.to_string());
        Ok(())
    }
}

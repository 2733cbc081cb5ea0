//! Juju hook environment.
//!
//! # Data Flow
//! ```text
//! Juju agent
//!     → runs hooks/<name> (argv[0], JUJU_HOOK_NAME)
//!     → event.rs (hook name → HookEvent)
//!
//! Handlers
//!     → HookEnvironment trait
//!         - juju.rs (hook tools: config-get, relation-get/set, leader-get/set, ...)
//!         - memory.rs (in-memory double for tests)
//! ```
//!
//! # Design Decisions
//! - Hook tools are reached through one trait so handlers stay testable
//! - Relation values are flat strings; an empty value unsets the key
//! - Reads happen once per invocation into `HookState`, writes go straight out

pub mod event;
pub mod juju;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use crate::config::CharmOptions;
use crate::error::Result;

pub use event::HookEvent;
pub use juju::JujuCli;
pub use memory::MemoryEnvironment;

/// Flat key/value settings of one unit on one relation (or leader settings).
pub type RelationData = BTreeMap<String, String>;

/// Workload status states understood by `status-set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadState {
    Maintenance,
    Blocked,
    Waiting,
    Active,
}

impl fmt::Display for WorkloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkloadState::Maintenance => "maintenance",
            WorkloadState::Blocked => "blocked",
            WorkloadState::Waiting => "waiting",
            WorkloadState::Active => "active",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadStatus {
    pub state: WorkloadState,
    pub message: String,
}

impl WorkloadStatus {
    pub fn new(state: WorkloadState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }

    pub fn maintenance(message: impl Into<String>) -> Self {
        Self::new(WorkloadState::Maintenance, message)
    }
}

/// Access to the Juju hook tools for the running unit.
#[async_trait]
pub trait HookEnvironment: Send + Sync {
    /// Charm options (`config-get`).
    async fn config(&self) -> Result<CharmOptions>;

    /// Relation ids established on an endpoint.
    async fn relation_ids(&self, endpoint: &str) -> Result<Vec<String>>;

    /// Remote units on a relation.
    async fn related_units(&self, relation_id: &str) -> Result<Vec<String>>;

    /// Settings a remote unit published on a relation.
    async fn relation_get(&self, relation_id: &str, unit: &str) -> Result<RelationData>;

    /// Publish local settings. `None` targets the relation of the running hook.
    async fn relation_set(&self, relation_id: Option<&str>, settings: &RelationData) -> Result<()>;

    async fn leader_get(&self) -> Result<RelationData>;

    async fn leader_set(&self, settings: &RelationData) -> Result<()>;

    async fn is_leader(&self) -> Result<bool>;

    /// Name of the running unit, e.g. `heat/0`.
    fn local_unit(&self) -> String;

    async fn private_address(&self) -> Result<String>;

    /// Primary address bound to an endpoint, when Juju knows about bindings.
    async fn binding_address(&self, binding: &str) -> Result<Option<String>>;

    async fn open_port(&self, port: u16) -> Result<()>;

    async fn status_set(&self, status: &WorkloadStatus) -> Result<()>;

    /// Record action results (`action-set`).
    async fn action_set(&self, values: &RelationData) -> Result<()>;

    async fn action_fail(&self, message: &str) -> Result<()>;
}

/// Build relation settings from key/value pairs.
pub fn settings<K, V, I>(pairs: I) -> RelationData
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

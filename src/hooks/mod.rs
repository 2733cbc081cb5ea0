//! Hook handlers.
//!
//! # Data Flow
//! ```text
//! HookEvent
//!     → Charm::dispatch (match on event)
//!         - RestartGuard::capture (handlers that restart on change)
//!         - handler (install.rs, config_changed.rs, relations.rs, ha.rs,
//!           leader.rs, upgrade.rs)
//!         - RestartGuard::restart_changed
//!     → status.rs (assess_status after every hook)
//! ```
//!
//! # Design Decisions
//! - One `Charm` value per process owns the snapshot and the registry; there
//!   is no global state
//! - Handlers that re-run other handlers (config-changed re-running
//!   cluster-joined) call them directly with an explicit relation id
//! - Incomplete relation data is an outcome, not an error

pub mod config_changed;
pub mod ha;
pub mod install;
pub mod leader;
pub mod relations;
pub mod status;
pub mod upgrade;

use std::sync::Arc;

use crate::config::CharmSettings;
use crate::error::{CharmError, Result};
use crate::hookenv::event::{Endpoint, RelationPhase};
use crate::hookenv::{HookEnvironment, HookEvent};
use crate::host::Host;
use crate::render::ConfigRegistry;
use crate::restart::RestartGuard;
use crate::state::HookState;

/// How a handler finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Done,
    /// Relation data is not complete yet; nothing was rendered.
    Incomplete(&'static str),
    /// The handler had nothing to do on this unit.
    Skipped,
}

pub struct Charm {
    env: Arc<dyn HookEnvironment>,
    host: Arc<dyn Host>,
    settings: CharmSettings,
    state: HookState,
    registry: ConfigRegistry,
}

impl Charm {
    /// Snapshot the environment and build the registry for the detected
    /// release.
    pub async fn load(
        env: Arc<dyn HookEnvironment>,
        host: Arc<dyn Host>,
        settings: CharmSettings,
    ) -> Result<Self> {
        let state = HookState::gather(env.as_ref(), host.as_ref(), &settings).await?;
        let registry = ConfigRegistry::new(state.effective_release());
        tracing::debug!(
            unit = %state.local_unit,
            release = %registry.release(),
            leader = state.is_leader,
            "Loaded hook state"
        );
        Ok(Self {
            env,
            host,
            settings,
            state,
            registry,
        })
    }

    pub fn state(&self) -> &HookState {
        &self.state
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    pub async fn dispatch(&mut self, event: HookEvent) -> Result<HookOutcome> {
        use Endpoint::*;
        use RelationPhase::*;

        tracing::info!(hook = %event, "Running hook");
        match event {
            HookEvent::Install => self.install().await,
            HookEvent::UpdateStatus => Ok(HookOutcome::Done),
            HookEvent::LeaderElected => self.leader_elected().await,
            HookEvent::ConfigChanged
            | HookEvent::UpgradeCharm
            | HookEvent::LeaderSettingsChanged
            | HookEvent::Relation(Amqp, Changed | Broken)
            | HookEvent::Relation(SharedDb, Changed | Broken)
            | HookEvent::Relation(IdentityService, Changed | Broken)
            | HookEvent::Relation(Cluster, Changed | Departed) => {
                let guard = RestartGuard::capture(self.host.as_ref(), self.registry.release()).await?;
                let outcome = self.run_restartable(event).await?;
                guard.restart_changed(self.host.as_ref()).await?;
                Ok(outcome)
            }
            HookEvent::Relation(Amqp, Joined) => self.amqp_joined(None).await,
            HookEvent::Relation(SharedDb, Joined) => self.db_joined(None).await,
            HookEvent::Relation(IdentityService, Joined) => self.identity_joined(None).await,
            HookEvent::Relation(Cluster, Joined) => self.cluster_joined(None).await,
            HookEvent::Relation(Ha, Joined) => self.ha_joined(None).await,
            HookEvent::Relation(Ha, Changed) => self.ha_changed().await,
            other => Err(CharmError::UnknownHook(other.to_string())),
        }
    }

    async fn run_restartable(&mut self, event: HookEvent) -> Result<HookOutcome> {
        use Endpoint::*;
        use RelationPhase::*;

        match event {
            HookEvent::ConfigChanged => self.config_changed().await,
            HookEvent::UpgradeCharm => self.upgrade_charm().await,
            HookEvent::Relation(Amqp, Changed) => self.amqp_changed().await,
            HookEvent::Relation(SharedDb, Changed) => self.db_changed().await,
            HookEvent::Relation(IdentityService, Changed) => self.identity_changed().await,
            _ => self.write_all().await,
        }
    }

    /// Render every registered file.
    pub async fn write_all(&self) -> Result<HookOutcome> {
        self.registry
            .write_all(&self.state, self.host.as_ref())
            .await?;
        Ok(HookOutcome::Done)
    }

    pub fn env(&self) -> &dyn HookEnvironment {
        self.env.as_ref()
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hookenv::MemoryEnvironment;
    use crate::host::RecordingHost;

    #[tokio::test]
    async fn test_unsupported_relation_phase_is_unknown() {
        let env = Arc::new(MemoryEnvironment::default());
        let host = Arc::new(RecordingHost::new());
        let mut charm = Charm::load(env, host, CharmSettings::default()).await.unwrap();

        let event = "ha-relation-broken".parse().unwrap();
        assert!(matches!(
            charm.dispatch(event).await,
            Err(CharmError::UnknownHook(name)) if name == "ha-relation-broken"
        ));
    }

    #[tokio::test]
    async fn test_update_status_is_noop() {
        let env = Arc::new(MemoryEnvironment::default());
        let host = Arc::new(RecordingHost::new());
        let mut charm = Charm::load(env, host.clone(), CharmSettings::default())
            .await
            .unwrap();
        let writes = host.write_count();

        assert_eq!(
            charm.dispatch(HookEvent::UpdateStatus).await.unwrap(),
            HookOutcome::Done
        );
        assert_eq!(host.write_count(), writes);
    }
}

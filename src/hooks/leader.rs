//! Leadership hooks and shared secrets.

use crate::error::Result;
use crate::hookenv::RelationData;
use crate::hooks::{Charm, HookOutcome};
use crate::restart::RestartGuard;
use crate::secrets::{pwgen, LEADER_SECRETS};

const SECRET_LENGTH: usize = 32;

impl Charm {
    pub(crate) async fn leader_elected(&mut self) -> Result<HookOutcome> {
        if !self.state.is_leader {
            tracing::debug!("Not the leader, nothing to generate");
            return Ok(HookOutcome::Skipped);
        }
        let guard = RestartGuard::capture(self.host(), self.registry.release()).await?;
        if self.generate_leader_secrets().await? == 0 {
            return Ok(HookOutcome::Done);
        }
        self.write_all().await?;
        guard.restart_changed(self.host()).await?;
        Ok(HookOutcome::Done)
    }

    /// Runs inside the restart guard `dispatch` sets up.
    pub(crate) async fn upgrade_charm(&mut self) -> Result<HookOutcome> {
        if !self.state.is_leader {
            return Ok(HookOutcome::Skipped);
        }
        if self.generate_leader_secrets().await? > 0 {
            self.write_all().await?;
        }
        Ok(HookOutcome::Done)
    }

    /// Generate the leader secrets that do not exist yet. Returns how many
    /// were generated.
    async fn generate_leader_secrets(&mut self) -> Result<usize> {
        let missing: RelationData = LEADER_SECRETS
            .iter()
            .filter(|key| self.state.leader_value(key).is_none())
            .map(|key| (key.to_string(), pwgen(SECRET_LENGTH)))
            .collect();
        if missing.is_empty() {
            return Ok(0);
        }

        self.env().leader_set(&missing).await?;
        tracing::info!(
            keys = ?missing.keys().collect::<Vec<_>>(),
            "Generated leader secrets"
        );
        let count = missing.len();
        self.state.leader.extend(missing);
        Ok(count)
    }
}

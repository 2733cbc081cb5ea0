//! ha relation handlers.

use crate::error::Result;
use crate::hookenv::event::Endpoint;
use crate::ha::build_resources;
use crate::hooks::{Charm, HookOutcome};

impl Charm {
    pub(crate) async fn ha_joined(&self, relation_id: Option<&str>) -> Result<HookOutcome> {
        let data = build_resources(&self.state)?;
        let settings = data.to_relation_settings()?;
        tracing::info!(
            resources = data.resources.len(),
            groups = data.groups.len(),
            "Publishing HA resources"
        );
        self.env().relation_set(relation_id, &settings).await?;
        Ok(HookOutcome::Done)
    }

    pub(crate) async fn ha_changed(&self) -> Result<HookOutcome> {
        if !self.state.is_clustered() {
            tracing::info!("ha_changed: hacluster subordinate not fully clustered");
            return Ok(HookOutcome::Incomplete("ha"));
        }
        tracing::info!("Cluster configured, notifying other services and updating keystone endpoint configuration");
        for rid in self.state.relation_ids(Endpoint::IdentityService) {
            self.identity_joined(Some(rid.as_str())).await?;
        }
        Ok(HookOutcome::Done)
    }
}

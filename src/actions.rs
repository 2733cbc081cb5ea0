//! Juju actions.
//!
//! # Responsibilities
//! - Map action names to handlers
//! - Report results through `action-set` and failures through `action-fail`

use std::fmt;
use std::str::FromStr;

use crate::error::{CharmError, Result};
use crate::hookenv::{settings, HookEvent};
use crate::hooks::Charm;

pub const UPGRADE_COMPLETED: &str = "success, upgrade completed.";
pub const UPGRADE_SKIPPED: &str = "action-managed-upgrade config is False, skipped upgrade.";
pub const NO_UPGRADE: &str = "no upgrade available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenStackUpgrade,
}

impl FromStr for Action {
    type Err = CharmError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "openstack-upgrade" => Ok(Action::OpenStackUpgrade),
            other => Err(CharmError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::OpenStackUpgrade => f.write_str("openstack-upgrade"),
        }
    }
}

/// Upgrade OpenStack when the operator manages upgrades through this action.
pub async fn openstack_upgrade(charm: &mut Charm) -> Result<&'static str> {
    if !charm.state().upgrade_available() {
        return Ok(NO_UPGRADE);
    }
    if !charm.state().options.action_managed_upgrade {
        return Ok(UPGRADE_SKIPPED);
    }
    charm.upgrade_openstack().await?;
    charm.dispatch(HookEvent::ConfigChanged).await?;
    Ok(UPGRADE_COMPLETED)
}

/// Run an action and report its outcome.
///
/// Handler errors become `action-fail`; only failures to talk to Juju are
/// returned.
pub async fn run(charm: &mut Charm, action: Action) -> Result<()> {
    tracing::info!(action = %action, "Running action");
    let result = match action {
        Action::OpenStackUpgrade => openstack_upgrade(charm).await,
    };
    match result {
        Ok(outcome) => {
            tracing::info!(action = %action, outcome, "Action finished");
            charm.env().action_set(&settings([("outcome", outcome)])).await
        }
        Err(e) => {
            tracing::error!(action = %action, error = %e, "Action failed");
            charm.env().action_fail(&e.to_string()).await
        }
    }
}

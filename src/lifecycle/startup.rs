//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate runtime settings
//! - Initialize logging
//! - Wire the real hook environment and host into a `Charm`
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Logging starts right after settings load, before any hook tool runs

use std::path::Path;
use std::sync::Arc;

use crate::config::loader::load_for_charm;
use crate::config::CharmSettings;
use crate::error::Result;
use crate::hookenv::{HookEnvironment, JujuCli};
use crate::hooks::Charm;
use crate::host::{Host, SystemHost};
use crate::observability::logging;

/// Load settings for the charm directory and start logging.
pub fn init(charm_dir: Option<&Path>) -> Result<CharmSettings> {
    let settings = load_for_charm(charm_dir)?;
    logging::init(&settings.logging);
    tracing::debug!(
        root = %settings.paths.root,
        charm_dir = %settings.paths.charm_dir,
        "Settings loaded"
    );
    Ok(settings)
}

/// Build a charm backed by the Juju hook tools and the local machine.
pub async fn load_charm(settings: CharmSettings) -> Result<Charm> {
    let env: Arc<dyn HookEnvironment> = Arc::new(JujuCli::new());
    let host: Arc<dyn Host> = Arc::new(SystemHost::new(&settings.paths.root));
    Charm::load(env, host, settings).await
}

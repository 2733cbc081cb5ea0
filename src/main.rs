//! Heat charm hook runner.
//!
//! # Architecture Overview
//!
//! ```text
//!     hooks/<name> (symlink)          ┌───────────────────────────────────────────┐
//!     ────────────────────────────────┼─▶ HookEvent ──▶ Charm::dispatch          │
//!                                     │                   │                      │
//!                                     │   HookState ◀─────┤                      │
//!                                     │   (config-get,    ▼                      │
//!                                     │    relation-get,  contexts ──▶ render ───┼──▶ /etc/heat, haproxy,
//!                                     │    leader-get)    │                      │    apache2, memcached
//!                                     │                   ▼                      │
//!                                     │   restart guard (sha256 before/after) ───┼──▶ systemctl restart
//!                                     │                   │                      │
//!     relation-set / status-set ◀─────┼───────────────────┘                      │
//!                                     └───────────────────────────────────────────┘
//! ```
//!
//! Unknown hook names are logged and skipped; the workload status is
//! assessed after every invocation.

use std::process::ExitCode;

use clap::Parser;

use heat_charm::lifecycle::startup;
use heat_charm::{CharmError, HookEvent};

#[derive(Parser)]
#[command(name = "heat-charm")]
#[command(about = "Juju hooks for the OpenStack Heat charm", long_about = None)]
struct Cli {
    /// Hook to run. Defaults to JUJU_HOOK_NAME, then the executable name.
    hook: Option<String>,

    /// Charm directory holding scripts/, files/ and heat-charm.toml.
    #[arg(long, env = "CHARM_DIR")]
    charm_dir: Option<std::path::PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Hook failed");
            eprintln!("heat-charm: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CharmError> {
    let settings = startup::init(cli.charm_dir.as_deref())?;
    let name = HookEvent::resolve_name(cli.hook, std::env::args().next()).unwrap_or_default();

    let mut charm = startup::load_charm(settings).await?;
    match name.parse::<HookEvent>() {
        Ok(event) => match charm.dispatch(event).await {
            Ok(outcome) => tracing::info!(hook = %event, ?outcome, "Hook finished"),
            Err(CharmError::UnknownHook(name)) => {
                tracing::info!("Unknown hook {} - skipping.", name)
            }
            Err(e) => return Err(e),
        },
        Err(_) => tracing::info!("Unknown hook {} - skipping.", name),
    }

    charm.assess_status().await?;
    Ok(())
}

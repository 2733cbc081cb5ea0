use std::process::ExitCode;

use clap::{Parser, Subcommand};

use heat_charm::actions::{self, Action};
use heat_charm::lifecycle::startup;
use heat_charm::CharmError;

#[derive(Parser)]
#[command(name = "heat-action")]
#[command(about = "Juju actions for the OpenStack Heat charm", long_about = None)]
struct Cli {
    /// Charm directory holding heat-charm.toml.
    #[arg(long, env = "CHARM_DIR")]
    charm_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upgrade OpenStack to the release openstack-origin points at
    OpenstackUpgrade,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Action failed to run");
            eprintln!("heat-action: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CharmError> {
    let settings = startup::init(cli.charm_dir.as_deref())?;

    // actions/<name> symlinks carry the action name in argv[0]
    let action = match cli.command {
        Some(Commands::OpenstackUpgrade) => Action::OpenStackUpgrade,
        None => std::env::args()
            .next()
            .as_deref()
            .and_then(|a| std::path::Path::new(a).file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
            .parse()?,
    };

    let mut charm = startup::load_charm(settings).await?;
    actions::run(&mut charm, action).await
}

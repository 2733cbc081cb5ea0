//! Host operating system access.
//!
//! # Data Flow
//! ```text
//! Handlers / renderers / restart table
//!     → Host trait
//!         - system.rs (apt-get, systemctl, dpkg-query, ip, files under a root)
//!         - recording.rs (in-memory double for tests)
//!     → process.rs (child process execution)
//!     → network.rs (interface discovery, pure lookups)
//! ```
//!
//! # Design Decisions
//! - Every absolute path is resolved under a configurable root
//! - Service actions report success instead of failing the hook, the
//!   caller decides whether a failed reload is fatal
//! - Package and service managers are opaque collaborators

pub mod network;
pub mod process;
pub mod recording;
pub mod system;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;

pub use network::InterfaceAddress;
pub use recording::RecordingHost;
pub use system::SystemHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Reload,
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Reload => "reload",
        };
        f.write_str(s)
    }
}

#[async_trait]
pub trait Host: Send + Sync {
    /// File contents, `None` when the file does not exist.
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Write a file, creating parent directories.
    async fn write_file(&self, path: &str, content: &[u8], mode: u32) -> Result<()>;

    async fn file_exists(&self, path: &str) -> bool;

    /// Entry names in a directory; empty when it does not exist.
    async fn list_dir(&self, path: &str) -> Result<Vec<String>>;

    /// Copy a file into a directory, keeping its name and permissions.
    async fn copy_file(&self, from: &str, to_dir: &str) -> Result<()>;

    /// Run a command, failing on a non-zero exit.
    async fn run(&self, program: &str, args: &[String]) -> Result<()>;

    /// Installed version of a package, `None` when not installed.
    async fn package_version(&self, package: &str) -> Result<Option<String>>;

    async fn apt_update(&self) -> Result<()>;

    async fn apt_install(&self, packages: &[String], options: &[String]) -> Result<()>;

    async fn apt_upgrade(&self, options: &[String], dist: bool) -> Result<()>;

    /// Apply a service action, returning whether it succeeded.
    async fn service(&self, action: ServiceAction, name: &str) -> Result<bool>;

    async fn interfaces(&self) -> Result<Vec<InterfaceAddress>>;

    /// Ubuntu series codename, e.g. `xenial`.
    async fn os_series(&self) -> Result<String>;

    fn cpu_count(&self) -> usize;
}

/// Reload a service, restarting it when the reload fails.
pub async fn reload_or_restart(host: &dyn Host, name: &str) -> Result<bool> {
    if host.service(ServiceAction::Reload, name).await? {
        return Ok(true);
    }
    tracing::info!(service = name, "Reload failed, restarting");
    host.service(ServiceAction::Restart, name).await
}

//! Runtime settings schema.
//!
//! These settings describe where the charm runs rather than what it
//! deploys: the filesystem root rendered files land under, the charm
//! directory, logging, and package manager options. Deployment choices made
//! by the operator live in [`crate::config::options::CharmOptions`].

use serde::{Deserialize, Serialize};

/// Root settings for the charm binaries.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CharmSettings {
    /// Filesystem layout.
    pub paths: PathsConfig,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Package manager and command settings.
    pub commands: CommandsConfig,
}

/// Filesystem layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Prefix prepended to every absolute path the charm reads or writes.
    pub root: String,

    /// Charm directory (scripts/, files/, exec.d/).
    pub charm_dir: String,

    /// Directory holding the cached encryption key.
    pub heat_state_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            charm_dir: std::env::var("CHARM_DIR").unwrap_or_else(|_| ".".to_string()),
            heat_state_dir: "/var/lib/heat".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Colourise output. Juju unit logs are plain text.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: false,
        }
    }
}

/// Package manager settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Options passed to apt-get install/upgrade.
    pub apt_options: Vec<String>,

    /// Extra options used for the dist-upgrade performed during an
    /// OpenStack release upgrade.
    pub upgrade_dpkg_options: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            apt_options: vec!["--option=Dpkg::Options::=--force-confold".to_string()],
            upgrade_dpkg_options: vec![
                "--option=Dpkg::Options::=--force-confnew".to_string(),
                "--option=Dpkg::Options::=--force-confdef".to_string(),
            ],
        }
    }
}

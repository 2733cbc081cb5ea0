//! Charm error types.

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors that abort a hook invocation.
///
/// Juju treats a non-zero hook exit as a retryable hook error, so every
/// variant here ends the process; incomplete relation data is not an error
/// and is reported through [`crate::hooks::HookOutcome`] instead.
#[derive(Debug, Error)]
pub enum CharmError {
    /// An external command exited unsuccessfully.
    #[error("command `{command}` failed with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// An external command could not be spawned at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to render template: {0}")]
    Render(#[from] std::fmt::Error),

    /// The requested feature is not available on this platform.
    #[error("{0}")]
    UnsupportedPlatform(String),

    #[error("unable to determine OpenStack release from source '{0}'")]
    UnknownInstallSource(String),

    #[error("insufficient config data to configure hacluster: set vip or dns-ha")]
    InsufficientHaConfig,

    #[error("dns-ha is set but none of os-admin-hostname, os-internal-hostname or os-public-hostname is configured")]
    DnsHaMissingHostnames,

    #[error("invalid endpoint address '{0}'")]
    InvalidEndpoint(String),

    #[error("invalid TLS material: {0}")]
    InvalidCertificate(String),

    /// The hook name does not map to any handler.
    #[error("unknown hook {0}")]
    UnknownHook(String),

    #[error("unknown action {0}")]
    UnknownAction(String),
}

impl CharmError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        CharmError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CharmError>;

//! Contexts derived from options, leader settings and host facts only.
//! All of them are complete as soon as the charm is deployed, except
//! memcache which depends on the release.

use std::collections::BTreeMap;

use crate::host::network::is_ipv6;
use crate::secrets::DOMAIN_ADMIN_PASSWD;
use crate::state::HookState;

const DEFAULT_WORKER_MULTIPLIER: f64 = 2.0;
pub const MEMCACHE_PORT: u16 = 11211;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    pub encryption_key: String,
    /// Unset until the leader has generated it.
    pub domain_admin_password: Option<String>,
}

impl SecurityContext {
    pub fn from_state(state: &HookState) -> Self {
        Self {
            encryption_key: state.encryption_key.clone(),
            domain_admin_password: state.leader_value(DOMAIN_ADMIN_PASSWD).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceUserContext {
    /// Empty means "use the image default".
    pub instance_user: String,
}

impl InstanceUserContext {
    pub fn from_state(state: &HookState) -> Self {
        Self {
            instance_user: state.options.instance_user.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFlagsContext {
    pub flags: BTreeMap<String, String>,
}

impl ConfigFlagsContext {
    pub fn from_state(state: &HookState) -> Self {
        Self {
            flags: state
                .options
                .config_flags
                .as_deref()
                .map(parse_config_flags)
                .unwrap_or_default(),
        }
    }
}

/// Parse `key1=value1,key2=value2`. Entries without `=` or with an empty
/// key are skipped.
pub fn parse_config_flags(raw: &str) -> BTreeMap<String, String> {
    let mut flags = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                flags.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => tracing::warn!(entry, "Ignoring malformed config-flags entry"),
        }
    }
    flags
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingContext {
    pub use_syslog: bool,
    pub debug: bool,
    pub verbose: bool,
}

impl LoggingContext {
    pub fn from_state(state: &HookState) -> Self {
        Self {
            use_syslog: state.options.use_syslog,
            debug: state.options.debug,
            verbose: state.options.verbose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkersContext {
    pub workers: usize,
}

impl WorkersContext {
    pub fn from_state(state: &HookState) -> Self {
        let multiplier = state
            .options
            .worker_multiplier
            .unwrap_or(DEFAULT_WORKER_MULTIPLIER)
            .max(0.0);
        let workers = (state.cpu_count as f64 * multiplier) as usize;
        Self {
            workers: workers.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemcacheContext {
    pub server: String,
    pub port: u16,
}

impl MemcacheContext {
    pub fn from_state(state: &HookState) -> Option<Self> {
        if !state.effective_release().enables_memcache() {
            return None;
        }
        let server = if state.options.prefer_ipv6 || is_ipv6(&state.private_address) {
            "::1"
        } else {
            "127.0.0.1"
        };
        Some(Self {
            server: server.to_string(),
            port: MEMCACHE_PORT,
        })
    }

    /// `host:port` as keystonemiddleware expects it.
    pub fn url(&self) -> String {
        if is_ipv6(&self.server) {
            format!("inet6:[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }
}

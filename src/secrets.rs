//! Generated secrets.
//!
//! # Responsibilities
//! - Generate passwords from an unambiguous alphabet
//! - Cache the heat encryption key on disk so every render uses the same key
//! - Name the secrets the leader shares through leader settings

use rand::seq::SliceRandom;

use crate::config::{CharmOptions, CharmSettings};
use crate::error::Result;
use crate::host::Host;

/// Leader setting holding the stack domain admin password.
pub const DOMAIN_ADMIN_PASSWD: &str = "heat-domain-admin-passwd";

/// Leader setting holding the haproxy statistics password.
pub const HAPROXY_STAT_PASSWORD: &str = "haproxy-stat-password";

/// Secrets the leader generates once for the whole application.
pub const LEADER_SECRETS: [&str; 2] = [DOMAIN_ADMIN_PASSWD, HAPROXY_STAT_PASSWORD];

const ENCRYPTION_KEY_FILE: &str = "encryption-key";

/// Letters and digits without the ones easily confused with each other.
const ALPHABET: &[u8] = b"bcdfghjkmnpqrstwxyzBCFGHJKLMNPRSTVWXYZ23456789";

pub fn pwgen(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .filter_map(|_| ALPHABET.choose(&mut rng).map(|c| *c as char))
        .collect()
}

pub fn encryption_key_path(settings: &CharmSettings) -> String {
    format!(
        "{}/{}",
        settings.paths.heat_state_dir.trim_end_matches('/'),
        ENCRYPTION_KEY_FILE
    )
}

/// The key heat uses to encrypt stack parameters.
///
/// Read from the cache file when present. Otherwise the configured
/// `encryption-key` (or a fresh 16 character secret) is written to the
/// cache and returned.
pub async fn encryption_key(
    host: &dyn Host,
    settings: &CharmSettings,
    options: &CharmOptions,
) -> Result<String> {
    let path = encryption_key_path(settings);
    if let Some(content) = host.read_file(&path).await? {
        return Ok(String::from_utf8_lossy(&content).trim().to_string());
    }

    let key = options
        .encryption_key
        .clone()
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| pwgen(16));
    host.write_file(&path, key.as_bytes(), 0o600).await?;
    tracing::info!(path = %path, "Stored encryption key");
    Ok(key)
}

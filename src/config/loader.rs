//! Settings loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::CharmSettings;
use crate::config::validation::{validate_settings, ValidationError};

/// File name looked up in the charm directory.
pub const SETTINGS_FILE: &str = "heat-charm.toml";

/// Environment variable overriding `paths.root`.
pub const ROOT_ENV: &str = "HEAT_CHARM_ROOT";

/// Error type for settings loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<CharmSettings, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_settings(&content)
}

/// Parse and validate settings from TOML text.
pub fn parse_settings(content: &str) -> Result<CharmSettings, ConfigError> {
    let settings: CharmSettings = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_settings(&settings).map_err(ConfigError::Validation)?;
    Ok(settings)
}

/// Resolve the settings for this invocation.
///
/// Uses `<charm_dir>/heat-charm.toml` when it exists and defaults otherwise,
/// then applies the `HEAT_CHARM_ROOT` override.
pub fn load_for_charm(charm_dir: Option<&Path>) -> Result<CharmSettings, ConfigError> {
    let dir = charm_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CharmSettings::default().paths.charm_dir));
    let file = dir.join(SETTINGS_FILE);

    let mut settings = if file.is_file() {
        load_settings(&file)?
    } else {
        CharmSettings::default()
    };
    settings.paths.charm_dir = dir.to_string_lossy().into_owned();

    if let Ok(root) = std::env::var(ROOT_ENV) {
        settings.paths.root = root;
        validate_settings(&settings).map_err(ConfigError::Validation)?;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings = parse_settings(
            r#"
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.paths.root, "/");
        assert_eq!(settings.paths.heat_state_dir, "/var/lib/heat");
    }

    #[test]
    fn test_invalid_document_is_rejected() {
        let err = parse_settings("[paths]\nroot = \"tmp\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("paths.root"));

        let err = parse_settings("[paths\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_settings_file_in_charm_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "[paths]\nheat_state_dir = \"/srv/heat\"\n",
        )
        .unwrap();

        let settings = load_for_charm(Some(dir.path())).unwrap();
        assert_eq!(settings.paths.heat_state_dir, "/srv/heat");
        assert_eq!(settings.paths.charm_dir, dir.path().to_string_lossy());
    }
}

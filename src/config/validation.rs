//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Paths must be absolute where they are joined under the root
//! - Log level must be one tracing understands
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CharmSettings → Result<(), Vec<ValidationError>>

use std::fmt;
use std::path::Path;

use crate::config::schema::CharmSettings;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_settings(settings: &CharmSettings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !Path::new(&settings.paths.root).is_absolute() {
        errors.push(ValidationError {
            field: "paths.root",
            message: format!("must be absolute, got '{}'", settings.paths.root),
        });
    }

    if !Path::new(&settings.paths.heat_state_dir).is_absolute() {
        errors.push(ValidationError {
            field: "paths.heat_state_dir",
            message: format!("must be absolute, got '{}'", settings.paths.heat_state_dir),
        });
    }

    if settings.paths.charm_dir.is_empty() {
        errors.push(ValidationError {
            field: "paths.charm_dir",
            message: "must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&settings.logging.level.to_lowercase().as_str()) {
        errors.push(ValidationError {
            field: "logging.level",
            message: format!("unknown level '{}'", settings.logging.level),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

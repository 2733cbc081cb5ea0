//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! heat-charm.toml (optional, in $CHARM_DIR)
//!     → loader.rs (parse & deserialize, HEAT_CHARM_ROOT override)
//!     → validation.rs (semantic checks)
//!     → CharmSettings (validated, immutable for the invocation)
//!
//! config-get --all --format=json
//!     → options.rs (CharmOptions, config.yaml defaults)
//!     → HookState snapshot
//! ```
//!
//! # Design Decisions
//! - Settings describe the runtime environment, options describe the deployment
//! - All fields have defaults to allow minimal documents
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod options;
pub mod schema;
pub mod validation;

pub use options::CharmOptions;
pub use schema::CharmSettings;
pub use schema::LoggingConfig;
pub use schema::PathsConfig;

//! Juju charm for OpenStack Heat

// Inputs
pub mod config;
pub mod hookenv;
pub mod host;
pub mod state;

// Decisions over the snapshot
pub mod context;
pub mod endpoints;
pub mod ha;
pub mod openstack;
pub mod render;
pub mod restart;
pub mod secrets;

// Entry points
pub mod actions;
pub mod hooks;
pub mod lifecycle;

// Cross-cutting concerns
pub mod error;
pub mod observability;

pub use error::{CharmError, Result};
pub use hookenv::HookEvent;
pub use hooks::{Charm, HookOutcome};
pub use state::HookState;

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Hook handlers produce:
//!     → tracing events with structured fields (hook, relation_id, path, service)
//!     → logging.rs subscriber (stderr)
//!     → Juju unit log (juju debug-log)
//! ```
//!
//! # Design Decisions
//! - Structured fields over interpolated strings where a value is searchable
//! - One subscriber per process, installed before the first hook tool call

pub mod logging;

//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load settings → Validate → Init logging → Snapshot hook state
//!
//! Then the binary dispatches one hook (or action) and exits.
//! ```

pub mod startup;

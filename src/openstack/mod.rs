//! OpenStack packaging knowledge.
//!
//! # Data Flow
//! ```text
//! openstack-origin + Ubuntu series + installed heat-common version
//!     → release.rs (InstallSource, OpenStackRelease, upgrade_available)
//!     → ConfigRegistry / restart map (memcache toggles on the release)
//!
//! install / upgrade
//!     → source.rs (cloud archive list, add-apt-repository)
//! ```

pub mod release;
pub mod source;

pub use release::{InstallSource, OpenStackRelease};

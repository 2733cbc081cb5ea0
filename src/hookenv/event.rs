//! Hook events.
//!
//! # Responsibilities
//! - Map the hook name Juju invoked to a closed set of events
//! - Resolve the hook name from argv / environment

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::CharmError;

/// Relation endpoints this charm declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    Amqp,
    SharedDb,
    IdentityService,
    Cluster,
    Ha,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Amqp,
        Endpoint::SharedDb,
        Endpoint::IdentityService,
        Endpoint::Cluster,
        Endpoint::Ha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Amqp => "amqp",
            Endpoint::SharedDb => "shared-db",
            Endpoint::IdentityService => "identity-service",
            Endpoint::Cluster => "cluster",
            Endpoint::Ha => "ha",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relation lifecycle phase carried in a relation hook name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationPhase {
    Joined,
    Changed,
    Departed,
    Broken,
}

impl RelationPhase {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "joined" => Some(RelationPhase::Joined),
            "changed" => Some(RelationPhase::Changed),
            "departed" => Some(RelationPhase::Departed),
            "broken" => Some(RelationPhase::Broken),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            RelationPhase::Joined => "joined",
            RelationPhase::Changed => "changed",
            RelationPhase::Departed => "departed",
            RelationPhase::Broken => "broken",
        }
    }
}

/// A lifecycle event the charm handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Install,
    ConfigChanged,
    UpgradeCharm,
    UpdateStatus,
    LeaderElected,
    LeaderSettingsChanged,
    Relation(Endpoint, RelationPhase),
}

impl HookEvent {
    /// Resolve the hook name for this process.
    ///
    /// An explicit name wins, then `JUJU_HOOK_NAME`, then the basename of
    /// the executable (hooks are symlinks to the binary).
    pub fn resolve_name(explicit: Option<String>, argv0: Option<String>) -> Option<String> {
        explicit
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var("JUJU_HOOK_NAME").ok().filter(|s| !s.is_empty()))
            .or_else(|| {
                argv0.and_then(|a| {
                    Path::new(&a)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                })
            })
    }
}

impl FromStr for HookEvent {
    type Err = CharmError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let event = match name {
            "install" | "install.real" => HookEvent::Install,
            "config-changed" => HookEvent::ConfigChanged,
            "upgrade-charm" => HookEvent::UpgradeCharm,
            "update-status" => HookEvent::UpdateStatus,
            "leader-elected" => HookEvent::LeaderElected,
            "leader-settings-changed" => HookEvent::LeaderSettingsChanged,
            _ => {
                let (endpoint, phase) = name
                    .rsplit_once("-relation-")
                    .ok_or_else(|| CharmError::UnknownHook(name.to_string()))?;
                match (Endpoint::from_name(endpoint), RelationPhase::from_suffix(phase)) {
                    (Some(e), Some(p)) => HookEvent::Relation(e, p),
                    _ => return Err(CharmError::UnknownHook(name.to_string())),
                }
            }
        };
        Ok(event)
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookEvent::Install => f.write_str("install"),
            HookEvent::ConfigChanged => f.write_str("config-changed"),
            HookEvent::UpgradeCharm => f.write_str("upgrade-charm"),
            HookEvent::UpdateStatus => f.write_str("update-status"),
            HookEvent::LeaderElected => f.write_str("leader-elected"),
            HookEvent::LeaderSettingsChanged => f.write_str("leader-settings-changed"),
            HookEvent::Relation(e, p) => write!(f, "{}-relation-{}", e, p.suffix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lifecycle_hooks() {
        assert_eq!("install".parse::<HookEvent>().unwrap(), HookEvent::Install);
        assert_eq!("install.real".parse::<HookEvent>().unwrap(), HookEvent::Install);
        assert_eq!(
            "leader-elected".parse::<HookEvent>().unwrap(),
            HookEvent::LeaderElected
        );
    }

    #[test]
    fn test_parse_relation_hooks() {
        assert_eq!(
            "identity-service-relation-changed".parse::<HookEvent>().unwrap(),
            HookEvent::Relation(Endpoint::IdentityService, RelationPhase::Changed)
        );
        assert_eq!(
            "shared-db-relation-broken".parse::<HookEvent>().unwrap(),
            HookEvent::Relation(Endpoint::SharedDb, RelationPhase::Broken)
        );
    }

    #[test]
    fn test_unknown_hooks() {
        for name in ["start", "nrpe-external-master-relation-joined", "amqp-relation-exploded", ""] {
            assert!(matches!(
                name.parse::<HookEvent>(),
                Err(CharmError::UnknownHook(_))
            ));
        }
    }

    #[test]
    fn test_display_round_trips_name() {
        let name = "cluster-relation-departed";
        assert_eq!(name.parse::<HookEvent>().unwrap().to_string(), name);
    }

    #[test]
    fn test_resolve_name_prefers_explicit() {
        assert_eq!(
            HookEvent::resolve_name(Some("config-changed".into()), Some("/x/hooks/install".into())),
            Some("config-changed".into())
        );
    }
}

//! Template contexts.
//!
//! # Data Flow
//! ```text
//! HookState (options, relation data, leader settings, host facts)
//!     → ContextKind::build
//!         - relations.rs (amqp, shared-db, identity-service)
//!         - https.rs (TLS material for the apache front-end)
//!         - haproxy.rs (backends and listen ports)
//!         - local.rs (security, instance user, config flags, logging,
//!           workers, memcache)
//!     → ContextSet
//!     → render (one function per template)
//! ```
//!
//! # Design Decisions
//! - A context is either complete (a typed record) or absent; templates
//!   never see half-filled relation data
//! - Contexts are pure functions of the snapshot, so rendering twice gives
//!   the same bytes

pub mod haproxy;
pub mod https;
pub mod local;
pub mod relations;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::state::HookState;

pub use haproxy::HaProxyContext;
pub use https::HttpsContext;
pub use local::{
    ConfigFlagsContext, InstanceUserContext, LoggingContext, MemcacheContext, SecurityContext,
    WorkersContext,
};
pub use relations::{AmqpContext, DatabaseContext, IdentityContext};

/// Capability a template depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextKind {
    Amqp,
    SharedDb,
    IdentityService,
    Https,
    HaProxy,
    Security,
    InstanceUser,
    ConfigFlags,
    Logging,
    Workers,
    Memcache,
}

impl ContextKind {
    pub const ALL: [ContextKind; 11] = [
        ContextKind::Amqp,
        ContextKind::SharedDb,
        ContextKind::IdentityService,
        ContextKind::Https,
        ContextKind::HaProxy,
        ContextKind::Security,
        ContextKind::InstanceUser,
        ContextKind::ConfigFlags,
        ContextKind::Logging,
        ContextKind::Workers,
        ContextKind::Memcache,
    ];

    /// Interface name reported when the context is complete.
    pub fn interface(self) -> &'static str {
        match self {
            ContextKind::Amqp => "amqp",
            ContextKind::SharedDb => "shared-db",
            ContextKind::IdentityService => "identity-service",
            ContextKind::Https => "https",
            ContextKind::HaProxy => "haproxy",
            ContextKind::Security => "security",
            ContextKind::InstanceUser => "instance-user",
            ContextKind::ConfigFlags => "config-flags",
            ContextKind::Logging => "logging",
            ContextKind::Workers => "workers",
            ContextKind::Memcache => "memcache",
        }
    }

    /// Build the context from the snapshot, `None` when incomplete.
    pub fn build(self, state: &HookState) -> Result<Option<Context>> {
        let context = match self {
            ContextKind::Amqp => AmqpContext::from_state(state).map(Context::Amqp),
            ContextKind::SharedDb => DatabaseContext::from_state(state).map(Context::SharedDb),
            ContextKind::IdentityService => {
                IdentityContext::from_state(state).map(Context::IdentityService)
            }
            ContextKind::Https => HttpsContext::from_state(state)?.map(Context::Https),
            ContextKind::HaProxy => Some(Context::HaProxy(HaProxyContext::from_state(state))),
            ContextKind::Security => Some(Context::Security(SecurityContext::from_state(state))),
            ContextKind::InstanceUser => {
                Some(Context::InstanceUser(InstanceUserContext::from_state(state)))
            }
            ContextKind::ConfigFlags => {
                Some(Context::ConfigFlags(ConfigFlagsContext::from_state(state)))
            }
            ContextKind::Logging => Some(Context::Logging(LoggingContext::from_state(state))),
            ContextKind::Workers => Some(Context::Workers(WorkersContext::from_state(state))),
            ContextKind::Memcache => MemcacheContext::from_state(state).map(Context::Memcache),
        };
        Ok(context)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Context {
    Amqp(AmqpContext),
    SharedDb(DatabaseContext),
    IdentityService(IdentityContext),
    Https(HttpsContext),
    HaProxy(HaProxyContext),
    Security(SecurityContext),
    InstanceUser(InstanceUserContext),
    ConfigFlags(ConfigFlagsContext),
    Logging(LoggingContext),
    Workers(WorkersContext),
    Memcache(MemcacheContext),
}

/// Complete contexts for one template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSet {
    contexts: BTreeMap<ContextKind, Context>,
}

macro_rules! accessor {
    ($name:ident, $kind:ident, $ty:ty) => {
        pub fn $name(&self) -> Option<&$ty> {
            match self.contexts.get(&ContextKind::$kind) {
                Some(Context::$kind(c)) => Some(c),
                _ => None,
            }
        }
    };
}

impl ContextSet {
    pub fn gather(kinds: &[ContextKind], state: &HookState) -> Result<Self> {
        let mut contexts = BTreeMap::new();
        for kind in kinds {
            match kind.build(state)? {
                Some(context) => {
                    contexts.insert(*kind, context);
                }
                None => tracing::debug!(context = kind.interface(), "Context incomplete"),
            }
        }
        Ok(Self { contexts })
    }

    pub fn is_complete(&self, kind: ContextKind) -> bool {
        self.contexts.contains_key(&kind)
    }

    accessor!(amqp, Amqp, AmqpContext);
    accessor!(shared_db, SharedDb, DatabaseContext);
    accessor!(identity, IdentityService, IdentityContext);
    accessor!(https, Https, HttpsContext);
    accessor!(haproxy, HaProxy, HaProxyContext);
    accessor!(security, Security, SecurityContext);
    accessor!(instance_user, InstanceUser, InstanceUserContext);
    accessor!(config_flags, ConfigFlags, ConfigFlagsContext);
    accessor!(logging, Logging, LoggingContext);
    accessor!(workers, Workers, WorkersContext);
    accessor!(memcache, Memcache, MemcacheContext);
}

/// Interface names of every context that is currently complete.
pub fn complete_contexts(state: &HookState) -> Result<Vec<&'static str>> {
    let set = ContextSet::gather(&ContextKind::ALL, state)?;
    Ok(ContextKind::ALL
        .into_iter()
        .filter(|k| set.is_complete(*k))
        .map(ContextKind::interface)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hookenv::event::Endpoint;
    use crate::hookenv::settings;
    use crate::state::RelationUnit;

    #[test]
    fn test_local_contexts_always_complete() {
        let state = HookState {
            series: "trusty".into(),
            cpu_count: 2,
            ..Default::default()
        };
        let complete = complete_contexts(&state).unwrap();
        assert!(complete.contains(&"haproxy"));
        assert!(complete.contains(&"logging"));
        assert!(!complete.contains(&"amqp"));
        assert!(!complete.contains(&"shared-db"));
        assert!(!complete.contains(&"https"));
        // icehouse has no memcache token cache
        assert!(!complete.contains(&"memcache"));
    }

    #[test]
    fn test_set_accessors() {
        let mut state = HookState {
            series: "xenial".into(),
            ..Default::default()
        };
        state.units.insert(
            Endpoint::Amqp,
            vec![RelationUnit {
                relation_id: "amqp:1".into(),
                unit: "rabbitmq-server/0".into(),
                data: settings([("password", "pw"), ("private-address", "10.0.0.5")]),
            }],
        );
        let set = ContextSet::gather(&[ContextKind::Amqp, ContextKind::SharedDb], &state).unwrap();
        assert!(set.amqp().is_some());
        assert!(set.shared_db().is_none());
        assert!(set.memcache().is_none());
    }
}

//! Per-invocation snapshot of everything the charm decides on.
//!
//! # Responsibilities
//! - Read options, relation data, leader settings and host facts once
//! - Answer relation queries without further hook tool calls
//!
//! # Design Decisions
//! - Contexts, endpoint resolution and the HA builder are pure functions of
//!   this snapshot
//! - Writes (relation-set, leader-set) are not reflected back, except leader
//!   settings the running hook generated itself

use std::collections::BTreeMap;

use crate::config::{CharmOptions, CharmSettings};
use crate::error::Result;
use crate::hookenv::event::Endpoint;
use crate::hookenv::{HookEnvironment, RelationData};
use crate::host::{Host, InterfaceAddress};
use crate::openstack::release::{current_release, upgrade_available};
use crate::openstack::OpenStackRelease;
use crate::secrets;

/// Package whose version identifies the deployed release.
pub const RELEASE_PACKAGE: &str = "heat-common";

#[derive(Debug, Clone, PartialEq)]
pub struct RelationUnit {
    pub relation_id: String,
    pub unit: String,
    pub data: RelationData,
}

impl RelationUnit {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HookState {
    pub options: CharmOptions,
    /// Relation ids per endpoint, including relations without units yet.
    pub relation_ids: BTreeMap<Endpoint, Vec<String>>,
    pub units: BTreeMap<Endpoint, Vec<RelationUnit>>,
    pub leader: RelationData,
    pub is_leader: bool,
    pub local_unit: String,
    pub private_address: String,
    pub interfaces: Vec<InterfaceAddress>,
    pub series: String,
    pub installed_version: Option<String>,
    pub release: Option<OpenStackRelease>,
    pub cpu_count: usize,
    pub encryption_key: String,
}

impl HookState {
    pub async fn gather(
        env: &dyn HookEnvironment,
        host: &dyn Host,
        settings: &CharmSettings,
    ) -> Result<Self> {
        let options = env.config().await?;

        let mut relation_ids = BTreeMap::new();
        let mut units = BTreeMap::new();
        for endpoint in Endpoint::ALL {
            let ids = env.relation_ids(endpoint.name()).await?;
            let mut endpoint_units = Vec::new();
            for rid in &ids {
                for unit in env.related_units(rid).await? {
                    let data = env.relation_get(rid, &unit).await?;
                    endpoint_units.push(RelationUnit {
                        relation_id: rid.clone(),
                        unit,
                        data,
                    });
                }
            }
            relation_ids.insert(endpoint, ids);
            units.insert(endpoint, endpoint_units);
        }

        let series = host.os_series().await?;
        let installed_version = host.package_version(RELEASE_PACKAGE).await?;
        let release = current_release(
            installed_version.as_deref(),
            &options.openstack_origin,
            &series,
        );
        if release.is_none() {
            tracing::warn!(
                origin = %options.openstack_origin,
                series = %series,
                "Unable to determine OpenStack release"
            );
        }

        let encryption_key = secrets::encryption_key(host, settings, &options).await?;

        Ok(Self {
            relation_ids,
            units,
            leader: env.leader_get().await?,
            is_leader: env.is_leader().await?,
            local_unit: env.local_unit(),
            private_address: env.private_address().await?,
            interfaces: host.interfaces().await?,
            series,
            installed_version,
            release,
            cpu_count: host.cpu_count(),
            encryption_key,
            options,
        })
    }

    pub fn relation_ids(&self, endpoint: Endpoint) -> &[String] {
        self.relation_ids
            .get(&endpoint)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_related(&self, endpoint: Endpoint) -> bool {
        !self.relation_ids(endpoint).is_empty()
    }

    pub fn units(&self, endpoint: Endpoint) -> &[RelationUnit] {
        self.units.get(&endpoint).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First non-empty value for `key` across the units of an endpoint.
    pub fn relation_value(&self, endpoint: Endpoint, key: &str) -> Option<&str> {
        self.units(endpoint).iter().find_map(|u| u.get(key))
    }

    pub fn leader_value(&self, key: &str) -> Option<&str> {
        self.leader
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The hacluster subordinate reports a formed cluster.
    pub fn is_clustered(&self) -> bool {
        self.relation_value(Endpoint::Ha, "clustered")
            .is_some_and(|v| v != "None")
    }

    /// Release used for rendering decisions.
    pub fn effective_release(&self) -> OpenStackRelease {
        self.release
            .or_else(|| OpenStackRelease::for_series(&self.series))
            .unwrap_or(OpenStackRelease::Yoga)
    }

    pub fn upgrade_available(&self) -> bool {
        upgrade_available(
            self.installed_version.as_deref(),
            &self.options.openstack_origin,
            &self.series,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hookenv::{settings, MemoryEnvironment};
    use crate::host::RecordingHost;

    #[tokio::test]
    async fn test_gather_snapshot() {
        let env = MemoryEnvironment::default();
        env.add_unit("ha", "ha:3", "hacluster/0", settings([("clustered", "yes")]));
        env.add_relation("amqp", "amqp:1");
        env.set_leader(true);
        let host = RecordingHost::new();
        host.set_package_version(RELEASE_PACKAGE, "1:6.0.0-0ubuntu1");

        let state = HookState::gather(&env, &host, &CharmSettings::default())
            .await
            .unwrap();

        assert!(state.is_clustered());
        assert!(state.is_related(Endpoint::Amqp));
        assert!(state.units(Endpoint::Amqp).is_empty());
        assert!(!state.is_related(Endpoint::SharedDb));
        assert_eq!(state.release, Some(OpenStackRelease::Mitaka));
        assert_eq!(state.local_unit, "heat/0");
        assert!(state.is_leader);
        assert_eq!(state.encryption_key.len(), 16);
    }

    #[test]
    fn test_clustered_none_is_not_clustered() {
        let mut state = HookState::default();
        state.relation_ids.insert(Endpoint::Ha, vec!["ha:3".into()]);
        for (value, clustered) in [("None", false), ("", false), ("yes", true)] {
            state.units.insert(
                Endpoint::Ha,
                vec![RelationUnit {
                    relation_id: "ha:3".into(),
                    unit: "hacluster/0".into(),
                    data: settings([("clustered", value)]),
                }],
            );
            assert_eq!(state.is_clustered(), clustered, "clustered={:?}", value);
        }
    }

    #[test]
    fn test_effective_release_falls_back_to_series() {
        let state = HookState {
            series: "bionic".into(),
            ..Default::default()
        };
        assert_eq!(state.effective_release(), OpenStackRelease::Queens);
    }
}

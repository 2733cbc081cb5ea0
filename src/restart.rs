//! Restart-on-change.
//!
//! # Responsibilities
//! - Map each managed file to the services that read it
//! - Snapshot file digests before a handler runs and restart the services
//!   of every file that changed afterwards
//!
//! # Design Decisions
//! - API services come before haproxy and apache2 in the map, so restarts
//!   bring backends up before the front-ends that probe them
//! - Each service restarts at most once per hook, in map order

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::host::{Host, ServiceAction};
use crate::openstack::OpenStackRelease;
use crate::render::resource_map;

pub type RestartMap = Vec<(&'static str, Vec<&'static str>)>;

pub fn restart_map(release: OpenStackRelease) -> RestartMap {
    resource_map(release)
        .into_iter()
        .map(|file| (file.path, file.services))
        .collect()
}

/// Every service the charm manages, in first-appearance order.
pub fn services(release: OpenStackRelease) -> Vec<&'static str> {
    let mut result: Vec<&'static str> = Vec::new();
    for (_, services) in restart_map(release) {
        for service in services {
            if !result.contains(&service) {
                result.push(service);
            }
        }
    }
    result
}

type Digests = BTreeMap<&'static str, Option<[u8; 32]>>;

async fn digests(host: &dyn Host, map: &RestartMap) -> Result<Digests> {
    let mut result = BTreeMap::new();
    for (path, _) in map {
        let digest = host
            .read_file(path)
            .await?
            .map(|content| Sha256::digest(&content).into());
        result.insert(*path, digest);
    }
    Ok(result)
}

/// Digests of the restart map files taken before a handler runs.
#[derive(Debug)]
pub struct RestartGuard {
    map: RestartMap,
    before: Digests,
}

impl RestartGuard {
    pub async fn capture(host: &dyn Host, release: OpenStackRelease) -> Result<Self> {
        let map = restart_map(release);
        let before = digests(host, &map).await?;
        Ok(Self { map, before })
    }

    /// Services whose files changed since `capture`, in map order.
    pub async fn changed_services(&self, host: &dyn Host) -> Result<Vec<&'static str>> {
        let after = digests(host, &self.map).await?;
        let mut result: Vec<&'static str> = Vec::new();
        for (path, services) in &self.map {
            if self.before.get(path) == after.get(path) {
                continue;
            }
            tracing::debug!(path, "Config file changed");
            for service in services {
                if !result.contains(service) {
                    result.push(*service);
                }
            }
        }
        Ok(result)
    }

    /// Restart the services of every changed file.
    pub async fn restart_changed(self, host: &dyn Host) -> Result<Vec<&'static str>> {
        let services = self.changed_services(host).await?;
        for service in &services {
            tracing::info!(service, "Restarting after config change");
            if !host.service(ServiceAction::Restart, service).await? {
                tracing::warn!(service, "Restart failed");
            }
        }
        Ok(services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use crate::render::{HAPROXY_CONF, HEAT_API_PASTE, HEAT_CONF};

    #[test]
    fn test_services_flattened() {
        assert_eq!(
            services(OpenStackRelease::Mitaka),
            vec!["heat-api", "heat-api-cfn", "heat-engine", "haproxy", "apache2", "memcached"]
        );
        assert!(!services(OpenStackRelease::Liberty).contains(&"memcached"));
    }

    #[tokio::test]
    async fn test_restarts_only_changed() {
        let host = RecordingHost::new();
        host.put_file(HEAT_CONF, b"old");
        host.put_file(HAPROXY_CONF, b"same");

        let guard = RestartGuard::capture(&host, OpenStackRelease::Mitaka)
            .await
            .unwrap();
        host.write_file(HEAT_CONF, b"new", 0o640).await.unwrap();
        host.write_file(HEAT_API_PASTE, b"created", 0o644).await.unwrap();
        host.write_file(HAPROXY_CONF, b"same", 0o644).await.unwrap();

        let restarted = guard.restart_changed(&host).await.unwrap();
        assert_eq!(restarted, vec!["heat-api", "heat-api-cfn", "heat-engine"]);
        assert_eq!(host.services_with(ServiceAction::Restart), restarted);
    }

    #[tokio::test]
    async fn test_nothing_changed() {
        let host = RecordingHost::new();
        let guard = RestartGuard::capture(&host, OpenStackRelease::Mitaka)
            .await
            .unwrap();
        assert!(guard.restart_changed(&host).await.unwrap().is_empty());
        assert!(host.services().is_empty());
    }
}

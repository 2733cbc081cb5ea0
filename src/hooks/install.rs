//! install hook.

use crate::endpoints::API_PORTS;
use crate::error::Result;
use crate::hookenv::WorkloadStatus;
use crate::hooks::{Charm, HookOutcome};
use crate::openstack::source::configure_installation_source;
use crate::openstack::OpenStackRelease;

const BASE_PACKAGES: [&str; 4] = ["python-keystoneclient", "uuid", "apache2", "haproxy"];
const MEMCACHE_PACKAGES: [&str; 2] = ["memcached", "python-memcache"];
const SCRIPT_BIN_DIR: &str = "/usr/bin";

/// Packages for a release, sorted and without duplicates.
pub fn determine_packages(release: OpenStackRelease) -> Vec<String> {
    let mut packages: Vec<String> = BASE_PACKAGES
        .iter()
        .chain(crate::render::BASE_SERVICES.iter())
        .map(|p| p.to_string())
        .collect();
    if release.enables_memcache() {
        packages.extend(MEMCACHE_PACKAGES.iter().map(|p| p.to_string()));
    }
    packages.sort();
    packages.dedup();
    packages
}

impl Charm {
    pub(crate) async fn install(&mut self) -> Result<HookOutcome> {
        self.env()
            .status_set(&WorkloadStatus::maintenance("Executing pre-install"))
            .await?;
        self.execd_preinstall().await?;
        configure_installation_source(self.host(), &self.state.options.openstack_origin).await?;

        self.env()
            .status_set(&WorkloadStatus::maintenance("Installing apt packages"))
            .await?;
        self.host().apt_update().await?;
        let packages = determine_packages(self.registry.release());
        self.host()
            .apt_install(&packages, &self.settings.commands.apt_options)
            .await?;
        tracing::info!(count = packages.len(), "Installed packages");

        self.install_charm_files().await?;
        for port in API_PORTS {
            self.env().open_port(port).await?;
        }
        Ok(HookOutcome::Done)
    }

    /// Run `exec.d/*/charm-pre-install` shipped with the charm.
    async fn execd_preinstall(&self) -> Result<()> {
        let execd = format!("{}/exec.d", self.charm_dir());
        for module in self.host().list_dir(&execd).await? {
            let script = format!("{}/{}/charm-pre-install", execd, module);
            if self.host().file_exists(&script).await {
                tracing::info!(script = %script, "Running pre-install script");
                self.host().run(&script, &[]).await?;
            }
        }
        Ok(())
    }

    /// Copy the helper scripts under `files/` onto the PATH.
    async fn install_charm_files(&self) -> Result<()> {
        let files = format!("{}/files", self.charm_dir());
        for name in self.host().list_dir(&files).await? {
            let source = format!("{}/{}", files, name);
            self.host().copy_file(&source, SCRIPT_BIN_DIR).await?;
            tracing::debug!(file = %name, "Installed charm file");
        }
        Ok(())
    }

    pub(crate) fn charm_dir(&self) -> &str {
        self.settings.paths.charm_dir.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packages_by_release() {
        let liberty = determine_packages(OpenStackRelease::Liberty);
        assert_eq!(
            liberty,
            vec![
                "apache2",
                "haproxy",
                "heat-api",
                "heat-api-cfn",
                "heat-engine",
                "python-keystoneclient",
                "uuid"
            ]
        );
        let mitaka = determine_packages(OpenStackRelease::Mitaka);
        assert!(mitaka.contains(&"memcached".to_string()));
        assert!(mitaka.contains(&"python-memcache".to_string()));
    }
}

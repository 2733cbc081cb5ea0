//! OpenStack release upgrade and database migration.

use crate::error::{CharmError, Result};
use crate::hookenv::WorkloadStatus;
use crate::hooks::install::determine_packages;
use crate::hooks::Charm;
use crate::host::ServiceAction;
use crate::openstack::source::configure_installation_source;
use crate::openstack::InstallSource;
use crate::restart::services;
use crate::state::RELEASE_PACKAGE;

impl Charm {
    /// Move the unit to the release `openstack-origin` points at.
    pub async fn upgrade_openstack(&mut self) -> Result<()> {
        let origin = self.state.options.openstack_origin.clone();
        let target = InstallSource::parse(&origin)?
            .release(&self.state.series)
            .ok_or_else(|| CharmError::UnknownInstallSource(origin.clone()))?;

        tracing::info!(from = %self.registry.release(), to = %target, "Performing OpenStack upgrade");
        self.env()
            .status_set(&WorkloadStatus::maintenance(format!(
                "Performing OpenStack upgrade to {}",
                target
            )))
            .await?;

        configure_installation_source(self.host(), &origin).await?;
        self.host().apt_update().await?;
        let dpkg = self.settings.commands.upgrade_dpkg_options.clone();
        self.host().apt_upgrade(&dpkg, true).await?;
        self.host()
            .apt_install(&determine_packages(target), &dpkg)
            .await?;

        self.state.installed_version = self.host().package_version(RELEASE_PACKAGE).await?;
        self.state.release = Some(target);
        self.registry.set_release(target);
        self.write_all().await?;

        if self.state.is_leader {
            self.migrate_database().await?;
        }
        Ok(())
    }

    /// Stop the services, sync the schema, start them again.
    pub(crate) async fn migrate_database(&self) -> Result<()> {
        tracing::info!("Migrating the heat database");
        let services = services(self.registry.release());
        for service in &services {
            self.host().service(ServiceAction::Stop, service).await?;
        }
        self.host().run("heat-manage", &["db_sync".to_string()]).await?;
        for service in &services {
            self.host().service(ServiceAction::Start, service).await?;
        }
        Ok(())
    }
}

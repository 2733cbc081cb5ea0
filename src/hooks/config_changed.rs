//! config-changed and the https front-end.

use crate::context::ContextKind;
use crate::context::https::CA_CERT_PATH;
use crate::context::Context;
use crate::error::{CharmError, Result};
use crate::hookenv::event::Endpoint;
use crate::host::process::args;
use crate::host::reload_or_restart;
use crate::hooks::{Charm, HookOutcome};
use crate::openstack::release::series_older_than;

pub const HTTPS_SITE_NAME: &str = "openstack_https_frontend";

/// Oldest series whose tooling handles IPv6-only deployments.
const MIN_IPV6_SERIES: &str = "trusty";

impl Charm {
    pub(crate) async fn config_changed(&mut self) -> Result<HookOutcome> {
        if self.state.upgrade_available() {
            if self.state.options.action_managed_upgrade {
                tracing::info!("Upgrade available, waiting for the openstack-upgrade action");
            } else {
                self.upgrade_openstack().await?;
            }
        }

        if self.state.options.prefer_ipv6 {
            self.setup_ipv6()?;
            for rid in self.state.relation_ids(Endpoint::SharedDb).to_vec() {
                self.db_joined(Some(rid.as_str())).await?;
            }
        }

        self.save_script_rc().await?;
        self.write_all().await?;
        self.configure_https().await?;

        for rid in self.state.relation_ids(Endpoint::Cluster).to_vec() {
            self.cluster_joined(Some(rid.as_str())).await?;
        }
        for rid in self.state.relation_ids(Endpoint::Ha).to_vec() {
            self.ha_joined(Some(rid.as_str())).await?;
        }
        Ok(HookOutcome::Done)
    }

    fn setup_ipv6(&self) -> Result<()> {
        if series_older_than(&self.state.series, MIN_IPV6_SERIES) {
            return Err(CharmError::UnsupportedPlatform(format!(
                "IPv6 is not supported on {}, use {} or later",
                self.state.series, MIN_IPV6_SERIES
            )));
        }
        Ok(())
    }

    /// Enable or disable the apache TLS front-end to match the available
    /// certificate material.
    pub(crate) async fn configure_https(&self) -> Result<()> {
        self.write_all().await?;

        match ContextKind::Https.build(&self.state)? {
            Some(Context::Https(https)) => {
                let host = self.host();
                host.write_file(&https.cert_path, &https.cert_pem, 0o644).await?;
                host.write_file(&https.key_path, &https.key_pem, 0o600).await?;
                if let Some(ca) = &https.ca_pem {
                    host.write_file(CA_CERT_PATH, ca, 0o644).await?;
                    host.run("update-ca-certificates", &[]).await?;
                }
                host.run("a2ensite", &args(&[HTTPS_SITE_NAME])).await?;
                tracing::info!(server_name = %https.server_name, "Enabled https front-end");
            }
            _ => {
                self.host()
                    .run("a2dissite", &args(&[HTTPS_SITE_NAME]))
                    .await?;
            }
        }
        reload_or_restart(self.host(), "apache2").await?;

        for rid in self.state.relation_ids(Endpoint::IdentityService).to_vec() {
            self.identity_joined(Some(rid.as_str())).await?;
        }
        Ok(())
    }

    /// Service names for tools that operate on the charm's services.
    async fn save_script_rc(&self) -> Result<()> {
        let path = format!("{}/scripts/scriptrc", self.charm_dir());
        let content = format!(
            "#!/bin/bash\n\
             export OPENSTACK_PORT_MCASTPORT={}\n\
             export OPENSTACK_SERVICE_API=heat-api\n\
             export OPENSTACK_SERVICE_API_CFN=heat-api-cfn\n\
             export OPENSTACK_SERVICE_ENGINE=heat-engine\n",
            self.state.options.ha_mcastport
        );
        self.host().write_file(&path, content.as_bytes(), 0o755).await
    }
}

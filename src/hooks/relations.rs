//! amqp, shared-db, identity-service and cluster relation handlers.

use crate::context::{ContextKind, DatabaseContext};
use crate::endpoints::{identity_endpoints, EndpointType};
use crate::error::Result;
use crate::hookenv::event::Endpoint;
use crate::hookenv::{settings, RelationData};
use crate::host::network::{address_in_network, global_ipv6_addresses, is_ipv6};
use crate::hooks::{Charm, HookOutcome};
use crate::render::HEAT_CONF;

impl Charm {
    pub(crate) async fn amqp_joined(&self, relation_id: Option<&str>) -> Result<HookOutcome> {
        let options = &self.state.options;
        self.env()
            .relation_set(
                relation_id,
                &settings([
                    ("username", options.rabbit_user.as_str()),
                    ("vhost", options.rabbit_vhost.as_str()),
                ]),
            )
            .await?;
        Ok(HookOutcome::Done)
    }

    pub(crate) async fn amqp_changed(&self) -> Result<HookOutcome> {
        if ContextKind::Amqp.build(&self.state)?.is_none() {
            tracing::info!("amqp relation incomplete. Peer not ready?");
            return Ok(HookOutcome::Incomplete("amqp"));
        }
        self.registry
            .write(HEAT_CONF, &self.state, self.host())
            .await?;
        Ok(HookOutcome::Done)
    }

    pub(crate) async fn db_joined(&self, relation_id: Option<&str>) -> Result<HookOutcome> {
        let options = &self.state.options;
        let hostname = if options.prefer_ipv6 {
            // VIPs need their own grant for connections made through them
            let mut addresses = global_ipv6_addresses(&self.state.interfaces);
            for vip in options.vips() {
                if is_ipv6(&vip) && !addresses.contains(&vip) {
                    addresses.push(vip);
                }
            }
            serde_json::to_string(&addresses)?
        } else {
            match self.env().binding_address(Endpoint::SharedDb.name()).await? {
                Some(address) => address,
                None => self.state.private_address.clone(),
            }
        };

        self.env()
            .relation_set(
                relation_id,
                &settings([
                    ("heat_database", options.database.clone()),
                    ("heat_username", options.database_user.clone()),
                    ("heat_hostname", hostname),
                ]),
            )
            .await?;
        Ok(HookOutcome::Done)
    }

    pub(crate) async fn db_changed(&self) -> Result<HookOutcome> {
        let Some(db) = DatabaseContext::from_state(&self.state) else {
            tracing::info!("shared-db relation incomplete. Peer not ready?");
            return Ok(HookOutcome::Incomplete("shared-db"));
        };
        self.registry
            .write(HEAT_CONF, &self.state, self.host())
            .await?;

        if !self.state.is_leader {
            tracing::debug!("Not the leader, leaving database migration to it");
        } else if db.allows(&self.state.local_unit) {
            self.migrate_database().await?;
        } else {
            tracing::info!(
                unit = %self.state.local_unit,
                "allowed_units either not presented, or local unit not in acl list"
            );
        }
        Ok(HookOutcome::Done)
    }

    pub(crate) async fn identity_joined(&self, relation_id: Option<&str>) -> Result<HookOutcome> {
        let https = ContextKind::Https.build(&self.state)?.is_some();
        let endpoints = identity_endpoints(&self.state, https)?;
        self.env().relation_set(relation_id, &endpoints).await?;
        Ok(HookOutcome::Done)
    }

    pub(crate) async fn identity_changed(&self) -> Result<HookOutcome> {
        if ContextKind::IdentityService.build(&self.state)?.is_none() {
            tracing::info!("identity-service relation incomplete. Peer not ready?");
            return Ok(HookOutcome::Incomplete("identity-service"));
        }
        self.configure_https().await?;
        Ok(HookOutcome::Done)
    }

    /// Tell peers this unit's address on each configured network.
    pub(crate) async fn cluster_joined(&self, relation_id: Option<&str>) -> Result<HookOutcome> {
        let mut data = RelationData::new();
        for endpoint in [EndpointType::Admin, EndpointType::Internal, EndpointType::Public] {
            let Some(cidr) = self.state.options.network(endpoint) else {
                continue;
            };
            if let Some(address) = address_in_network(&self.state.interfaces, cidr) {
                data.insert(format!("{}-address", endpoint), address.to_string());
            }
        }
        if data.is_empty() {
            return Ok(HookOutcome::Skipped);
        }
        self.env().relation_set(relation_id, &data).await?;
        Ok(HookOutcome::Done)
    }
}

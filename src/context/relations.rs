//! Contexts fed by remote charms.

use crate::hookenv::event::Endpoint;
use crate::host::network::format_host;
use crate::state::{HookState, RelationUnit};

const RABBITMQ_PORT: u16 = 5672;
const DEFAULT_SERVICE_PORT: &str = "5000";
const DEFAULT_AUTH_PORT: &str = "35357";

/// Message queue credentials from rabbitmq-server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmqpContext {
    pub user: String,
    pub password: String,
    pub vhost: String,
    /// Sorted, deduplicated broker addresses.
    pub hosts: Vec<String>,
    pub ha_queues: bool,
    pub ssl_port: Option<String>,
}

impl AmqpContext {
    pub fn from_state(state: &HookState) -> Option<Self> {
        let units = state.units(Endpoint::Amqp);
        let password = units.iter().find_map(|u| u.get("password"))?;

        let mut hosts: Vec<String> = units
            .iter()
            .filter(|u| u.get("password").is_some())
            .filter_map(amqp_host)
            .map(str::to_string)
            .collect();
        hosts.sort();
        hosts.dedup();
        if hosts.is_empty() {
            return None;
        }

        Some(Self {
            user: state.options.rabbit_user.clone(),
            password: password.to_string(),
            vhost: state.options.rabbit_vhost.clone(),
            hosts,
            ha_queues: units.iter().any(|u| u.get("ha_queues").is_some()),
            ssl_port: units
                .iter()
                .find_map(|u| u.get("ssl_port"))
                .map(str::to_string),
        })
    }

    pub fn host(&self) -> &str {
        &self.hosts[0]
    }

    /// oslo.messaging transport URL covering every broker.
    pub fn transport_url(&self) -> String {
        let brokers: Vec<String> = self
            .hosts
            .iter()
            .map(|h| {
                format!(
                    "{}:{}@{}:{}",
                    self.user,
                    self.password,
                    format_host(h),
                    RABBITMQ_PORT
                )
            })
            .collect();
        format!("rabbit://{}/{}", brokers.join(","), self.vhost)
    }
}

/// A clustered rabbitmq advertises its VIP, otherwise each unit its own host.
fn amqp_host(unit: &RelationUnit) -> Option<&str> {
    if unit.get("clustered").is_some() {
        if let Some(vip) = unit.get("vip") {
            return Some(vip);
        }
    }
    unit.get("hostname").or_else(|| unit.get("private-address"))
}

/// Database access granted by the shared-db provider under the `heat`
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseContext {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub allowed_units: Vec<String>,
}

impl DatabaseContext {
    pub fn from_state(state: &HookState) -> Option<Self> {
        let unit = state
            .units(Endpoint::SharedDb)
            .iter()
            .find(|u| u.get("db_host").is_some() && u.get("heat_password").is_some())?;

        Some(Self {
            host: unit.get("db_host")?.to_string(),
            database: state.options.database.clone(),
            user: state.options.database_user.clone(),
            password: unit.get("heat_password")?.to_string(),
            allowed_units: unit
                .get("heat_allowed_units")
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }

    /// SQLAlchemy connection string.
    pub fn connection(&self) -> String {
        format!(
            "mysql://{}:{}@{}/{}",
            self.user,
            self.password,
            format_host(&self.host),
            self.database
        )
    }

    pub fn allows(&self, unit: &str) -> bool {
        self.allowed_units.iter().any(|u| u == unit)
    }
}

/// Keystone service credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub service_protocol: String,
    pub service_host: String,
    pub service_port: String,
    pub auth_protocol: String,
    pub auth_host: String,
    pub auth_port: String,
    pub admin_tenant_name: String,
    pub admin_user: String,
    pub admin_password: String,
}

impl IdentityContext {
    pub fn from_state(state: &HookState) -> Option<Self> {
        let unit = state.units(Endpoint::IdentityService).iter().find(|u| {
            u.get("service_host").is_some()
                && u.get("auth_host").is_some()
                && u.get("service_password").is_some()
        })?;
        let value = |key: &str, default: &str| unit.get(key).unwrap_or(default).to_string();

        Some(Self {
            service_protocol: value("service_protocol", "http"),
            service_host: value("service_host", ""),
            service_port: value("service_port", DEFAULT_SERVICE_PORT),
            auth_protocol: value("auth_protocol", "http"),
            auth_host: value("auth_host", ""),
            auth_port: value("auth_port", DEFAULT_AUTH_PORT),
            admin_tenant_name: value("service_tenant", "services"),
            admin_user: value("service_username", "heat"),
            admin_password: value("service_password", ""),
        })
    }

    pub fn auth_uri(&self) -> String {
        format!(
            "{}://{}:{}/v2.0",
            self.service_protocol,
            format_host(&self.service_host),
            self.service_port
        )
    }

    pub fn identity_uri(&self) -> String {
        format!(
            "{}://{}:{}",
            self.auth_protocol,
            format_host(&self.auth_host),
            self.auth_port
        )
    }

    pub fn keystone_ec2_url(&self) -> String {
        format!(
            "{}://{}:{}/v2.0/ec2tokens",
            self.service_protocol,
            format_host(&self.service_host),
            self.service_port
        )
    }
}

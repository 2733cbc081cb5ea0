//! Operator-facing charm options.
//!
//! Deserialized from `config-get --all --format=json`. Juju fills in the
//! defaults declared in config.yaml, the serde defaults here mirror them so
//! a sparse document (as used in tests) behaves the same way.

use serde::{Deserialize, Serialize};

use crate::endpoints::EndpointType;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CharmOptions {
    /// Package source: `distro`, `cloud:<series>-<release>`, `ppa:...`.
    pub openstack_origin: String,

    /// Only upgrade OpenStack through the openstack-upgrade action.
    pub action_managed_upgrade: bool,

    pub prefer_ipv6: bool,

    pub database: String,
    pub database_user: String,
    pub rabbit_user: String,
    pub rabbit_vhost: String,
    pub region: String,

    pub use_syslog: bool,
    pub debug: bool,
    pub verbose: bool,

    /// Comma separated `key=value` pairs appended to heat.conf [DEFAULT].
    pub config_flags: Option<String>,

    /// Default user for instances launched by heat.
    pub instance_user: Option<String>,

    /// Fixed encryption key; generated and cached when unset.
    pub encryption_key: Option<String>,

    pub worker_multiplier: Option<f64>,

    /// Whitespace separated virtual IPs.
    pub vip: Option<String>,
    #[serde(rename = "vip_iface")]
    pub vip_iface: String,
    #[serde(rename = "vip_cidr")]
    pub vip_cidr: u8,
    pub ha_bindiface: String,
    pub ha_mcastport: u16,
    pub dns_ha: bool,

    pub os_public_hostname: Option<String>,
    pub os_internal_hostname: Option<String>,
    pub os_admin_hostname: Option<String>,
    pub os_public_network: Option<String>,
    pub os_internal_network: Option<String>,
    pub os_admin_network: Option<String>,

    /// Base64 encoded PEM certificate for the https front-end.
    #[serde(rename = "ssl_cert")]
    pub ssl_cert: Option<String>,
    #[serde(rename = "ssl_key")]
    pub ssl_key: Option<String>,
    #[serde(rename = "ssl_ca")]
    pub ssl_ca: Option<String>,
}

impl Default for CharmOptions {
    fn default() -> Self {
        Self {
            openstack_origin: "distro".to_string(),
            action_managed_upgrade: false,
            prefer_ipv6: false,
            database: "heat".to_string(),
            database_user: "heat".to_string(),
            rabbit_user: "heat".to_string(),
            rabbit_vhost: "openstack".to_string(),
            region: "RegionOne".to_string(),
            use_syslog: false,
            debug: false,
            verbose: false,
            config_flags: None,
            instance_user: None,
            encryption_key: None,
            worker_multiplier: None,
            vip: None,
            vip_iface: "eth0".to_string(),
            vip_cidr: 24,
            ha_bindiface: "eth0".to_string(),
            ha_mcastport: 5959,
            dns_ha: false,
            os_public_hostname: None,
            os_internal_hostname: None,
            os_admin_hostname: None,
            os_public_network: None,
            os_internal_network: None,
            os_admin_network: None,
            ssl_cert: None,
            ssl_key: None,
            ssl_ca: None,
        }
    }
}

impl CharmOptions {
    /// Parse the JSON document printed by `config-get`.
    ///
    /// Juju prints `null` for options without a value; those fall back to
    /// the defaults above.
    pub fn from_json(doc: &str) -> serde_json::Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(doc)?;
        if let Some(map) = value.as_object_mut() {
            map.retain(|_, v| !v.is_null());
        }
        serde_json::from_value(value)
    }

    /// Configured VIPs in declaration order.
    pub fn vips(&self) -> Vec<String> {
        self.vip
            .as_deref()
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn hostname_override(&self, endpoint: EndpointType) -> Option<&str> {
        let value = match endpoint {
            EndpointType::Public => &self.os_public_hostname,
            EndpointType::Internal => &self.os_internal_hostname,
            EndpointType::Admin => &self.os_admin_hostname,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn network(&self, endpoint: EndpointType) -> Option<&str> {
        let value = match endpoint {
            EndpointType::Public => &self.os_public_network,
            EndpointType::Internal => &self.os_internal_network,
            EndpointType::Admin => &self.os_admin_network,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_values_use_defaults() {
        let options = CharmOptions::from_json(
            r#"{"openstack-origin": "cloud:trusty-liberty", "vip": null, "region": null, "ha-mcastport": 6000}"#,
        )
        .unwrap();
        assert_eq!(options.openstack_origin, "cloud:trusty-liberty");
        assert_eq!(options.region, "RegionOne");
        assert_eq!(options.ha_mcastport, 6000);
        assert!(options.vip.is_none());
    }

    #[test]
    fn test_underscore_option_names() {
        let options =
            CharmOptions::from_json(r#"{"vip_iface": "bond0", "vip_cidr": 16, "ssl_cert": "abc"}"#)
                .unwrap();
        assert_eq!(options.vip_iface, "bond0");
        assert_eq!(options.vip_cidr, 16);
        assert_eq!(options.ssl_cert.as_deref(), Some("abc"));
    }

    #[test]
    fn test_vips_split() {
        let options = CharmOptions {
            vip: Some(" 10.0.0.1  2001:db8::10 ".into()),
            ..Default::default()
        };
        assert_eq!(options.vips(), vec!["10.0.0.1", "2001:db8::10"]);
    }

    #[test]
    fn test_empty_hostname_is_no_override() {
        let options = CharmOptions {
            os_public_hostname: Some(String::new()),
            os_admin_hostname: Some("heat-admin.example.org".into()),
            ..Default::default()
        };
        assert_eq!(options.hostname_override(EndpointType::Public), None);
        assert_eq!(
            options.hostname_override(EndpointType::Admin),
            Some("heat-admin.example.org")
        );
    }
}

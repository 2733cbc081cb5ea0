//! API endpoint resolution.
//!
//! # Responsibilities
//! - Pick the address each endpoint type is reachable on
//! - Build canonical base URLs and the keystone endpoint registration
//! - Compute the ports haproxy and apache listen on in front of the APIs
//!
//! # Design Decisions
//! - haproxy always fronts the APIs, so the services listen one step (10
//!   ports) below the public port, and apache one more step when TLS is on
//! - Address resolution order: hostname override, clustered VIP, address on
//!   the configured network, IPv6 global address, private address

use std::fmt;

use url::Url;

use crate::error::{CharmError, Result};
use crate::hookenv::RelationData;
use crate::host::network::{address_in_network, format_host, global_ipv6_addresses};
use crate::state::HookState;

pub const HEAT_API_PORT: u16 = 8004;
pub const HEAT_API_CFN_PORT: u16 = 8000;

/// Ports opened on install.
pub const API_PORTS: [u16; 2] = [HEAT_API_CFN_PORT, HEAT_API_PORT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EndpointType {
    Public,
    Internal,
    Admin,
}

impl EndpointType {
    pub const ALL: [EndpointType; 3] = [
        EndpointType::Public,
        EndpointType::Internal,
        EndpointType::Admin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EndpointType::Public => "public",
            EndpointType::Internal => "internal",
            EndpointType::Admin => "admin",
        }
    }
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Port an API service binds to behind haproxy (and apache when `https`).
pub fn determine_api_port(public_port: u16, https: bool) -> u16 {
    let steps = if https { 2 } else { 1 };
    public_port - 10 * steps
}

/// Port apache terminates TLS on, in front of haproxy's backends.
pub fn determine_apache_port(public_port: u16) -> u16 {
    public_port - 10
}

/// Wildcard address the API services and haproxy listen on.
pub fn bind_host(prefer_ipv6: bool) -> &'static str {
    if prefer_ipv6 {
        "::"
    } else {
        "0.0.0.0"
    }
}

/// Address clients of `endpoint` should use.
pub fn resolve_address(state: &HookState, endpoint: EndpointType) -> String {
    match state.options.hostname_override(endpoint) {
        Some(hostname) => hostname.to_string(),
        None => resolve_ip(state, endpoint),
    }
}

/// Like [`resolve_address`] but ignoring `os-*-hostname`, for callers that
/// need the IP a hostname should point at.
pub fn resolve_ip(state: &HookState, endpoint: EndpointType) -> String {
    let options = &state.options;
    let network = options.network(endpoint);
    let vips = options.vips();
    if state.is_clustered() && !vips.is_empty() {
        match network {
            Some(cidr) => {
                let net: Option<ipnetwork::IpNetwork> = cidr.parse().ok();
                let in_network = vips.iter().find(|vip| {
                    match (net, vip.parse::<std::net::IpAddr>()) {
                        (Some(net), Ok(ip)) => net.contains(ip),
                        _ => false,
                    }
                });
                if let Some(vip) = in_network {
                    return vip.clone();
                }
            }
            None => return vips[0].clone(),
        }
    }

    let fallback = if options.prefer_ipv6 {
        global_ipv6_addresses(&state.interfaces)
            .into_iter()
            .find(|addr| !vips.contains(addr))
            .unwrap_or_else(|| state.private_address.clone())
    } else {
        state.private_address.clone()
    };

    match network.and_then(|cidr| address_in_network(&state.interfaces, cidr)) {
        Some(addr) => addr.to_string(),
        None => fallback,
    }
}

/// Base URL (`scheme://host`) of an endpoint type.
pub fn canonical_url(state: &HookState, endpoint: EndpointType, https: bool) -> Result<String> {
    let scheme = if https { "https" } else { "http" };
    let address = resolve_address(state, endpoint);
    let raw = format!("{}://{}", scheme, format_host(&address));
    let url = Url::parse(&raw).map_err(|_| CharmError::InvalidEndpoint(raw.clone()))?;
    if url.host().is_none() {
        return Err(CharmError::InvalidEndpoint(raw));
    }
    Ok(url.origin().ascii_serialization())
}

/// Settings published on identity-service to register both APIs.
pub fn identity_endpoints(state: &HookState, https: bool) -> Result<RelationData> {
    let public = canonical_url(state, EndpointType::Public, https)?;
    let internal = canonical_url(state, EndpointType::Internal, https)?;
    let admin = canonical_url(state, EndpointType::Admin, https)?;
    let region = state.options.region.clone();

    let api = |base: &str| format!("{}:{}/v1/$(tenant_id)s", base, HEAT_API_PORT);
    let cfn = |base: &str| format!("{}:{}/v1", base, HEAT_API_CFN_PORT);

    let mut data = RelationData::new();
    data.insert("heat_service".into(), "heat".into());
    data.insert("heat_region".into(), region.clone());
    data.insert("heat_public_url".into(), api(&public));
    data.insert("heat_admin_url".into(), api(&admin));
    data.insert("heat_internal_url".into(), api(&internal));
    data.insert("heat-cfn_service".into(), "heat-cfn".into());
    data.insert("heat-cfn_region".into(), region);
    data.insert("heat-cfn_public_url".into(), cfn(&public));
    data.insert("heat-cfn_admin_url".into(), cfn(&admin));
    data.insert("heat-cfn_internal_url".into(), cfn(&internal));
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CharmOptions;
    use crate::hookenv::event::Endpoint;
    use crate::hookenv::settings;
    use crate::host::InterfaceAddress;
    use crate::state::RelationUnit;

    fn state(options: CharmOptions) -> HookState {
        HookState {
            options,
            private_address: "10.5.0.10".into(),
            interfaces: vec![
                InterfaceAddress::new("eth0", "10.5.0.10/16", "global").unwrap(),
                InterfaceAddress::new("eth1", "192.168.20.5/24", "global").unwrap(),
                InterfaceAddress::new("eth0", "2001:db8:1::10/64", "global").unwrap(),
            ],
            series: "xenial".into(),
            ..Default::default()
        }
    }

    fn clustered(mut state: HookState) -> HookState {
        state.units.insert(
            Endpoint::Ha,
            vec![RelationUnit {
                relation_id: "ha:1".into(),
                unit: "hacluster/0".into(),
                data: settings([("clustered", "yes")]),
            }],
        );
        state
    }

    #[test]
    fn test_ports() {
        assert_eq!(determine_api_port(HEAT_API_PORT, false), 7994);
        assert_eq!(determine_api_port(HEAT_API_PORT, true), 7984);
        assert_eq!(determine_apache_port(HEAT_API_CFN_PORT), 7990);
    }

    #[test]
    fn test_private_address_by_default() {
        let s = state(CharmOptions::default());
        assert_eq!(canonical_url(&s, EndpointType::Public, false).unwrap(), "http://10.5.0.10");
    }

    #[test]
    fn test_hostname_override_wins() {
        let s = clustered(state(CharmOptions {
            os_public_hostname: Some("heat.example.com".into()),
            vip: Some("10.5.100.1".into()),
            ..Default::default()
        }));
        assert_eq!(
            canonical_url(&s, EndpointType::Public, true).unwrap(),
            "https://heat.example.com"
        );
        assert_eq!(resolve_address(&s, EndpointType::Admin), "10.5.100.1");
    }

    #[test]
    fn test_clustered_vip_in_network() {
        let s = clustered(state(CharmOptions {
            vip: Some("10.5.100.1 192.168.20.100".into()),
            os_internal_network: Some("192.168.20.0/24".into()),
            ..Default::default()
        }));
        assert_eq!(resolve_address(&s, EndpointType::Internal), "192.168.20.100");
        assert_eq!(resolve_address(&s, EndpointType::Public), "10.5.100.1");
    }

    #[test]
    fn test_unclustered_uses_network_address() {
        let s = state(CharmOptions {
            vip: Some("10.5.100.1".into()),
            os_admin_network: Some("192.168.20.0/24".into()),
            ..Default::default()
        });
        assert_eq!(resolve_address(&s, EndpointType::Admin), "192.168.20.5");
        assert_eq!(resolve_address(&s, EndpointType::Public), "10.5.0.10");
    }

    #[test]
    fn test_ipv6_is_bracketed() {
        let s = state(CharmOptions {
            prefer_ipv6: true,
            ..Default::default()
        });
        assert_eq!(
            canonical_url(&s, EndpointType::Internal, false).unwrap(),
            "http://[2001:db8:1::10]"
        );
    }

    #[test]
    fn test_identity_endpoints() {
        let s = state(CharmOptions {
            region: "RegionTwo".into(),
            ..Default::default()
        });
        let data = identity_endpoints(&s, false).unwrap();
        assert_eq!(data["heat_service"], "heat");
        assert_eq!(data["heat_region"], "RegionTwo");
        assert_eq!(data["heat_public_url"], "http://10.5.0.10:8004/v1/$(tenant_id)s");
        assert_eq!(data["heat-cfn_admin_url"], "http://10.5.0.10:8000/v1");
        assert_eq!(data.len(), 10);
    }
}

//! haproxy front-end for the API services.

use std::collections::BTreeMap;

use crate::endpoints::{bind_host, determine_apache_port, HEAT_API_CFN_PORT, HEAT_API_PORT};
use crate::hookenv::event::Endpoint;
use crate::host::network::global_ipv6_addresses;
use crate::secrets::HAPROXY_STAT_PASSWORD;
use crate::state::HookState;

pub const STAT_PORT: u16 = 8888;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaProxyContext {
    /// Backend name (`heat-0`) to address, local unit included.
    pub units: BTreeMap<String, String>,
    /// Listener name to `[frontend port, backend port]`.
    pub service_ports: BTreeMap<String, [u16; 2]>,
    pub bind_host: String,
    pub local_host: String,
    pub stat_port: u16,
    pub stat_password: Option<String>,
}

impl HaProxyContext {
    pub fn from_state(state: &HookState) -> Self {
        let ipv6 = state.options.prefer_ipv6;
        let local_address = if ipv6 {
            global_ipv6_addresses(&state.interfaces)
                .into_iter()
                .next()
                .unwrap_or_else(|| state.private_address.clone())
        } else {
            state.private_address.clone()
        };

        let mut units = BTreeMap::new();
        units.insert(backend_name(&state.local_unit), local_address);
        for peer in state.units(Endpoint::Cluster) {
            if let Some(addr) = peer.get("private-address") {
                units.insert(backend_name(&peer.unit), addr.to_string());
            }
        }

        let mut service_ports = BTreeMap::new();
        service_ports.insert(
            "heat_api".to_string(),
            [HEAT_API_PORT, determine_apache_port(HEAT_API_PORT)],
        );
        service_ports.insert(
            "heat_api_cfn".to_string(),
            [HEAT_API_CFN_PORT, determine_apache_port(HEAT_API_CFN_PORT)],
        );

        let local_host = if ipv6 { "ip6-localhost" } else { "127.0.0.1" };

        Self {
            units,
            service_ports,
            bind_host: bind_host(ipv6).to_string(),
            local_host: local_host.to_string(),
            stat_port: STAT_PORT,
            stat_password: state.leader_value(HAPROXY_STAT_PASSWORD).map(str::to_string),
        }
    }
}

fn backend_name(unit: &str) -> String {
    unit.replace('/', "-")
}

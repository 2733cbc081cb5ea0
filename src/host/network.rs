//! Interface and address discovery.
//!
//! # Responsibilities
//! - Parse `ip -o addr show` into interface/network pairs
//! - Answer "which interface carries this address" and "which of my
//!   addresses is in this network" without touching the host again
//!
//! # Design Decisions
//! - Discovery runs once per hook; lookups are pure over the parsed list
//! - Link-local IPv6 addresses are kept but never chosen as endpoints

use std::net::IpAddr;

use ipnetwork::IpNetwork;

/// One address configured on a host interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    /// Address with its prefix, e.g. `10.5.0.10/16`.
    pub network: IpNetwork,
    /// `global`, `link`, `host`.
    pub scope: String,
}

impl InterfaceAddress {
    pub fn new(name: &str, cidr: &str, scope: &str) -> Option<Self> {
        Some(Self {
            name: name.to_string(),
            network: cidr.parse().ok()?,
            scope: scope.to_string(),
        })
    }

    pub fn ip(&self) -> IpAddr {
        self.network.ip()
    }

    fn contains(&self, addr: IpAddr) -> bool {
        self.network.contains(addr)
    }

    /// Netmask as the HA resource agents expect it: dotted quad for IPv4,
    /// prefix length for IPv6.
    pub fn netmask(&self) -> String {
        match self.network {
            IpNetwork::V4(net) => net.mask().to_string(),
            IpNetwork::V6(net) => net.prefix().to_string(),
        }
    }
}

/// Parse the one-line-per-address output of `ip -o addr show`.
///
/// ```text
/// 2: eth0    inet 10.5.0.10/16 brd 10.5.255.255 scope global eth0\       valid_lft forever
/// 2: eth0    inet6 fe80::f816:3eff:fe8c:5b5d/64 scope link \       valid_lft forever
/// ```
pub fn parse_ip_addr_output(output: &str) -> Vec<InterfaceAddress> {
    let mut result = Vec::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || !matches!(fields[2], "inet" | "inet6") {
            continue;
        }
        let name = fields[1].split('@').next().unwrap_or(fields[1]);
        let scope = fields
            .iter()
            .position(|f| *f == "scope")
            .and_then(|i| fields.get(i + 1))
            .copied()
            .unwrap_or("global");
        match InterfaceAddress::new(name, fields[3], scope) {
            Some(addr) => result.push(addr),
            None => tracing::debug!(line, "Skipping unparseable address line"),
        }
    }
    result
}

pub fn is_ipv6(address: &str) -> bool {
    matches!(address.parse::<IpAddr>(), Ok(IpAddr::V6(_)))
}

/// Wrap IPv6 literals in brackets for use in URLs and host:port strings.
pub fn format_host(address: &str) -> String {
    if is_ipv6(address) {
        format!("[{}]", address)
    } else {
        address.to_string()
    }
}

/// Interface whose subnet contains `address`.
pub fn iface_for_address<'a>(
    interfaces: &'a [InterfaceAddress],
    address: &str,
) -> Option<&'a InterfaceAddress> {
    let addr: IpAddr = address.parse().ok()?;
    interfaces
        .iter()
        .filter(|i| i.scope != "host")
        .find(|i| i.contains(addr))
}

/// Local address inside `cidr`, e.g. the unit's address on os-admin-network.
pub fn address_in_network(interfaces: &[InterfaceAddress], cidr: &str) -> Option<IpAddr> {
    let net: IpNetwork = match cidr.parse() {
        Ok(net) => net,
        Err(_) => {
            tracing::warn!(cidr, "Invalid network in config");
            return None;
        }
    };
    interfaces
        .iter()
        .map(InterfaceAddress::ip)
        .find(|ip| net.contains(*ip))
}

/// Globally scoped IPv6 addresses, in interface order.
pub fn global_ipv6_addresses(interfaces: &[InterfaceAddress]) -> Vec<String> {
    interfaces
        .iter()
        .filter(|i| i.scope == "global" && i.network.is_ipv6())
        .map(|i| i.ip().to_string())
        .collect()
}

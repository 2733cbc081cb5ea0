//! Pacemaker resources published to the hacluster subordinate.
//!
//! # Data Flow
//! ```text
//! vip / vip_iface / vip_cidr / dns-ha / os-*-hostname + host interfaces
//!     → build_resources
//!         - VIP resources (IPaddr2 / IPv6addr), grp_heat_vips
//!         - dns.rs (ocf:maas:dns hostname resources), grp_heat_hostnames
//!     → HaRelationData::to_relation_settings
//!     → ha relation (json_* maps, corosync_* strings)
//! ```
//!
//! # Design Decisions
//! - Keys are unique per map; a VIP whose key collides is renamed once with
//!   its address parameter name and skipped when that is taken too
//! - Maps go out as JSON objects with sorted keys so repeated hooks publish
//!   identical settings

pub mod dns;

use std::collections::BTreeMap;

use crate::error::{CharmError, Result};
use crate::hookenv::RelationData;
use crate::host::network::{iface_for_address, is_ipv6};
use crate::state::HookState;

pub const HAPROXY_RESOURCE: &str = "res_heat_haproxy";
pub const HAPROXY_CLONE: &str = "cl_heat_haproxy";
pub const VIP_GROUP: &str = "grp_heat_vips";

/// Everything published on the ha relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HaRelationData {
    pub resources: BTreeMap<String, String>,
    pub resource_params: BTreeMap<String, String>,
    pub groups: BTreeMap<String, String>,
    pub init_services: BTreeMap<String, String>,
    pub clones: BTreeMap<String, String>,
    pub corosync_bindiface: String,
    pub corosync_mcastport: u16,
}

impl HaRelationData {
    pub fn to_relation_settings(&self) -> Result<RelationData> {
        let mut settings = RelationData::new();
        settings.insert(
            "corosync_bindiface".to_string(),
            self.corosync_bindiface.clone(),
        );
        settings.insert(
            "corosync_mcastport".to_string(),
            self.corosync_mcastport.to_string(),
        );
        for (name, map) in [
            ("resources", &self.resources),
            ("resource_params", &self.resource_params),
            ("groups", &self.groups),
            ("init_services", &self.init_services),
            ("clones", &self.clones),
        ] {
            if !map.is_empty() {
                settings.insert(format!("json_{}", name), serde_json::to_string(map)?);
            }
        }
        Ok(settings)
    }

    /// Group members that are not themselves resources.
    pub fn dangling_group_members(&self) -> Vec<&str> {
        self.groups
            .values()
            .flat_map(|members| members.split_whitespace())
            .filter(|m| !self.resources.contains_key(*m))
            .collect()
    }
}

/// Resource map for the current options.
pub fn build_resources(state: &HookState) -> Result<HaRelationData> {
    let options = &state.options;
    let mut data = HaRelationData {
        corosync_bindiface: options.ha_bindiface.clone(),
        corosync_mcastport: options.ha_mcastport,
        ..Default::default()
    };
    data.resources
        .insert(HAPROXY_RESOURCE.to_string(), "lsb:haproxy".to_string());
    data.resource_params.insert(
        HAPROXY_RESOURCE.to_string(),
        r#"op monitor interval="5s""#.to_string(),
    );
    data.init_services
        .insert(HAPROXY_RESOURCE.to_string(), "haproxy".to_string());
    data.clones
        .insert(HAPROXY_CLONE.to_string(), HAPROXY_RESOURCE.to_string());

    if options.dns_ha {
        dns::add_hostname_resources(state, &mut data)?;
        return Ok(data);
    }

    let vips = options.vips();
    if vips.is_empty() {
        return Err(CharmError::InsufficientHaConfig);
    }
    add_vip_resources(state, &vips, &mut data);
    Ok(data)
}

fn add_vip_resources(state: &HookState, vips: &[String], data: &mut HaRelationData) {
    let options = &state.options;
    let mut members = Vec::new();

    for vip in vips {
        let (agent, param) = if is_ipv6(vip) {
            ("ocf:heartbeat:IPv6addr", "ipv6addr")
        } else {
            ("ocf:heartbeat:IPaddr2", "ip")
        };
        let (iface, netmask) = match iface_for_address(&state.interfaces, vip) {
            Some(addr) => (addr.name.clone(), addr.netmask()),
            None => (options.vip_iface.clone(), options.vip_cidr.to_string()),
        };

        let mut key = format!("res_heat_{}_vip", iface);
        if let Some(existing) = data.resource_params.get(&key) {
            if existing.contains(&format!("=\"{}\"", vip)) {
                tracing::warn!(vip = %vip, "VIP already configured, skipping");
                continue;
            }
            let renamed = format!("{}_{}", key, param);
            if data.resources.contains_key(&renamed) {
                tracing::warn!(vip = %vip, key = %renamed, "VIP resource key already taken, skipping");
                continue;
            }
            key = renamed;
        }

        data.resources.insert(key.clone(), agent.to_string());
        data.resource_params.insert(
            key.clone(),
            format!(
                r#"params {}="{}" cidr_netmask="{}" nic="{}""#,
                param, vip, netmask, iface
            ),
        );
        members.push(key);
    }

    if !members.is_empty() {
        data.groups.insert(VIP_GROUP.to_string(), members.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CharmOptions;
    use crate::host::InterfaceAddress;

    fn state(vip: &str) -> HookState {
        HookState {
            options: CharmOptions {
                vip: Some(vip.to_string()),
                ..Default::default()
            },
            interfaces: vec![
                InterfaceAddress::new("eth0", "10.5.0.10/16", "global").unwrap(),
                InterfaceAddress::new("eth1", "192.168.20.5/24", "global").unwrap(),
                InterfaceAddress::new("eth0", "2001:db8:1::10/64", "global").unwrap(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_single_vip() {
        let data = build_resources(&state("10.5.100.1")).unwrap();
        assert_eq!(data.resources["res_heat_eth0_vip"], "ocf:heartbeat:IPaddr2");
        assert_eq!(
            data.resource_params["res_heat_eth0_vip"],
            r#"params ip="10.5.100.1" cidr_netmask="255.255.0.0" nic="eth0""#
        );
        assert_eq!(data.groups[VIP_GROUP], "res_heat_eth0_vip");
        assert_eq!(data.resources[HAPROXY_RESOURCE], "lsb:haproxy");
        assert_eq!(data.clones[HAPROXY_CLONE], HAPROXY_RESOURCE);
        assert_eq!(data.init_services[HAPROXY_RESOURCE], "haproxy");
    }

    #[test]
    fn test_vips_on_separate_interfaces() {
        let data = build_resources(&state("10.5.100.1 192.168.20.100")).unwrap();
        assert_eq!(data.groups[VIP_GROUP], "res_heat_eth0_vip res_heat_eth1_vip");
    }

    #[test]
    fn test_colliding_vip_is_renamed() {
        let data = build_resources(&state("10.5.100.1 2001:db8:1::100")).unwrap();
        assert_eq!(data.resources["res_heat_eth0_vip_ipv6addr"], "ocf:heartbeat:IPv6addr");
        assert_eq!(
            data.resource_params["res_heat_eth0_vip_ipv6addr"],
            r#"params ipv6addr="2001:db8:1::100" cidr_netmask="64" nic="eth0""#
        );
        assert_eq!(
            data.groups[VIP_GROUP],
            "res_heat_eth0_vip res_heat_eth0_vip_ipv6addr"
        );
    }

    #[test]
    fn test_duplicate_and_exhausted_keys_are_skipped() {
        let data = build_resources(&state("10.5.100.1 10.5.100.1 10.5.100.2 10.5.100.3")).unwrap();
        // second .1 is a duplicate, .2 takes the renamed key, .3 has nowhere to go
        assert_eq!(data.groups[VIP_GROUP], "res_heat_eth0_vip res_heat_eth0_vip_ip");
        assert_eq!(data.resources.len(), 3);
        assert!(data.dangling_group_members().is_empty());
    }

    #[test]
    fn test_unknown_network_uses_fallback_iface() {
        let data = build_resources(&state("172.16.0.1")).unwrap();
        assert_eq!(
            data.resource_params["res_heat_eth0_vip"],
            r#"params ip="172.16.0.1" cidr_netmask="24" nic="eth0""#
        );
    }

    #[test]
    fn test_no_vip_is_insufficient() {
        let result = build_resources(&HookState::default());
        assert!(matches!(result, Err(CharmError::InsufficientHaConfig)));
    }

    #[test]
    fn test_relation_settings_wire_format() {
        let settings = build_resources(&state("10.5.100.1"))
            .unwrap()
            .to_relation_settings()
            .unwrap();
        assert_eq!(settings["corosync_bindiface"], "eth0");
        assert_eq!(settings["corosync_mcastport"], "5959");
        assert_eq!(
            settings["json_resources"],
            r#"{"res_heat_eth0_vip":"ocf:heartbeat:IPaddr2","res_heat_haproxy":"lsb:haproxy"}"#
        );
        assert_eq!(settings["json_groups"], r#"{"grp_heat_vips":"res_heat_eth0_vip"}"#);
    }
}

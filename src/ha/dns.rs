//! DNS based HA: hacluster keeps `os-*-hostname` records pointing at the
//! unit that currently runs the services, instead of moving a VIP.

use crate::endpoints::{resolve_ip, EndpointType};
use crate::error::{CharmError, Result};
use crate::ha::HaRelationData;
use crate::state::HookState;

pub const HOSTNAME_GROUP: &str = "grp_heat_hostnames";

pub fn add_hostname_resources(state: &HookState, data: &mut HaRelationData) -> Result<()> {
    let mut members = Vec::new();
    for endpoint in EndpointType::ALL {
        let Some(hostname) = state.options.hostname_override(endpoint) else {
            continue;
        };
        let key = format!("res_heat_{}_hostname", endpoint);
        data.resources.insert(key.clone(), "ocf:maas:dns".to_string());
        data.resource_params.insert(
            key.clone(),
            format!(
                r#"params fqdn="{}" ip_address="{}""#,
                hostname,
                resolve_ip(state, endpoint)
            ),
        );
        members.push(key);
    }

    if members.is_empty() {
        return Err(CharmError::DnsHaMissingHostnames);
    }
    data.groups
        .insert(HOSTNAME_GROUP.to_string(), members.join(" "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CharmOptions;
    use crate::ha::build_resources;

    #[test]
    fn test_hostname_resources_replace_vips() {
        let state = HookState {
            options: CharmOptions {
                dns_ha: true,
                vip: Some("10.5.100.1".into()),
                os_public_hostname: Some("heat.example.com".into()),
                os_admin_hostname: Some("heat-admin.example.com".into()),
                ..Default::default()
            },
            private_address: "10.5.0.10".into(),
            ..Default::default()
        };
        let data = build_resources(&state).unwrap();
        assert_eq!(data.resources["res_heat_public_hostname"], "ocf:maas:dns");
        assert_eq!(
            data.resource_params["res_heat_public_hostname"],
            r#"params fqdn="heat.example.com" ip_address="10.5.0.10""#
        );
        assert_eq!(
            data.groups[HOSTNAME_GROUP],
            "res_heat_public_hostname res_heat_admin_hostname"
        );
        assert!(!data.groups.contains_key(crate::ha::VIP_GROUP));
    }

    #[test]
    fn test_dns_ha_without_hostnames_is_fatal() {
        let state = HookState {
            options: CharmOptions {
                dns_ha: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            build_resources(&state),
            Err(CharmError::DnsHaMissingHostnames)
        ));
    }
}

//! Property tests over the restart map and the HA resource builder.

use proptest::prelude::*;

use heat_charm::config::CharmOptions;
use heat_charm::ha::{build_resources, VIP_GROUP};
use heat_charm::host::InterfaceAddress;
use heat_charm::openstack::OpenStackRelease;
use heat_charm::restart::restart_map;
use heat_charm::HookState;

const RELEASES: [OpenStackRelease; 6] = [
    OpenStackRelease::Icehouse,
    OpenStackRelease::Kilo,
    OpenStackRelease::Liberty,
    OpenStackRelease::Mitaka,
    OpenStackRelease::Queens,
    OpenStackRelease::Yoga,
];

fn vip_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..=254).prop_map(|n| format!("10.5.100.{}", n)),
        (1u8..=254).prop_map(|n| format!("192.168.20.{}", n)),
        (1u16..=0xfff).prop_map(|n| format!("2001:db8:1::{:x}", n)),
    ]
}

fn state_with_vips(vips: &[String]) -> HookState {
    HookState {
        options: CharmOptions {
            vip: Some(vips.join(" ")),
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

proptest! {
    #[test]
    fn api_services_restart_before_front_ends(idx in 0..RELEASES.len()) {
        let map = restart_map(RELEASES[idx]);
        let first = |service: &str| map.iter().position(|(_, s)| s.iter().any(|x| *x == service));

        let api = first("heat-api").unwrap();
        let cfn = first("heat-api-cfn").unwrap();
        let haproxy = first("haproxy").unwrap();
        let apache = first("apache2").unwrap();
        prop_assert!(api < haproxy && api < apache);
        prop_assert!(cfn < haproxy && cfn < apache);
    }

    #[test]
    fn vip_group_has_no_dangling_or_duplicate_members(
        vips in proptest::collection::vec(vip_strategy(), 1..6)
    ) {
        let data = build_resources(&state_with_vips(&vips)).unwrap();
        prop_assert!(data.dangling_group_members().is_empty());

        let members: Vec<&str> = data.groups[VIP_GROUP].split_whitespace().collect();
        let mut unique = members.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), members.len());
        prop_assert!(members.len() <= vips.len());
        // one entry per member plus the haproxy resource
        prop_assert_eq!(data.resources.len(), members.len() + 1);
        prop_assert_eq!(data.resource_params.len(), members.len() + 1);
    }
}

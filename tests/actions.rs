//! openstack-upgrade action outcomes.

mod common;

use common::Fixture;
use heat_charm::actions::{self, Action, NO_UPGRADE, UPGRADE_COMPLETED, UPGRADE_SKIPPED};

fn icehouse_on_trusty(action_managed: bool) -> Fixture {
    let fx = Fixture::new().leader();
    fx.host.set_series("trusty");
    fx.host.set_package_version("heat-common", "2014.1-0ubuntu1");
    fx.env.update_options(|o| {
        o.openstack_origin = "cloud:trusty-kilo".to_string();
        o.action_managed_upgrade = action_managed;
    });
    fx
}

#[tokio::test]
async fn test_upgrade_completes_when_action_managed() {
    let fx = icehouse_on_trusty(true);
    let mut charm = fx.charm().await;

    actions::run(&mut charm, Action::OpenStackUpgrade)
        .await
        .unwrap();

    let results = fx.env.action_results();
    assert_eq!(results.last().unwrap()["outcome"], UPGRADE_COMPLETED);
    assert!(fx.env.action_failures().is_empty());
    assert!(fx.host.commands().iter().any(|c| c.contains("dist-upgrade")));
    // leader runs the schema migration for the new release
    assert!(fx.host.ran("heat-manage db_sync"));
    assert_eq!(charm.registry().release().to_string(), "kilo");
}

#[tokio::test]
async fn test_upgrade_skipped_without_action_managed() {
    let fx = icehouse_on_trusty(false);
    let mut charm = fx.charm().await;

    actions::run(&mut charm, Action::OpenStackUpgrade)
        .await
        .unwrap();

    assert_eq!(fx.env.action_results()[0]["outcome"], UPGRADE_SKIPPED);
    assert!(!fx.host.commands().iter().any(|c| c.contains("dist-upgrade")));
}

#[tokio::test]
async fn test_no_upgrade_available() {
    let fx = Fixture::new();
    fx.env.update_options(|o| o.action_managed_upgrade = true);
    let mut charm = fx.charm().await;

    let outcome = actions::openstack_upgrade(&mut charm).await.unwrap();
    assert_eq!(outcome, NO_UPGRADE);
    assert!(fx.host.commands().is_empty());
}

#[tokio::test]
async fn test_failed_upgrade_reports_action_failure() {
    let fx = icehouse_on_trusty(true);
    fx.host.fail_command("apt-get");
    let mut charm = fx.charm().await;

    actions::run(&mut charm, Action::OpenStackUpgrade)
        .await
        .unwrap();

    assert!(fx.env.action_results().is_empty());
    assert_eq!(fx.env.action_failures().len(), 1);
    assert!(fx.env.action_failures()[0].contains("apt-get"));
}

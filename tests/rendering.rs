//! Rendering to a real filesystem root.

mod common;

use common::Fixture;
use heat_charm::host::{Host, SystemHost};
use heat_charm::render::{ConfigRegistry, HEAT_API_PASTE, HEAT_CONF};
use heat_charm::restart::RestartGuard;
use heat_charm::HookState;

#[tokio::test]
async fn test_write_all_lands_under_root() {
    let fx = Fixture::new().with_all_relations();
    let state = HookState::gather(fx.env.as_ref(), fx.host.as_ref(), &fx.settings)
        .await
        .unwrap();
    let registry = ConfigRegistry::new(state.effective_release());

    let dir = tempfile::tempdir().unwrap();
    let host = SystemHost::new(dir.path());
    registry.write_all(&state, &host).await.unwrap();

    let conf = std::fs::read_to_string(dir.path().join("etc/heat/heat.conf")).unwrap();
    assert!(conf.starts_with("###"));
    assert!(conf.contains("[keystone_authtoken]"));
    assert!(dir.path().join("etc/heat/api-paste.ini").exists());
    assert!(dir.path().join("etc/haproxy/haproxy.cfg").exists());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(dir.path().join("etc/heat/heat.conf"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    assert_eq!(
        host.read_file(HEAT_CONF).await.unwrap().unwrap(),
        conf.into_bytes()
    );
}

#[tokio::test]
async fn test_rerender_is_byte_identical() {
    let fx = Fixture::new().with_all_relations();
    let state = HookState::gather(fx.env.as_ref(), fx.host.as_ref(), &fx.settings)
        .await
        .unwrap();
    let registry = ConfigRegistry::new(state.effective_release());

    let dir = tempfile::tempdir().unwrap();
    let host = SystemHost::new(dir.path());
    registry.write_all(&state, &host).await.unwrap();
    let paste = std::fs::read(dir.path().join("etc/heat/api-paste.ini")).unwrap();

    let guard = RestartGuard::capture(&host, registry.release()).await.unwrap();
    registry.write_all(&state, &host).await.unwrap();
    assert!(guard.changed_services(&host).await.unwrap().is_empty());
    assert_eq!(host.read_file(HEAT_API_PASTE).await.unwrap().unwrap(), paste);
}

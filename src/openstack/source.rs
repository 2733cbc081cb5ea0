//! Package source configuration.

use crate::error::Result;
use crate::host::process::args;
use crate::host::Host;
use crate::openstack::release::InstallSource;

pub const CLOUD_ARCHIVE_LIST: &str = "/etc/apt/sources.list.d/cloud-archive.list";
const CLOUD_ARCHIVE_URL: &str = "http://ubuntu-cloud.archive.canonical.com/ubuntu";

/// apt source line for a cloud archive pocket.
pub fn cloud_archive_line(series: &str, release: &str, proposed: bool) -> String {
    let pocket = if proposed { "proposed" } else { "updates" };
    format!(
        "# Ubuntu Cloud Archive\ndeb {} {}-{}/{} main\n",
        CLOUD_ARCHIVE_URL, series, pocket, release
    )
}

/// Point apt at the packages `origin` names.
pub async fn configure_installation_source(host: &dyn Host, origin: &str) -> Result<()> {
    match InstallSource::parse(origin)? {
        InstallSource::Distro => {
            tracing::debug!("Using distro packages");
        }
        InstallSource::CloudArchive {
            series,
            release,
            proposed,
        } => {
            host.apt_install(&args(&["ubuntu-cloud-keyring"]), &[]).await?;
            let line = cloud_archive_line(&series, release.codename(), proposed);
            host.write_file(CLOUD_ARCHIVE_LIST, line.as_bytes(), 0o644)
                .await?;
            tracing::info!(series = %series, release = %release, "Configured cloud archive");
        }
        InstallSource::Repository(source) => {
            host.run("add-apt-repository", &args(&["--yes", &source]))
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    #[tokio::test]
    async fn test_cloud_archive_source() {
        let host = RecordingHost::new();
        configure_installation_source(&host, "cloud:trusty-liberty")
            .await
            .unwrap();
        assert_eq!(host.installed(), vec!["ubuntu-cloud-keyring"]);
        assert_eq!(
            host.file_string(CLOUD_ARCHIVE_LIST).unwrap(),
            "# Ubuntu Cloud Archive\ndeb http://ubuntu-cloud.archive.canonical.com/ubuntu trusty-updates/liberty main\n"
        );
    }

    #[tokio::test]
    async fn test_ppa_source() {
        let host = RecordingHost::new();
        configure_installation_source(&host, "ppa:openstack-ubuntu-testing/heat")
            .await
            .unwrap();
        assert!(host.ran("add-apt-repository --yes ppa:openstack-ubuntu-testing/heat"));
    }

    #[tokio::test]
    async fn test_distro_is_noop() {
        let host = RecordingHost::new();
        configure_installation_source(&host, "distro").await.unwrap();
        assert!(host.commands().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_source_is_error() {
        let host = RecordingHost::new();
        assert!(configure_installation_source(&host, "svn:trunk").await.is_err());
    }
}

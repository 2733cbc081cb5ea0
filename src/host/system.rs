//! Host access for a real Ubuntu machine.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{CharmError, Result};
use crate::host::network::{parse_ip_addr_output, InterfaceAddress};
use crate::host::process::{args, check_call, check_output};
use crate::host::{Host, ServiceAction};

#[derive(Debug, Clone)]
pub struct SystemHost {
    root: PathBuf,
}

impl SystemHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve an absolute charm path under the configured root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

/// Parse `dpkg-query -f '${db:Status-Abbrev} ${Version}'` output.
fn parse_dpkg_status(output: &str) -> Option<String> {
    let mut parts = output.split_whitespace();
    let status = parts.next()?;
    let version = parts.next()?;
    status.starts_with("ii").then(|| version.to_string())
}

/// DISTRIB_CODENAME from /etc/lsb-release.
fn parse_lsb_codename(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.strip_prefix("DISTRIB_CODENAME=")
            .map(|v| v.trim().trim_matches('"').to_string())
    })
}

#[async_trait]
impl Host for SystemHost {
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.resolve(path);
        match fs::read(&full).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CharmError::io(full.display().to_string(), e)),
        }
    }

    async fn write_file(&self, path: &str, content: &[u8], mode: u32) -> Result<()> {
        let full = self.resolve(path);
        let display = full.display().to_string();
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CharmError::io(parent.display().to_string(), e))?;
        }
        fs::write(&full, content)
            .await
            .map_err(|e| CharmError::io(display.clone(), e))?;
        set_mode(&full, mode)
            .await
            .map_err(|e| CharmError::io(display, e))
    }

    async fn file_exists(&self, path: &str) -> bool {
        fs::metadata(self.resolve(path)).await.is_ok()
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>> {
        let full = self.resolve(path);
        let mut entries = match fs::read_dir(&full).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CharmError::io(full.display().to_string(), e)),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CharmError::io(full.display().to_string(), e))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn copy_file(&self, from: &str, to_dir: &str) -> Result<()> {
        let src = self.resolve(from);
        let name = src
            .file_name()
            .ok_or_else(|| CharmError::io(from, std::io::ErrorKind::InvalidInput.into()))?;
        let dest = self.resolve(to_dir).join(name);
        // fs::copy carries permission bits over.
        fs::copy(&src, &dest)
            .await
            .map_err(|e| CharmError::io(dest.display().to_string(), e))?;
        Ok(())
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<()> {
        check_call(program, args).await
    }

    async fn package_version(&self, package: &str) -> Result<Option<String>> {
        let argv = args(&["-W", "-f=${db:Status-Abbrev} ${Version}", package]);
        match check_output("dpkg-query", &argv).await {
            Ok(out) => Ok(parse_dpkg_status(&out)),
            Err(CharmError::Command { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn apt_update(&self) -> Result<()> {
        tracing::info!("Updating apt cache");
        check_call("apt-get", &args(&["update"])).await
    }

    async fn apt_install(&self, packages: &[String], options: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        tracing::info!(packages = ?packages, "Installing packages");
        let mut argv = args(&["--assume-yes"]);
        argv.extend(options.iter().cloned());
        argv.push("install".to_string());
        argv.extend(packages.iter().cloned());
        check_call("apt-get", &argv).await
    }

    async fn apt_upgrade(&self, options: &[String], dist: bool) -> Result<()> {
        let mut argv = args(&["--assume-yes"]);
        argv.extend(options.iter().cloned());
        argv.push(if dist { "dist-upgrade" } else { "upgrade" }.to_string());
        check_call("apt-get", &argv).await
    }

    async fn service(&self, action: ServiceAction, name: &str) -> Result<bool> {
        match check_call("systemctl", &[action.to_string(), name.to_string()]).await {
            Ok(()) => Ok(true),
            Err(CharmError::Command { stderr, .. }) => {
                tracing::warn!(service = name, action = %action, stderr = %stderr, "Service action failed");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn interfaces(&self) -> Result<Vec<InterfaceAddress>> {
        let out = check_output("ip", &args(&["-o", "addr", "show"])).await?;
        Ok(parse_ip_addr_output(&out))
    }

    async fn os_series(&self) -> Result<String> {
        let content = self
            .read_file("/etc/lsb-release")
            .await?
            .map(|c| String::from_utf8_lossy(&c).into_owned())
            .unwrap_or_default();
        Ok(parse_lsb_codename(&content).unwrap_or_default())
    }

    fn cpu_count(&self) -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dpkg_status() {
        assert_eq!(
            parse_dpkg_status("ii  1:10.0.0-0ubuntu1"),
            Some("1:10.0.0-0ubuntu1".to_string())
        );
        assert_eq!(parse_dpkg_status("un  "), None);
        assert_eq!(parse_dpkg_status("rc  2014.1-0ubuntu1"), None);
    }

    #[test]
    fn test_parse_lsb_codename() {
        let content = "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=16.04\nDISTRIB_CODENAME=xenial\n";
        assert_eq!(parse_lsb_codename(content), Some("xenial".to_string()));
    }

    #[tokio::test]
    async fn test_files_resolve_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let host = SystemHost::new(dir.path());

        host.write_file("/etc/heat/heat.conf", b"[DEFAULT]\n", 0o640)
            .await
            .unwrap();
        assert!(dir.path().join("etc/heat/heat.conf").is_file());
        assert_eq!(
            host.read_file("/etc/heat/heat.conf").await.unwrap(),
            Some(b"[DEFAULT]\n".to_vec())
        );
        assert_eq!(host.read_file("/etc/heat/missing").await.unwrap(), None);
        assert_eq!(host.list_dir("/etc/heat").await.unwrap(), vec!["heat.conf"]);
        assert!(host.list_dir("/nope").await.unwrap().is_empty());
    }
}

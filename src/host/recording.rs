//! In-memory host double.
//!
//! Files live in a map, commands and service actions are recorded in call
//! order, and package versions, interfaces and series are whatever the test
//! arranged.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{CharmError, Result};
use crate::host::network::InterfaceAddress;
use crate::host::process::display_command;
use crate::host::{Host, ServiceAction};

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<String, Vec<u8>>,
    commands: Vec<String>,
    services: Vec<(ServiceAction, String)>,
    installed: Vec<String>,
    versions: BTreeMap<String, String>,
    failing_services: BTreeSet<(String, String)>,
    failing_commands: BTreeSet<String>,
    interfaces: Vec<InterfaceAddress>,
    series: String,
    writes: usize,
}

#[derive(Debug)]
pub struct RecordingHost {
    inner: Mutex<Inner>,
    cpus: usize,
}

impl Default for RecordingHost {
    fn default() -> Self {
        let host = Self {
            inner: Mutex::new(Inner::default()),
            cpus: 2,
        };
        host.set_series("xenial");
        host
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_series(&self, series: &str) {
        self.lock().series = series.to_string();
    }

    pub fn set_package_version(&self, package: &str, version: &str) {
        self.lock()
            .versions
            .insert(package.to_string(), version.to_string());
    }

    pub fn set_interfaces(&self, interfaces: Vec<InterfaceAddress>) {
        self.lock().interfaces = interfaces;
    }

    pub fn put_file(&self, path: &str, content: &[u8]) {
        self.lock().files.insert(path.to_string(), content.to_vec());
    }

    /// Make a service action report failure.
    pub fn fail_service(&self, action: ServiceAction, name: &str) {
        self.lock()
            .failing_services
            .insert((action.to_string(), name.to_string()));
    }

    /// Make any command whose program matches fail.
    pub fn fail_command(&self, program: &str) {
        self.lock().failing_commands.insert(program.to_string());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }

    pub fn file_string(&self, path: &str) -> Option<String> {
        self.file(path)
            .map(|c| String::from_utf8_lossy(&c).into_owned())
    }

    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    pub fn ran(&self, command: &str) -> bool {
        self.lock().commands.iter().any(|c| c == command)
    }

    pub fn services(&self) -> Vec<(ServiceAction, String)> {
        self.lock().services.clone()
    }

    /// Services that received a given action, in order.
    pub fn services_with(&self, action: ServiceAction) -> Vec<String> {
        self.lock()
            .services
            .iter()
            .filter(|(a, _)| *a == action)
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn installed(&self) -> Vec<String> {
        self.lock().installed.clone()
    }

    /// Number of file writes performed.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn record(&self, program: &str, args: &[String]) -> Result<()> {
        let command = display_command(program, args);
        let mut inner = self.lock();
        inner.commands.push(command.clone());
        if inner.failing_commands.contains(program) {
            return Err(CharmError::Command {
                command,
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.file(path))
    }

    async fn write_file(&self, path: &str, content: &[u8], _mode: u32) -> Result<()> {
        let mut inner = self.lock();
        inner.writes += 1;
        inner.files.insert(path.to_string(), content.to_vec());
        Ok(())
    }

    async fn file_exists(&self, path: &str) -> bool {
        let inner = self.lock();
        let dir = format!("{}/", path.trim_end_matches('/'));
        inner.files.contains_key(path) || inner.files.keys().any(|k| k.starts_with(&dir))
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>> {
        let dir = format!("{}/", path.trim_end_matches('/'));
        let names: BTreeSet<String> = self
            .lock()
            .files
            .keys()
            .filter_map(|k| k.strip_prefix(&dir))
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn copy_file(&self, from: &str, to_dir: &str) -> Result<()> {
        let content = self
            .file(from)
            .ok_or_else(|| CharmError::io(from, std::io::ErrorKind::NotFound.into()))?;
        let name = from.rsplit('/').next().unwrap_or(from);
        let dest = format!("{}/{}", to_dir.trim_end_matches('/'), name);
        self.write_file(&dest, &content, 0o755).await
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<()> {
        self.record(program, args)
    }

    async fn package_version(&self, package: &str) -> Result<Option<String>> {
        Ok(self.lock().versions.get(package).cloned())
    }

    async fn apt_update(&self) -> Result<()> {
        self.record("apt-get", &["update".to_string()])
    }

    async fn apt_install(&self, packages: &[String], options: &[String]) -> Result<()> {
        let mut argv = options.to_vec();
        argv.push("install".to_string());
        argv.extend(packages.iter().cloned());
        self.record("apt-get", &argv)?;
        self.lock().installed.extend(packages.iter().cloned());
        Ok(())
    }

    async fn apt_upgrade(&self, options: &[String], dist: bool) -> Result<()> {
        let mut argv = options.to_vec();
        argv.push(if dist { "dist-upgrade" } else { "upgrade" }.to_string());
        self.record("apt-get", &argv)
    }

    async fn service(&self, action: ServiceAction, name: &str) -> Result<bool> {
        let mut inner = self.lock();
        inner.services.push((action, name.to_string()));
        Ok(!inner
            .failing_services
            .contains(&(action.to_string(), name.to_string())))
    }

    async fn interfaces(&self) -> Result<Vec<InterfaceAddress>> {
        Ok(self.lock().interfaces.clone())
    }

    async fn os_series(&self) -> Result<String> {
        Ok(self.lock().series.clone())
    }

    fn cpu_count(&self) -> usize {
        self.cpus
    }
}

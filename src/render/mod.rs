//! Configuration file rendering.
//!
//! # Data Flow
//! ```text
//! ConfigRegistry::new(release)
//!     → resource_map(release): path → contexts, services, template
//!
//! write(path) / write_all()
//!     → ContextSet::gather(contexts of the file, HookState)
//!     → templates.rs (one function per template)
//!     → Host::write_file
//! ```
//!
//! # Design Decisions
//! - The registry is built once per hook invocation and owned by the charm
//! - The resource map is also the source of the restart map, so a file and
//!   the services that read it cannot drift apart
//! - Templates are plain functions over typed contexts; incomplete contexts
//!   leave their section out

pub mod templates;

use crate::context::{ContextKind, ContextSet};
use crate::endpoints::{bind_host, canonical_url, EndpointType};
use crate::error::Result;
use crate::host::Host;
use crate::openstack::OpenStackRelease;
use crate::state::HookState;

pub use templates::RenderInputs;

pub const HEAT_CONF: &str = "/etc/heat/heat.conf";
pub const HEAT_API_PASTE: &str = "/etc/heat/api-paste.ini";
pub const HAPROXY_CONF: &str = "/etc/haproxy/haproxy.cfg";
pub const HTTPS_SITE: &str = "/etc/apache2/sites-available/openstack_https_frontend";
pub const HTTPS_SITE_CONF: &str = "/etc/apache2/sites-available/openstack_https_frontend.conf";
pub const MEMCACHED_CONF: &str = "/etc/memcached.conf";

pub const API_SERVICES: [&str; 2] = ["heat-api", "heat-api-cfn"];
pub const BASE_SERVICES: [&str; 3] = ["heat-api", "heat-api-cfn", "heat-engine"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    HeatConf,
    ApiPaste,
    HaProxy,
    ApacheSite,
    Memcached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: &'static str,
    pub contexts: Vec<ContextKind>,
    pub services: Vec<&'static str>,
    pub template: Template,
    pub mode: u32,
}

/// Every file the charm manages for a release, in render order.
pub fn resource_map(release: OpenStackRelease) -> Vec<ConfigFile> {
    use ContextKind::*;

    let mut files = vec![
        ConfigFile {
            path: HEAT_CONF,
            contexts: vec![
                Amqp,
                SharedDb,
                IdentityService,
                Https,
                ConfigFlags,
                Security,
                InstanceUser,
                Logging,
                Workers,
                Memcache,
            ],
            services: BASE_SERVICES.to_vec(),
            template: Template::HeatConf,
            mode: 0o640,
        },
        ConfigFile {
            path: HEAT_API_PASTE,
            contexts: vec![IdentityService],
            services: API_SERVICES.to_vec(),
            template: Template::ApiPaste,
            mode: 0o644,
        },
        ConfigFile {
            path: HAPROXY_CONF,
            contexts: vec![HaProxy],
            services: vec!["haproxy"],
            template: Template::HaProxy,
            mode: 0o644,
        },
        ConfigFile {
            path: HTTPS_SITE,
            contexts: vec![Https],
            services: vec!["apache2"],
            template: Template::ApacheSite,
            mode: 0o644,
        },
        ConfigFile {
            path: HTTPS_SITE_CONF,
            contexts: vec![Https],
            services: vec!["apache2"],
            template: Template::ApacheSite,
            mode: 0o644,
        },
    ];

    if release.enables_memcache() {
        files.push(ConfigFile {
            path: MEMCACHED_CONF,
            contexts: vec![Memcache],
            services: vec!["memcached"],
            template: Template::Memcached,
            mode: 0o644,
        });
    }
    files
}

/// Renderer for the files of one OpenStack release.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    release: OpenStackRelease,
    files: Vec<ConfigFile>,
}

impl ConfigRegistry {
    pub fn new(release: OpenStackRelease) -> Self {
        Self {
            release,
            files: resource_map(release),
        }
    }

    pub fn release(&self) -> OpenStackRelease {
        self.release
    }

    /// Switch templates after an upgrade.
    pub fn set_release(&mut self, release: OpenStackRelease) {
        tracing::info!(from = %self.release, to = %release, "Switching template release");
        self.release = release;
        self.files = resource_map(release);
    }

    pub fn files(&self) -> &[ConfigFile] {
        &self.files
    }

    pub fn file(&self, path: &str) -> Option<&ConfigFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Rendered content of a registered file.
    pub fn render(&self, path: &str, state: &HookState) -> Result<Option<String>> {
        let file = match self.file(path) {
            Some(file) => file,
            None => {
                tracing::warn!(path, "Not rendering unregistered config file");
                return Ok(None);
            }
        };
        let contexts = ContextSet::gather(&file.contexts, state)?;
        let https = contexts.is_complete(ContextKind::Https);
        let inputs = RenderInputs {
            release: self.release,
            public_url: canonical_url(state, EndpointType::Public, https)?,
            bind_host: bind_host(state.options.prefer_ipv6),
        };

        let mut out = String::new();
        match file.template {
            Template::HeatConf => templates::heat_conf(&mut out, &contexts, &inputs)?,
            Template::ApiPaste => templates::api_paste(&mut out, &contexts, &inputs)?,
            Template::HaProxy => templates::haproxy_cfg(&mut out, &contexts)?,
            Template::ApacheSite => templates::apache_site(&mut out, &contexts)?,
            Template::Memcached => templates::memcached_conf(&mut out, &contexts)?,
        }
        Ok(Some(out))
    }

    pub async fn write(&self, path: &str, state: &HookState, host: &dyn Host) -> Result<()> {
        let Some(content) = self.render(path, state)? else {
            return Ok(());
        };
        let mode = self.file(path).map_or(0o644, |f| f.mode);
        host.write_file(path, content.as_bytes(), mode).await?;
        tracing::debug!(path, "Wrote config file");
        Ok(())
    }

    pub async fn write_all(&self, state: &HookState, host: &dyn Host) -> Result<()> {
        for file in &self.files {
            self.write(file.path, state, host).await?;
        }
        tracing::info!(files = self.files.len(), release = %self.release, "Rendered all config files");
        Ok(())
    }
}

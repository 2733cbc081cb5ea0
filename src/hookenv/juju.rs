//! Hook tool client.
//!
//! # Responsibilities
//! - Invoke the hook tools Juju places on PATH during a hook
//! - Decode their `--format=json` output
//! - Encode settings as `key=value` arguments

use async_trait::async_trait;

use crate::config::CharmOptions;
use crate::error::Result;
use crate::hookenv::{HookEnvironment, RelationData, WorkloadStatus};
use crate::host::process::{args, check_call, check_output};

/// [`HookEnvironment`] backed by the real hook tools.
#[derive(Debug, Default, Clone)]
pub struct JujuCli {
    unit_name: Option<String>,
}

impl JujuCli {
    pub fn new() -> Self {
        Self {
            unit_name: std::env::var("JUJU_UNIT_NAME").ok(),
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(&self, tool: &str, extra: &[&str]) -> Result<T> {
        let mut argv = args(&["--format=json"]);
        argv.extend(args(extra));
        let out = check_output(tool, &argv).await?;
        let out = out.trim();
        Ok(serde_json::from_str(if out.is_empty() { "null" } else { out })?)
    }
}

fn key_values(settings: &RelationData) -> Vec<String> {
    settings
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect()
}

#[async_trait]
impl HookEnvironment for JujuCli {
    async fn config(&self) -> Result<CharmOptions> {
        let out = check_output("config-get", &args(&["--all", "--format=json"])).await?;
        Ok(CharmOptions::from_json(&out)?)
    }

    async fn relation_ids(&self, endpoint: &str) -> Result<Vec<String>> {
        let ids: Option<Vec<String>> = self.json("relation-ids", &[endpoint]).await?;
        Ok(ids.unwrap_or_default())
    }

    async fn related_units(&self, relation_id: &str) -> Result<Vec<String>> {
        let units: Option<Vec<String>> = self.json("related-units", &["-r", relation_id]).await?;
        Ok(units.unwrap_or_default())
    }

    async fn relation_get(&self, relation_id: &str, unit: &str) -> Result<RelationData> {
        let data: Option<RelationData> = self
            .json("relation-get", &["-r", relation_id, "-", unit])
            .await?;
        Ok(data.unwrap_or_default())
    }

    async fn relation_set(&self, relation_id: Option<&str>, settings: &RelationData) -> Result<()> {
        if settings.is_empty() {
            return Ok(());
        }
        let mut argv = Vec::new();
        if let Some(rid) = relation_id {
            argv.push("-r".to_string());
            argv.push(rid.to_string());
        }
        argv.extend(key_values(settings));
        tracing::debug!(relation_id = ?relation_id, keys = settings.len(), "relation-set");
        check_call("relation-set", &argv).await
    }

    async fn leader_get(&self) -> Result<RelationData> {
        let data: Option<RelationData> = self.json("leader-get", &[]).await?;
        Ok(data.unwrap_or_default())
    }

    async fn leader_set(&self, settings: &RelationData) -> Result<()> {
        if settings.is_empty() {
            return Ok(());
        }
        check_call("leader-set", &key_values(settings)).await
    }

    async fn is_leader(&self) -> Result<bool> {
        self.json("is-leader", &[]).await
    }

    fn local_unit(&self) -> String {
        self.unit_name.clone().unwrap_or_default()
    }

    async fn private_address(&self) -> Result<String> {
        let out = check_output("unit-get", &args(&["private-address"])).await?;
        Ok(out.trim().to_string())
    }

    async fn binding_address(&self, binding: &str) -> Result<Option<String>> {
        match check_output("network-get", &args(&["--primary-address", binding])).await {
            Ok(out) => {
                let addr = out.trim();
                Ok((!addr.is_empty()).then(|| addr.to_string()))
            }
            Err(e) => {
                tracing::debug!(binding, error = %e, "network-get unavailable");
                Ok(None)
            }
        }
    }

    async fn open_port(&self, port: u16) -> Result<()> {
        check_call("open-port", &[format!("{}/tcp", port)]).await
    }

    async fn status_set(&self, status: &WorkloadStatus) -> Result<()> {
        check_call(
            "status-set",
            &[status.state.to_string(), status.message.clone()],
        )
        .await
    }

    async fn action_set(&self, values: &RelationData) -> Result<()> {
        check_call("action-set", &key_values(values)).await
    }

    async fn action_fail(&self, message: &str) -> Result<()> {
        check_call("action-fail", &[message.to_string()]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hookenv::settings;

    #[test]
    fn test_key_values_sorted() {
        let data = settings([("vhost", "openstack"), ("username", "heat")]);
        assert_eq!(key_values(&data), vec!["username=heat", "vhost=openstack"]);
    }
}

//! Workload status assessment.

use crate::context::ContextKind;
use crate::error::Result;
use crate::hookenv::event::Endpoint;
use crate::hookenv::{WorkloadState, WorkloadStatus};
use crate::hooks::Charm;
use crate::state::HookState;

/// Relations the services cannot run without: (label, endpoint, context).
pub const REQUIRED_INTERFACES: [(&str, Endpoint, ContextKind); 3] = [
    ("database", Endpoint::SharedDb, ContextKind::SharedDb),
    ("messaging", Endpoint::Amqp, ContextKind::Amqp),
    ("identity", Endpoint::IdentityService, ContextKind::IdentityService),
];

/// Blocked on missing relations, waiting on incomplete ones, active
/// otherwise.
pub fn workload_status(state: &HookState) -> Result<WorkloadStatus> {
    let mut missing = Vec::new();
    let mut incomplete = Vec::new();
    for (label, endpoint, kind) in REQUIRED_INTERFACES {
        if !state.is_related(endpoint) {
            missing.push(label);
        } else if kind.build(state)?.is_none() {
            incomplete.push(label);
        }
    }

    let status = if !missing.is_empty() {
        WorkloadStatus::new(
            WorkloadState::Blocked,
            format!("Missing relations: {}", missing.join(", ")),
        )
    } else if !incomplete.is_empty() {
        WorkloadStatus::new(
            WorkloadState::Waiting,
            format!("Incomplete relations: {}", incomplete.join(", ")),
        )
    } else {
        WorkloadStatus::new(WorkloadState::Active, "Unit is ready")
    };
    Ok(status)
}

impl Charm {
    pub async fn assess_status(&self) -> Result<WorkloadStatus> {
        let status = workload_status(&self.state)?;
        tracing::debug!(state = %status.state, message = %status.message, "Workload status");
        self.env().status_set(&status).await?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hookenv::settings;
    use crate::state::RelationUnit;

    fn related(state: &mut HookState, endpoint: Endpoint, data: &[(&str, &str)]) {
        let rid = format!("{}:1", endpoint.name());
        state.relation_ids.insert(endpoint, vec![rid.clone()]);
        state.units.insert(
            endpoint,
            vec![RelationUnit {
                relation_id: rid,
                unit: "remote/0".into(),
                data: settings(data.iter().copied()),
            }],
        );
    }

    #[test]
    fn test_missing_before_incomplete() {
        let mut state = HookState::default();
        related(&mut state, Endpoint::Amqp, &[]);
        let status = workload_status(&state).unwrap();
        assert_eq!(status.state, WorkloadState::Blocked);
        assert_eq!(status.message, "Missing relations: database, identity");
    }

    #[test]
    fn test_incomplete_and_ready() {
        let mut state = HookState::default();
        related(&mut state, Endpoint::Amqp, &[("password", "pw"), ("private-address", "10.0.0.5")]);
        related(&mut state, Endpoint::SharedDb, &[]);
        related(
            &mut state,
            Endpoint::IdentityService,
            &[("service_host", "k"), ("auth_host", "k"), ("service_password", "pw")],
        );
        let status = workload_status(&state).unwrap();
        assert_eq!(status.state, WorkloadState::Waiting);
        assert_eq!(status.message, "Incomplete relations: database");

        related(&mut state, Endpoint::SharedDb, &[("db_host", "db"), ("heat_password", "pw")]);
        let status = workload_status(&state).unwrap();
        assert_eq!(status, WorkloadStatus::new(WorkloadState::Active, "Unit is ready"));
    }
}

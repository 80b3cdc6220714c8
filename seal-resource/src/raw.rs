//! Single-value sealed resource

use seal_engine::{seal_one, Scope, SealError};
use serde::{Deserialize, Serialize};

use crate::{last_updated_now, SealLifecycle};

/// Desired configuration for one sealed value, as it arrives from the
/// declarative configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlan {
    pub name: String,
    pub namespace: String,
    pub secret: String,
    /// Sealing scope: 0 strict | 1 namespace-wide | 2 cluster-wide
    pub scope: i32,
    pub pubkey: String,
}

/// State persisted by the host after a successful seal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawState {
    pub name: String,
    pub namespace: String,
    pub secret: String,
    pub scope: i32,
    pub pubkey: String,
    pub sealed: String,
    pub last_updated: String,
}

/// Lifecycle adapter for a single sealed value.
#[derive(Debug, Default)]
pub struct RawResource;

impl RawResource {
    fn seal_plan(&self, plan: &RawPlan) -> Result<RawState, SealError> {
        // Scope arrives as a raw integer; validate before anything else runs.
        let scope = Scope::try_from(plan.scope)?;

        let item = seal_one(&plan.name, &plan.namespace, scope, &plan.pubkey, &plan.secret)
            .map_err(|err| {
                tracing::warn!("sealing {}/{} failed: {}", plan.namespace, plan.name, err);
                err
            })?;
        tracing::info!("sealed {}/{}", plan.namespace, plan.name);

        Ok(RawState {
            name: plan.name.clone(),
            namespace: plan.namespace.clone(),
            secret: plan.secret.clone(),
            scope: plan.scope,
            pubkey: plan.pubkey.clone(),
            sealed: item.into_string(),
            last_updated: last_updated_now(),
        })
    }
}

impl SealLifecycle for RawResource {
    type Plan = RawPlan;
    type State = RawState;

    fn create(&self, plan: &RawPlan) -> Result<RawState, SealError> {
        self.seal_plan(plan)
    }

    fn update(&self, plan: &RawPlan) -> Result<RawState, SealError> {
        self.seal_plan(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use seal_engine::ValidationError;
    use crate::LAST_UPDATED_FORMAT;

    const RSA_CERT: &str = include_str!("../../seal-engine/testdata/rsa2048-cert.pem");
    const EXPIRED_CERT: &str = include_str!("../../seal-engine/testdata/expired-cert.pem");

    fn plan() -> RawPlan {
        RawPlan {
            name: "example".to_string(),
            namespace: "default".to_string(),
            secret: "very_secret_secret".to_string(),
            scope: 0,
            pubkey: RSA_CERT.to_string(),
        }
    }

    #[test]
    fn test_create_seals_and_stamps() {
        let state = RawResource.create(&plan()).unwrap();
        assert!(!state.sealed.is_empty());
        assert_ne!(state.sealed, state.secret);
        assert!(
            NaiveDateTime::parse_from_str(&state.last_updated, LAST_UPDATED_FORMAT).is_ok(),
            "last_updated {:?} must match the RFC 850 stamp",
            state.last_updated
        );
    }

    #[test]
    fn test_update_reseals_with_fresh_randomness() {
        let resource = RawResource;
        let a = resource.update(&plan()).unwrap();
        let b = resource.update(&plan()).unwrap();
        assert_ne!(a.sealed, b.sealed);
    }

    #[test]
    fn test_out_of_range_scope_rejected_at_boundary() {
        let mut plan = plan();
        plan.scope = 3;
        // Garbage pubkey proves scope validation happens before key parsing
        plan.pubkey = "not a pem".to_string();

        let err = RawResource.create(&plan).unwrap_err();
        assert!(matches!(
            err,
            SealError::Validation(ValidationError::InvalidScope(3))
        ));
    }

    #[test]
    fn test_engine_error_surfaced_verbatim_without_state() {
        let mut plan = plan();
        plan.pubkey = EXPIRED_CERT.to_string();

        let err = RawResource.create(&plan).unwrap_err();
        assert!(err.to_string().contains("expired on"));
    }

    #[test]
    fn test_read_and_delete_are_noops() {
        let state = RawResource.create(&plan()).unwrap();
        let read_back = RawResource.read(state.clone()).unwrap();
        assert_eq!(read_back, state);
        RawResource.delete(state).unwrap();
    }

    #[test]
    fn test_plan_deserializes_from_declarative_surface() {
        let plan: RawPlan = serde_json::from_str(
            r#"{
                "name": "example",
                "namespace": "default",
                "secret": "hunter2",
                "scope": 1,
                "pubkey": "unused here"
            }"#,
        )
        .unwrap();
        assert_eq!(plan.scope, 1);
        assert_eq!(plan.namespace, "default");
    }
}

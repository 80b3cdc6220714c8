//! Multi-value sealed resource
//!
//! Seals a whole key→value mapping in one apply. All values share the
//! resource's (name, namespace, scope) identity, so they are sealed under
//! one label and stand or fall together: any failing item fails the apply
//! and no state is produced.

use std::collections::BTreeMap;

use seal_engine::{seal_many, Scope, SealError};
use serde::{Deserialize, Serialize};

use crate::{last_updated_now, SealLifecycle};

/// Desired configuration for a mapping of sealed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawsPlan {
    pub name: String,
    pub namespace: String,
    pub values: BTreeMap<String, String>,
    /// Sealing scope: 0 strict | 1 namespace-wide | 2 cluster-wide
    pub scope: i32,
    pub pubkey: String,
}

/// State persisted by the host after a successful seal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawsState {
    pub name: String,
    pub namespace: String,
    pub values: BTreeMap<String, String>,
    pub scope: i32,
    pub pubkey: String,
    pub sealed: BTreeMap<String, String>,
    pub last_updated: String,
}

/// Lifecycle adapter for a mapping of sealed values.
#[derive(Debug, Default)]
pub struct RawsResource;

impl RawsResource {
    fn seal_plan(&self, plan: &RawsPlan) -> Result<RawsState, SealError> {
        let scope = Scope::try_from(plan.scope)?;

        let sealed = seal_many(
            &plan.name,
            &plan.namespace,
            scope,
            &plan.pubkey,
            &plan.values,
        )
        .map_err(|err| {
            tracing::warn!("sealing {}/{} failed: {}", plan.namespace, plan.name, err);
            err
        })?;
        tracing::info!(
            "sealed {} item(s) for {}/{}",
            sealed.len(),
            plan.namespace,
            plan.name
        );

        Ok(RawsState {
            name: plan.name.clone(),
            namespace: plan.namespace.clone(),
            values: plan.values.clone(),
            scope: plan.scope,
            pubkey: plan.pubkey.clone(),
            sealed: sealed
                .into_iter()
                .map(|(key, item)| (key, item.into_string()))
                .collect(),
            last_updated: last_updated_now(),
        })
    }
}

impl SealLifecycle for RawsResource {
    type Plan = RawsPlan;
    type State = RawsState;

    fn create(&self, plan: &RawsPlan) -> Result<RawsState, SealError> {
        self.seal_plan(plan)
    }

    fn update(&self, plan: &RawsPlan) -> Result<RawsState, SealError> {
        self.seal_plan(plan)
    }
}

//! Sealing scopes and authentication-label derivation
//!
//! The label is bound into both encryption steps as associated data, tying
//! a sealed value to the name/namespace it was sealed for. A value sealed
//! under one label cannot be unsealed under another.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How tightly a sealed value is bound to its identity.
///
/// Wire encoding is the integer 0/1/2; anything else is rejected at the
/// boundary before any label or crypto logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Bound to exact name and namespace.
    Strict,
    /// Bound to namespace only; the name may change.
    NamespaceWide,
    /// Not bound; unsealable anywhere in the cluster.
    ClusterWide,
}

impl Scope {
    /// Integer wire encoding of this scope.
    pub fn as_i32(self) -> i32 {
        match self {
            Scope::Strict => 0,
            Scope::NamespaceWide => 1,
            Scope::ClusterWide => 2,
        }
    }
}

impl TryFrom<i32> for Scope {
    type Error = ValidationError;

    fn try_from(raw: i32) -> Result<Self, ValidationError> {
        match raw {
            0 => Ok(Scope::Strict),
            1 => Ok(Scope::NamespaceWide),
            2 => Ok(Scope::ClusterWide),
            other => Err(ValidationError::InvalidScope(other)),
        }
    }
}

/// Derive the authentication label for a (name, namespace, scope) identity.
///
/// * `Strict`: `namespace + "/" + name`, both required
/// * `NamespaceWide`: `namespace`, required
/// * `ClusterWide`: empty label
///
/// Pure function: identical inputs always yield identical bytes.
pub fn encryption_label(
    name: &str,
    namespace: &str,
    scope: Scope,
) -> Result<Vec<u8>, ValidationError> {
    let label = match scope {
        Scope::Strict => {
            if namespace.is_empty() {
                return Err(ValidationError::MissingField("namespace"));
            }
            if name.is_empty() {
                return Err(ValidationError::MissingField("name"));
            }
            format!("{namespace}/{name}")
        }
        Scope::NamespaceWide => {
            if namespace.is_empty() {
                return Err(ValidationError::MissingField("namespace"));
            }
            namespace.to_string()
        }
        Scope::ClusterWide => String::new(),
    };
    Ok(label.into_bytes())
}

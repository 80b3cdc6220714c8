//! Declarative resource adapter for the sealing engine
//!
//! Maps the engine's two entry points onto declarative lifecycle hooks.
//! Create and update are the same operation — re-seal with fresh randomness
//! — and read and delete are no-ops, because sealed ciphertext can neither
//! be inspected nor reversed from here. The adapter holds no sealing logic
//! of its own; engine errors pass through verbatim and state is only ever
//! produced for a fully successful seal.

mod raw;
mod raws;

pub use raw::{RawPlan, RawResource, RawState};
pub use raws::{RawsPlan, RawsResource, RawsState};

use chrono::Utc;
use seal_engine::SealError;

/// Timestamp format for `last_updated` (RFC 850, always stamped in UTC).
pub const LAST_UPDATED_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S UTC";

pub(crate) fn last_updated_now() -> String {
    Utc::now().format(LAST_UPDATED_FORMAT).to_string()
}

/// Lifecycle hooks a declarative host framework drives.
///
/// Every apply re-seals: the engine's output is randomized, so the adapter
/// never compares ciphertexts to decide whether anything changed. Hosts
/// wanting drift detection must track plaintext equality themselves.
pub trait SealLifecycle {
    type Plan;
    type State;

    /// Seal the planned values and return the state to persist.
    fn create(&self, plan: &Self::Plan) -> Result<Self::State, SealError>;

    /// Identical to create: re-seal everything with fresh randomness.
    fn update(&self, plan: &Self::Plan) -> Result<Self::State, SealError>;

    /// Sealed ciphertext cannot be read back; state passes through.
    fn read(&self, state: Self::State) -> Result<Self::State, SealError> {
        Ok(state)
    }

    /// Nothing to release; sealed values live in the host's state store.
    fn delete(&self, _state: Self::State) -> Result<(), SealError> {
        Ok(())
    }
}

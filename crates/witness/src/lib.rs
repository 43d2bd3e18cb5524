//! Witness coordinator: watches the ledger for locks, attests each one exactly once and
//! submits the attestation to the bridge.

mod attest;
mod coordinator;
mod errors;
mod store;

pub use attest::attest_lock;
pub use coordinator::{BatchSummary, CoordinatorConfig, CoordinatorState, WitnessCoordinator};
pub use errors::{StoreError, WitnessError};
pub use store::{FileWitnessStore, MemoryWitnessStore, WitnessStore};

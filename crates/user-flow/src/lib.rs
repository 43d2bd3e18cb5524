//! Client side of a lock: submit it, then wait for the witnesses to reach quorum.

mod errors;
mod flow;
mod proof;

pub use errors::{LockFlowError, ProofError};
pub use flow::LockFlow;
pub use proof::QuorumProof;

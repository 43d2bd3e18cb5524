//! Per-lock accumulation of witness signatures up to a quorum.

mod aggregator;
mod errors;

pub use aggregator::{QuorumAggregator, SubmitOutcome, TallyStatus};
pub use errors::AggregatorError;

//! In-process reference ledger.
//!
//! Executes transactions through the same envelope checks a node would apply, runs the
//! accounts and bridge modules, and publishes one block per executed batch to any number
//! of independent subscribers.

mod context;
mod dispatcher;
mod ledger;
mod modules;

pub use context::TxContext;
pub use dispatcher::Dispatcher;
pub use ledger::{LocalLedger, RuntimeConfig};
pub use modules::{accounts::Accounts, bridge::Bridge};

//! Boundary to the ledger node: submitting encoded transactions, watching finalized
//! blocks and fetching the raw events of a round.

mod client;
mod errors;
mod subscription;
mod types;

#[cfg(feature = "test-utils")]
pub use client::MockLedgerClient;
pub use client::{sign_and_submit, submit_transaction, LedgerClient};
pub use errors::LedgerError;
pub use subscription::{subscription_channel, BlockSender, BlockSubscription, SubscriptionHandle};
pub use types::{BlockNotification, RawEvent, RuntimeId};

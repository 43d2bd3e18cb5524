//! Ambient plumbing shared by ferry processes: logging, shutdown signalling and retry
//! policy.

pub mod logging;
pub mod retry;
pub mod shutdown;

pub use retry::RetryConfig;
pub use shutdown::{ShutdownGuard, ShutdownSignal};

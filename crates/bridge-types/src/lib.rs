//! Types for the bridge module: call bodies, emitted events, module errors and the
//! witness set parameters.

mod calls;
mod constants;
mod errors;
mod events;
mod params;

pub use calls::{Lock, LockResult, Release, Witness};
pub use constants::*;
pub use errors::{BridgeError, ParamsError};
pub use events::{BridgeEvent, LockEvent, ReleaseEvent, WitnessesSignedEvent};
pub use params::BridgeParameters;

/// Identifier the ledger assigns to each successful lock.
pub type LockId = u64;

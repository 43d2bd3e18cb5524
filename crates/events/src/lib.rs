//! Turns raw ledger block notifications into typed domain events.
//!
//! Events are matched by an exact [`EventKey`]. A malformed entry is skipped with a warning
//! and never stops the rest of the block from being decoded.

mod decode;
mod key;

pub use decode::{
    decode_bridge_events, decode_events, encode_event, subscribe, DecodeError, DomainEvent,
};
pub use key::EventKey;

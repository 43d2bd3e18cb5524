//! Names and codes that make up the bridge module's wire contract.

/// Module name used in method names, event keys and failure descriptors.
pub const BRIDGE_MODULE_NAME: &str = "bridge";

pub const METHOD_LOCK: &str = "bridge.Lock";
pub const METHOD_WITNESS: &str = "bridge.Witness";
pub const METHOD_RELEASE: &str = "bridge.Release";

pub const LOCKED_EVENT_CODE: u32 = 1;
pub const RELEASED_EVENT_CODE: u32 = 2;
pub const WITNESSES_SIGNED_EVENT_CODE: u32 = 3;

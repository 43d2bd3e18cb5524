use ferry_primitives::impl_fixed_bytes;
use serde::{Deserialize, Serialize};

/// Identifier of the runtime whose ledger a client talks to.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeId([u8; 32]);

impl_fixed_bytes!(RuntimeId, 32);

/// One raw event as stored in a block: opaque key and value bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(with = "hex::serde")]
    pub key: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub value: Vec<u8>,
}

impl RawEvent {
    pub fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self { key, value }
    }
}

/// A finalized block as seen by subscribers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNotification {
    pub round: u64,
    pub events: Vec<RawEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_id_parse() {
        let hex = "ab".repeat(32);
        let id: RuntimeId = hex.parse().unwrap();
        assert_eq!(id.as_bytes(), &[0xab; 32]);
        assert!("abcd".parse::<RuntimeId>().is_err());
    }

    #[test]
    fn test_raw_event_json_hex() {
        let ev = RawEvent::new(b"bridge".to_vec(), vec![1, 2]);
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"key":"627269646765","value":"0102"}"#);
    }
}

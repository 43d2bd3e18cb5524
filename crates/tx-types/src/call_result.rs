use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::TxError;

/// Outcome of executing a call: either an opaque success payload or a failure descriptor.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum CallResult {
    #[serde(rename = "ok")]
    Ok(#[serde(with = "hex::serde")] Vec<u8>),

    #[serde(rename = "fail")]
    Failed { module: String, code: u32 },
}

impl CallResult {
    /// Successful result carrying the borsh encoding of `value`.
    pub fn ok<T: BorshSerialize>(value: &T) -> Result<Self, TxError> {
        Ok(CallResult::Ok(borsh::to_vec(value)?))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Ok(_))
    }

    /// `(module, code)` of a failed result.
    pub fn failure(&self) -> Option<(&str, u32)> {
        match self {
            CallResult::Ok(_) => None,
            CallResult::Failed { module, code } => Some((module.as_str(), *code)),
        }
    }

    /// True if this failed with exactly `(module, code)`.
    pub fn is_failure(&self, module: &str, code: u32) -> bool {
        self.failure() == Some((module, code))
    }

    /// Decodes the success payload as `T`. `None` for failed results.
    pub fn decode_ok<T: BorshDeserialize>(&self) -> Option<Result<T, TxError>> {
        match self {
            CallResult::Ok(raw) => Some(borsh::from_slice(raw).map_err(TxError::from)),
            CallResult::Failed { .. } => None,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, TxError> {
        Ok(borsh::to_vec(self)?)
    }

    pub fn decode(raw: &[u8]) -> Result<Self, TxError> {
        Ok(borsh::from_slice(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_descriptor() {
        let res = CallResult::Failed {
            module: "bridge".to_owned(),
            code: 1,
        };
        assert!(!res.is_success());
        assert!(res.is_failure("bridge", 1));
        assert!(!res.is_failure("bridge", 2));
        assert!(res.decode_ok::<u64>().is_none());

        let back = CallResult::decode(&res.encode().unwrap()).unwrap();
        assert_eq!(back, res);
    }

    #[test]
    fn test_ok_payload() {
        let res = CallResult::ok(&42u64).unwrap();
        assert!(res.is_success());
        assert_eq!(res.decode_ok::<u64>().unwrap().unwrap(), 42);
        assert_eq!(res.failure(), None);
    }

    #[test]
    fn test_json_tagging() {
        let res = CallResult::Failed {
            module: "core".to_owned(),
            code: 3,
        };
        let json = serde_json::to_string(&res).unwrap();
        assert_eq!(json, r#"{"fail":{"module":"core","code":3}}"#);
    }
}

use borsh::{BorshDeserialize, BorshSerialize};
use ferry_primitives::{Address, BaseUnits, Signature};
use serde::{Deserialize, Serialize};

use crate::LockId;

/// Body of `bridge.Lock`.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Lock {
    pub amount: BaseUnits,
}

/// Success payload of `bridge.Lock`.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockResult {
    pub id: LockId,
}

/// Body of `bridge.Witness`. The witness identity is the transaction caller.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Witness {
    pub id: LockId,
    #[serde(rename = "sig")]
    pub signature: Signature,
}

/// Body of `bridge.Release`.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Release {
    pub id: LockId,
    pub owner: Address,
    pub amount: BaseUnits,
}

use borsh::{BorshDeserialize, BorshSerialize};
use ferry_primitives::{Address, BaseUnits, Signature};
use serde::{Deserialize, Serialize};

use crate::{LockId, LOCKED_EVENT_CODE, RELEASED_EVENT_CODE, WITNESSES_SIGNED_EVENT_CODE};

/// Emitted when a lock call executes.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct LockEvent {
    pub id: LockId,
    pub owner: Address,
    pub amount: BaseUnits,
}

impl LockEvent {
    /// Canonical bytes that witnesses sign.
    pub fn signing_payload(&self) -> Result<Vec<u8>, std::io::Error> {
        borsh::to_vec(self)
    }
}

/// Emitted when a release call executes.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub id: LockId,
    pub owner: Address,
    pub amount: BaseUnits,
}

/// Emitted exactly once per lock when its quorum is reached. Signatures are in arrival
/// order.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct WitnessesSignedEvent {
    pub id: LockId,
    #[serde(rename = "sigs")]
    pub signatures: Vec<Signature>,
}

/// Any event the bridge module emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeEvent {
    Locked(LockEvent),
    Released(ReleaseEvent),
    WitnessesSigned(WitnessesSignedEvent),
}

impl BridgeEvent {
    pub fn code(&self) -> u32 {
        match self {
            BridgeEvent::Locked(_) => LOCKED_EVENT_CODE,
            BridgeEvent::Released(_) => RELEASED_EVENT_CODE,
            BridgeEvent::WitnessesSigned(_) => WITNESSES_SIGNED_EVENT_CODE,
        }
    }

    pub fn lock_id(&self) -> LockId {
        match self {
            BridgeEvent::Locked(ev) => ev.id,
            BridgeEvent::Released(ev) => ev.id,
            BridgeEvent::WitnessesSigned(ev) => ev.id,
        }
    }

    /// Event value bytes, without the key.
    pub fn encode_value(&self) -> Result<Vec<u8>, std::io::Error> {
        match self {
            BridgeEvent::Locked(ev) => borsh::to_vec(ev),
            BridgeEvent::Released(ev) => borsh::to_vec(ev),
            BridgeEvent::WitnessesSigned(ev) => borsh::to_vec(ev),
        }
    }
}

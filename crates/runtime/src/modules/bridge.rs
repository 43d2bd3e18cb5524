use std::collections::HashSet;

use borsh::{BorshDeserialize, BorshSerialize};
use ferry_bridge_types::{
    BridgeError, BridgeEvent, BridgeParameters, Lock, LockEvent, LockId, LockResult, Release,
    ReleaseEvent, Witness,
};
use ferry_primitives::ContextPolicy;
use ferry_quorum::{QuorumAggregator, SubmitOutcome};
use ferry_tx_types::{CallResult, CoreError, ModuleError};
use tracing::*;

use crate::TxContext;

/// The bridge module: assigns lock ids, collects witness attestations and records releases.
#[derive(Debug)]
pub struct Bridge {
    next_lock_id: LockId,
    aggregator: QuorumAggregator,
    released: HashSet<LockId>,
}

impl Bridge {
    pub fn new(params: BridgeParameters, policy: ContextPolicy) -> Self {
        Self {
            next_lock_id: 1,
            aggregator: QuorumAggregator::new(params, policy),
            released: HashSet::new(),
        }
    }

    pub fn aggregator(&self) -> &QuorumAggregator {
        &self.aggregator
    }

    /// Routes a bridge method. Failures become a `Failed` call result.
    pub fn dispatch(&mut self, ctx: &mut TxContext, method: &str, body: &[u8]) -> CallResult {
        let res = match method {
            "Lock" => decode(body).and_then(|b| self.lock(ctx, b)),
            "Witness" => decode(body).and_then(|b| self.witness(ctx, b)),
            "Release" => decode(body).and_then(|b| self.release(ctx, b)),
            _ => return CoreError::InvalidMethod.to_call_result(),
        };
        match res {
            Ok(result) => result,
            Err(err) => {
                debug!(%method, %err, "bridge call failed");
                err.to_call_result()
            }
        }
    }

    fn lock(&mut self, ctx: &mut TxContext, body: Lock) -> Result<CallResult, BridgeError> {
        if body.amount.amount().is_zero() {
            return Err(BridgeError::InvalidArgument);
        }

        let id = self.next_lock_id;
        let event = LockEvent {
            id,
            owner: ctx.caller(),
            amount: body.amount,
        };
        self.aggregator.record_lock(event.clone())?;
        self.next_lock_id += 1;

        info!(%id, owner = %event.owner, amount = %event.amount, "lock recorded");
        ctx.emit_event(BridgeEvent::Locked(event));
        ok(&LockResult { id })
    }

    fn witness(&mut self, ctx: &mut TxContext, body: Witness) -> Result<CallResult, BridgeError> {
        let witness = ctx.caller();
        match self.aggregator.submit(&witness, body.id, body.signature)? {
            SubmitOutcome::QuorumReached(signed) => {
                ctx.emit_event(BridgeEvent::WitnessesSigned(signed));
            }
            SubmitOutcome::Counted { count } | SubmitOutcome::AfterQuorum { count } => {
                debug!(id = %body.id, %witness, %count, "witness signature counted");
            }
            SubmitOutcome::Duplicate => {}
        }
        ok(&())
    }

    fn release(&mut self, ctx: &mut TxContext, body: Release) -> Result<CallResult, BridgeError> {
        let lock = self
            .aggregator
            .lock_event(body.id)
            .ok_or(BridgeError::InvalidSequenceNumber)?;
        let attested = self
            .aggregator
            .status(body.id)
            .is_some_and(|s| s.quorum_reached);
        if !attested {
            return Err(BridgeError::NotAuthorized);
        }
        if lock.owner != body.owner || lock.amount != body.amount {
            return Err(BridgeError::InvalidArgument);
        }
        if !self.released.insert(body.id) {
            return Err(BridgeError::InvalidSequenceNumber);
        }

        info!(id = %body.id, "release recorded");
        ctx.emit_event(BridgeEvent::Released(ReleaseEvent {
            id: body.id,
            owner: body.owner,
            amount: body.amount,
        }));
        ok(&())
    }
}

fn decode<T: BorshDeserialize>(body: &[u8]) -> Result<T, BridgeError> {
    borsh::from_slice(body).map_err(|_| BridgeError::InvalidArgument)
}

fn ok<T: BorshSerialize>(value: &T) -> Result<CallResult, BridgeError> {
    CallResult::ok(value).map_err(|_| BridgeError::InvalidArgument)
}

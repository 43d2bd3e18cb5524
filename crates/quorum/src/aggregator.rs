use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use ferry_bridge_types::{BridgeParameters, LockEvent, LockId, WitnessesSignedEvent};
use ferry_primitives::{
    crypto::WITNESS_SIGNATURE_CONTEXT, Address, ContextPolicy, Signature, SignatureContext,
};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::AggregatorError;

/// What happened to a submitted witness signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Counted; quorum not reached yet.
    Counted { count: usize },

    /// This signature reached the quorum. Returned exactly once per lock.
    QuorumReached(WitnessesSignedEvent),

    /// The witness had already signed this lock. Nothing changed.
    Duplicate,

    /// Counted after the quorum was reached. No new event.
    AfterQuorum { count: usize },
}

/// Snapshot of one lock's tally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TallyStatus {
    pub count: usize,
    pub quorum_reached: bool,
}

#[derive(Debug)]
struct Tally {
    event: LockEvent,
    signers: HashSet<Address>,
    signatures: Vec<Signature>,
    quorum_reached: bool,
}

/// Accumulates witness signatures per lock and reports when a lock first reaches quorum.
///
/// Distinct witnesses are identified by address. Each lock has its own critical section, so
/// concurrent submissions for different locks do not contend and concurrent submissions
/// for the same lock are counted one at a time.
#[derive(Debug)]
pub struct QuorumAggregator {
    params: BridgeParameters,
    policy: ContextPolicy,
    locks: Mutex<HashMap<LockId, Arc<Mutex<Tally>>>>,
}

impl QuorumAggregator {
    pub fn new(params: BridgeParameters, policy: ContextPolicy) -> Self {
        Self {
            params,
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn params(&self) -> &BridgeParameters {
        &self.params
    }

    /// Starts tracking a lock so witnesses can attest it.
    pub fn record_lock(&self, event: LockEvent) -> Result<(), AggregatorError> {
        let mut locks = self.locks.lock();
        if locks.contains_key(&event.id) {
            return Err(AggregatorError::LockExists(event.id));
        }
        let id = event.id;
        locks.insert(
            id,
            Arc::new(Mutex::new(Tally {
                event,
                signers: HashSet::new(),
                signatures: Vec::new(),
                quorum_reached: false,
            })),
        );
        Ok(())
    }

    pub fn lock_event(&self, id: LockId) -> Option<LockEvent> {
        let tally = self.locks.lock().get(&id).cloned()?;
        let event = tally.lock().event.clone();
        Some(event)
    }

    pub fn status(&self, id: LockId) -> Option<TallyStatus> {
        let tally = self.locks.lock().get(&id).cloned()?;
        let tally = tally.lock();
        Some(TallyStatus {
            count: tally.signers.len(),
            quorum_reached: tally.quorum_reached,
        })
    }

    /// Counts `signature` from `witness` toward lock `id`.
    ///
    /// The signature is verified against the witness's registered key and the lock's
    /// canonical payload before it can be counted. An invalid signature is an error, never a
    /// silent no-op.
    pub fn submit(
        &self,
        witness: &Address,
        id: LockId,
        signature: Signature,
    ) -> Result<SubmitOutcome, AggregatorError> {
        let key = self
            .params
            .witness_key(witness)
            .ok_or(AggregatorError::NotAuthorized(*witness))?;
        let tally = self
            .locks
            .lock()
            .get(&id)
            .cloned()
            .ok_or(AggregatorError::UnknownLock(id))?;

        let mut tally = tally.lock();
        if tally.signers.contains(witness) {
            debug!(%id, %witness, "duplicate witness signature ignored");
            return Ok(SubmitOutcome::Duplicate);
        }

        let payload = tally
            .event
            .signing_payload()
            .map_err(|e| AggregatorError::Payload(e.to_string()))?;
        key.try_verify(
            &self.policy,
            &SignatureContext::from(WITNESS_SIGNATURE_CONTEXT),
            &payload,
            &signature,
        )?;

        tally.signers.insert(*witness);
        tally.signatures.push(signature);
        let count = tally.signers.len();

        if tally.quorum_reached {
            return Ok(SubmitOutcome::AfterQuorum { count });
        }
        if count >= self.params.quorum() {
            tally.quorum_reached = true;
            info!(%id, %count, "lock reached witness quorum");
            return Ok(SubmitOutcome::QuorumReached(WitnessesSignedEvent {
                id,
                signatures: tally.signatures.clone(),
            }));
        }
        Ok(SubmitOutcome::Counted { count })
    }
}

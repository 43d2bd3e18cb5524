use ferry_bridge_types::{BridgeParameters, LockEvent};
use ferry_primitives::{
    crypto::WITNESS_SIGNATURE_CONTEXT, ContextPolicy, Signature, SignatureContext,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ProofError;

/// A lock together with the witness signatures the ledger published for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumProof {
    pub lock: LockEvent,
    #[serde(rename = "sigs")]
    pub signatures: Vec<Signature>,
}

impl QuorumProof {
    pub fn new(lock: LockEvent, signatures: Vec<Signature>) -> Self {
        Self { lock, signatures }
    }

    /// Checks the proof against a witness set.
    ///
    /// Each witness counts at most once, however many of its signatures are present.
    /// Signatures from keys outside the set, or over another payload, are ignored.
    /// Returns the number of distinct witnesses that signed.
    pub fn verify(
        &self,
        params: &BridgeParameters,
        policy: &ContextPolicy,
    ) -> Result<usize, ProofError> {
        let payload = self
            .lock
            .signing_payload()
            .map_err(|e| ProofError::Encoding(e.to_string()))?;
        let context = SignatureContext::from(WITNESS_SIGNATURE_CONTEXT);

        let mut signed = vec![false; params.witnesses().len()];
        for signature in &self.signatures {
            let signer = params
                .witnesses()
                .iter()
                .enumerate()
                .find(|(i, pk)| !signed[*i] && pk.verify(policy, &context, &payload, signature));
            match signer {
                Some((i, _)) => signed[i] = true,
                None => debug!(lock_id = %self.lock.id, "signature matches no unused witness key"),
            }
        }

        let valid = signed.iter().filter(|s| **s).count();
        if valid < params.quorum() {
            return Err(ProofError::InsufficientSignatures {
                valid,
                quorum: params.quorum(),
            });
        }
        Ok(valid)
    }
}

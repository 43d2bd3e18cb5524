use ferry_bridge_types::{BridgeEvent, BridgeParameters};
use ferry_primitives::{Address, ContextPolicy};
use ferry_tx_types::{split_method, CallResult, CoreError, ModuleError, Transaction};
use tracing::*;

use crate::{Accounts, Bridge, TxContext};

/// Result of executing one accepted transaction.
#[derive(Debug)]
pub struct ExecutedTx {
    pub result: CallResult,
    pub events: Vec<BridgeEvent>,
}

/// Checks envelopes and routes calls to modules.
#[derive(Debug)]
pub struct Dispatcher {
    policy: ContextPolicy,
    accounts: Accounts,
    bridge: Bridge,
}

impl Dispatcher {
    pub fn new(params: BridgeParameters, policy: ContextPolicy) -> Self {
        Self {
            bridge: Bridge::new(params, policy.clone()),
            accounts: Accounts::default(),
            policy,
        }
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Decodes and checks a transaction without executing it.
    ///
    /// Checks run in order: decoding, structural validation, signatures, nonces.
    pub fn check_tx(&self, raw: &[u8]) -> Result<Transaction, CoreError> {
        let tx = Transaction::decode(raw).map_err(|err| {
            debug!(%err, "undecodable transaction");
            CoreError::MalformedTransaction
        })?;
        tx.validate_basic()?;
        tx.verify_signatures(&self.policy).map_err(|err| {
            debug!(%err, "transaction signature check failed");
            CoreError::InvalidSignature
        })?;
        for info in tx.auth_info().signer_info() {
            self.accounts.check_nonce(&info.address(), info.nonce())?;
        }
        Ok(tx)
    }

    /// Checks and executes a transaction.
    ///
    /// An `Err` means the transaction was refused and had no effect. Once accepted, nonces
    /// are consumed even if the call itself fails.
    pub fn execute_tx(&mut self, raw: &[u8]) -> Result<ExecutedTx, CoreError> {
        let tx = self.check_tx(raw)?;
        for info in tx.auth_info().signer_info() {
            self.accounts.increment_nonce(&info.address());
        }

        let caller = tx.caller().ok_or(CoreError::MalformedTransaction)?;
        let mut ctx = TxContext::new(caller);
        let result = self.dispatch_call(&mut ctx, caller, &tx);
        let events = if result.is_success() {
            ctx.take_events()
        } else {
            Vec::new()
        };

        Ok(ExecutedTx { result, events })
    }

    fn dispatch_call(&mut self, ctx: &mut TxContext, caller: Address, tx: &Transaction) -> CallResult {
        let method = tx.call().method();
        let (module, name) = match split_method(method) {
            Ok(parts) => parts,
            Err(err) => return err.to_call_result(),
        };
        trace!(%caller, %method, "dispatching call");

        match module {
            ferry_bridge_types::BRIDGE_MODULE_NAME => self.bridge.dispatch(ctx, name, tx.call().body()),
            _ => CoreError::InvalidMethod.to_call_result(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ferry_bridge_types::{Lock, LockResult, Witness, METHOD_LOCK, METHOD_WITNESS};
    use ferry_primitives::{
        crypto::WITNESS_SIGNATURE_CONTEXT, BaseUnits, Ed25519Signer, SignatureContext, Signer,
    };
    use ferry_tx_types::{Call, Fee, SignerInfo};

    use super::*;

    struct Fixture {
        dispatcher: Dispatcher,
        witnesses: Vec<Ed25519Signer>,
        user: Ed25519Signer,
    }

    fn fixture(n: u8, quorum: usize) -> Fixture {
        let witnesses: Vec<_> = (0..n).map(|i| Ed25519Signer::from_seed([i + 1; 32])).collect();
        let params =
            BridgeParameters::try_new(witnesses.iter().map(|w| w.public_key()).collect(), quorum)
                .unwrap();
        Fixture {
            dispatcher: Dispatcher::new(params, ContextPolicy::default()),
            witnesses,
            user: Ed25519Signer::from_seed([200; 32]),
        }
    }

    fn tx(signer: &Ed25519Signer, nonce: u64, call: Call) -> Vec<u8> {
        let mut tx = Transaction::new(
            call,
            vec![SignerInfo::new(signer.public_key(), nonce)],
            Fee::default(),
        );
        tx.append_sign(signer).unwrap();
        tx.encode().unwrap()
    }

    fn lock_call(amount: u64) -> Call {
        Call::with_body(METHOD_LOCK, &Lock {
            amount: BaseUnits::native(amount),
        })
        .unwrap()
    }

    #[test]
    fn test_lock_ids_strictly_increase() {
        let mut f = fixture(1, 1);
        for (nonce, expected) in [(0, 1), (1, 2), (2, 3)] {
            let out = f.dispatcher.execute_tx(&tx(&f.user, nonce, lock_call(5))).unwrap();
            let res: LockResult = out.result.decode_ok().unwrap().unwrap();
            assert_eq!(res.id, expected);
            assert_eq!(out.events.len(), 1);
        }
    }

    #[test]
    fn test_zero_amount_is_invalid_argument() {
        let mut f = fixture(1, 1);
        let out = f.dispatcher.execute_tx(&tx(&f.user, 0, lock_call(0))).unwrap();
        assert!(out.result.is_failure("bridge", 1));
        assert!(out.events.is_empty());
        // Nonce is consumed even though the call failed.
        let addr = Address::from_pk(&f.user.public_key());
        assert_eq!(f.dispatcher.accounts().nonce(&addr), 1);
    }

    #[test]
    fn test_envelope_rejections() {
        let mut f = fixture(1, 1);

        assert!(matches!(
            f.dispatcher.execute_tx(&[1, 2, 3]),
            Err(CoreError::MalformedTransaction)
        ));
        assert!(matches!(
            f.dispatcher.execute_tx(&tx(&f.user, 3, lock_call(1))),
            Err(CoreError::InvalidNonce {
                expected: 0,
                actual: 3
            })
        ));

        let unsigned = Transaction::new(
            lock_call(1),
            vec![SignerInfo::new(f.user.public_key(), 0)],
            Fee::default(),
        );
        assert!(matches!(
            f.dispatcher.execute_tx(&unsigned.encode().unwrap()),
            Err(CoreError::InvalidTransaction(_))
        ));

        let mut forged = Transaction::new(
            lock_call(1),
            vec![SignerInfo::new(f.witnesses[0].public_key(), 0)],
            Fee::default(),
        );
        forged.append_sign(&f.witnesses[0]).unwrap();
        let mut raw = forged.encode().unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 1;
        assert!(matches!(
            f.dispatcher.execute_tx(&raw),
            Err(CoreError::InvalidSignature)
        ));
    }

    #[test]
    fn test_unknown_method() {
        let mut f = fixture(1, 1);
        let out = f
            .dispatcher
            .execute_tx(&tx(&f.user, 0, Call::new("bridge.Mint", vec![])))
            .unwrap();
        assert!(out.result.is_failure("core", 3));

        let out = f
            .dispatcher
            .execute_tx(&tx(&f.user, 1, Call::new("staking.Lock", vec![])))
            .unwrap();
        assert!(out.result.is_failure("core", 3));

        let out = f
            .dispatcher
            .execute_tx(&tx(&f.user, 2, Call::new("bridgeLock", vec![])))
            .unwrap();
        assert!(out.result.is_failure("core", 3));
    }

    #[test]
    fn test_witness_flow_errors_and_quorum() {
        let mut f = fixture(2, 2);
        let out = f.dispatcher.execute_tx(&tx(&f.user, 0, lock_call(9))).unwrap();
        let BridgeEvent::Locked(lock) = out.events[0].clone() else {
            panic!("expected lock event");
        };

        let attest = |w: &Ed25519Signer, id| {
            let sig = w
                .sign(
                    &SignatureContext::from(WITNESS_SIGNATURE_CONTEXT),
                    &lock.signing_payload().unwrap(),
                )
                .unwrap();
            Call::with_body(METHOD_WITNESS, &Witness { id, signature: sig }).unwrap()
        };

        // Not a witness.
        let out = f
            .dispatcher
            .execute_tx(&tx(&f.user, 1, attest(&f.user, lock.id)))
            .unwrap();
        assert!(out.result.is_failure("bridge", 2));

        // Unknown lock id.
        let out = f
            .dispatcher
            .execute_tx(&tx(&f.witnesses[0], 0, attest(&f.witnesses[0], 77)))
            .unwrap();
        assert!(out.result.is_failure("bridge", 3));

        // Signature by another key.
        let out = f
            .dispatcher
            .execute_tx(&tx(&f.witnesses[0], 1, attest(&f.witnesses[1], lock.id)))
            .unwrap();
        assert!(out.result.is_failure("bridge", 4));

        // Malformed body.
        let out = f
            .dispatcher
            .execute_tx(&tx(&f.witnesses[0], 2, Call::new(METHOD_WITNESS, vec![1])))
            .unwrap();
        assert!(out.result.is_failure("bridge", 1));

        let out = f
            .dispatcher
            .execute_tx(&tx(&f.witnesses[0], 3, attest(&f.witnesses[0], lock.id)))
            .unwrap();
        assert!(out.result.is_success());
        assert!(out.events.is_empty());

        let out = f
            .dispatcher
            .execute_tx(&tx(&f.witnesses[1], 0, attest(&f.witnesses[1], lock.id)))
            .unwrap();
        assert!(out.result.is_success());
        assert!(matches!(
            &out.events[..],
            [BridgeEvent::WitnessesSigned(ev)] if ev.id == lock.id && ev.signatures.len() == 2
        ));

        // Duplicate after quorum is a no-op.
        let out = f
            .dispatcher
            .execute_tx(&tx(&f.witnesses[1], 1, attest(&f.witnesses[1], lock.id)))
            .unwrap();
        assert!(out.result.is_success());
        assert!(out.events.is_empty());
    }
}

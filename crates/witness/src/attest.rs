use ferry_bridge_types::{LockEvent, Witness, METHOD_WITNESS};
use ferry_common::RetryConfig;
use ferry_ledger::{sign_and_submit, LedgerClient, LedgerError};
use ferry_primitives::{crypto::WITNESS_SIGNATURE_CONTEXT, SignatureContext, Signer};
use ferry_tx_types::{Call, Fee};
use tracing::*;

use crate::WitnessError;

/// Signs `lock`'s canonical payload and submits a `bridge.Witness` call for it.
///
/// Transport failures are retried with `retry`'s backoff. A stale nonce is refreshed and
/// retried once. A failed call result is returned as [`WitnessError::BusinessRejection`]
/// and never retried.
pub async fn attest_lock(
    ledger: &(impl LedgerClient + ?Sized),
    signer: &dyn Signer,
    fee: &Fee,
    retry: &RetryConfig,
    lock: &LockEvent,
) -> Result<(), WitnessError> {
    let id = lock.id;
    let payload = lock
        .signing_payload()
        .map_err(|e| WitnessError::Encoding(e.to_string()))?;
    let signature = signer.sign(&SignatureContext::from(WITNESS_SIGNATURE_CONTEXT), &payload)?;
    let call = Call::with_body(METHOD_WITNESS, &Witness { id, signature })
        .map_err(|e| WitnessError::Encoding(e.to_string()))?;

    let mut attempt = 0;
    let mut nonce_refreshed = false;
    loop {
        // The nonce is fetched again on every attempt.
        let err = match sign_and_submit(ledger, signer, call.clone(), fee.clone()).await {
            Ok(result) => {
                return match result.failure() {
                    None => Ok(()),
                    Some((module, code)) => Err(WitnessError::BusinessRejection {
                        id,
                        module: module.to_owned(),
                        code,
                    }),
                };
            }
            Err(err) => err,
        };

        if err.is_transient() {
            if !retry.should_retry(attempt) {
                return Err(WitnessError::TransportExhausted {
                    id,
                    attempts: attempt + 1,
                    source: err,
                });
            }
            let delay = retry.delay(attempt);
            warn!(lock_id = %id, %attempt, ?delay, %err, "witness submission failed, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
            continue;
        }

        if err.is_stale_nonce() && !nonce_refreshed {
            debug!(lock_id = %id, "stale nonce, refreshing");
            nonce_refreshed = true;
            continue;
        }

        return Err(match err {
            LedgerError::Rejected { module, code } => WitnessError::Rejected { id, module, code },
            other => WitnessError::Ledger(other),
        });
    }
}

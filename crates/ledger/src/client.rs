use async_trait::async_trait;
use ferry_primitives::{Address, Signer};
use ferry_tx_types::{Call, CallResult, Fee, SignerInfo, Transaction};
use tracing::debug;

use crate::{BlockSubscription, LedgerError, RawEvent};

/// Client for a single runtime's ledger.
///
/// All payloads crossing this boundary are opaque encodings.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits an encoded transaction and waits for its encoded [`CallResult`].
    ///
    /// Transactions the ledger refuses before execution return
    /// [`LedgerError::Rejected`].
    async fn submit_tx(&self, tx: Vec<u8>) -> Result<Vec<u8>, LedgerError>;

    /// Subscribes to finalized blocks, starting after the latest one.
    async fn watch_blocks(&self) -> Result<BlockSubscription, LedgerError>;

    /// Raw events emitted in `round`, in emission order.
    async fn get_events(&self, round: u64) -> Result<Vec<RawEvent>, LedgerError>;

    /// Next nonce the ledger expects from `address`.
    async fn get_nonce(&self, address: Address) -> Result<u64, LedgerError>;

    /// Latest finalized round.
    async fn latest_round(&self) -> Result<u64, LedgerError>;
}

/// Encodes, submits and decodes the result of a transaction.
pub async fn submit_transaction(
    client: &(impl LedgerClient + ?Sized),
    tx: &Transaction,
) -> Result<CallResult, LedgerError> {
    let raw = client.submit_tx(tx.encode()?).await?;
    let result = CallResult::decode(&raw)?;
    debug!(method = %tx.call().method(), success = result.is_success(), "transaction executed");
    Ok(result)
}

/// Builds a single-signer transaction with the signer's current nonce, signs it and submits
/// it.
///
/// The nonce is read from the ledger on every call and never cached.
pub async fn sign_and_submit(
    client: &(impl LedgerClient + ?Sized),
    signer: &dyn Signer,
    call: Call,
    fee: Fee,
) -> Result<CallResult, LedgerError> {
    let public_key = signer.public_key();
    let nonce = client.get_nonce(Address::from_pk(&public_key)).await?;

    let mut tx = Transaction::new(call, vec![SignerInfo::new(public_key, nonce)], fee);
    tx.append_sign(signer)
        .map_err(|e| LedgerError::Build(e.to_string()))?;
    tx.validate_basic()
        .map_err(|e| LedgerError::Build(e.to_string()))?;

    submit_transaction(client, &tx).await
}

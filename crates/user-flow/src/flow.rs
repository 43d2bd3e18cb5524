use std::{fmt, sync::Arc, time::Duration};

use ferry_bridge_types::{Lock, LockEvent, LockId, LockResult, WitnessesSignedEvent, METHOD_LOCK};
use ferry_events::{decode_events, subscribe};
use ferry_ledger::{sign_and_submit, BlockSubscription, LedgerClient};
use ferry_primitives::{Address, BaseUnits, Signer};
use ferry_tx_types::{Call, Fee};
use tracing::*;

use crate::{LockFlowError, QuorumProof};

/// Locks funds on behalf of one user and waits for the witnesses to attest it.
pub struct LockFlow<L: ?Sized> {
    ledger: Arc<L>,
    signer: Arc<dyn Signer>,
    fee: Fee,
    deadline: Duration,
}

impl<L: ?Sized> fmt::Debug for LockFlow<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockFlow")
            .field("owner", &Address::from_pk(&self.signer.public_key()))
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl<L: LedgerClient + ?Sized> LockFlow<L> {
    pub fn new(ledger: Arc<L>, signer: Arc<dyn Signer>, fee: Fee, deadline: Duration) -> Self {
        Self {
            ledger,
            signer,
            fee,
            deadline,
        }
    }

    /// Locks `amount` and returns the quorum proof once the ledger publishes it.
    ///
    /// The subscription is opened before the lock is submitted, so the quorum event cannot
    /// fall between the two. A failed lock returns immediately without waiting.
    pub async fn run(&self, amount: BaseUnits) -> Result<QuorumProof, LockFlowError> {
        let owner = Address::from_pk(&self.signer.public_key());
        let span = info_span!("lock_flow", %owner, lock_id = field::Empty);
        self.run_inner(owner, amount).instrument(span).await
    }

    async fn run_inner(
        &self,
        owner: Address,
        amount: BaseUnits,
    ) -> Result<QuorumProof, LockFlowError> {
        let mut sub = subscribe(self.ledger.as_ref()).await?;

        let id = match self.submit_lock(&amount).await {
            Ok(id) => id,
            Err(err) => {
                sub.cancel();
                return Err(err);
            }
        };
        Span::current().record("lock_id", id);
        info!(%amount, "lock executed, waiting for witnesses");

        // The ledger assigns the id. Owner and amount are what we asked for, and
        // witnesses only sign the event the ledger actually emitted.
        let lock = LockEvent { id, owner, amount };

        let res = tokio::time::timeout(self.deadline, wait_for_quorum(&mut sub, id)).await;
        sub.cancel();

        match res {
            Ok(Ok(signed)) => {
                info!(signatures = signed.signatures.len(), "quorum reached");
                Ok(QuorumProof::new(lock, signed.signatures))
            }
            Ok(Err(err)) => {
                warn!(%err, "stopped waiting for quorum");
                Err(err)
            }
            Err(_) => {
                warn!(deadline = ?self.deadline, "no quorum before the deadline");
                Err(LockFlowError::Timeout {
                    id,
                    waited: self.deadline,
                })
            }
        }
    }

    async fn submit_lock(&self, amount: &BaseUnits) -> Result<LockId, LockFlowError> {
        let call = Call::with_body(METHOD_LOCK, &Lock {
            amount: amount.clone(),
        })
        .map_err(|e| LockFlowError::Encoding(e.to_string()))?;

        let result =
            sign_and_submit(self.ledger.as_ref(), self.signer.as_ref(), call, self.fee.clone())
                .await?;

        if let Some((module, code)) = result.failure() {
            warn!(%module, %code, "lock call failed");
            return Err(LockFlowError::Rejected {
                module: module.to_owned(),
                code,
            });
        }

        let decoded = result
            .decode_ok::<LockResult>()
            .ok_or_else(|| LockFlowError::Encoding("lock result missing".to_owned()))?;
        decoded
            .map(|res| res.id)
            .map_err(|e| LockFlowError::Encoding(e.to_string()))
    }
}

/// Reads blocks until the quorum event for `id` shows up.
async fn wait_for_quorum(
    sub: &mut BlockSubscription,
    id: LockId,
) -> Result<WitnessesSignedEvent, LockFlowError> {
    while let Some(block) = sub.next().await {
        let signed: Vec<WitnessesSignedEvent> = decode_events(block.round, &block.events);
        if let Some(ev) = signed.into_iter().find(|ev| ev.id == id) {
            debug!(round = %block.round, "found quorum event");
            return Ok(ev);
        }
    }
    Err(LockFlowError::SubscriptionTerminated { id })
}

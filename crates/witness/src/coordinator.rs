use std::{collections::BTreeMap, fmt, future::Future, sync::Arc};

use ferry_bridge_types::{LockEvent, LockId};
use ferry_common::{RetryConfig, ShutdownGuard};
use ferry_events::{decode_events, subscribe};
use ferry_ledger::{LedgerClient, LedgerError, RawEvent};
use ferry_primitives::{Address, Signer};
use ferry_tx_types::Fee;
use tracing::*;

use crate::{attest_lock, WitnessError, WitnessStore};

/// Lifecycle of a [`WitnessCoordinator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Not subscribed yet.
    Idle,
    /// Subscribed and processing blocks.
    Watching,
    /// Terminal. No further blocks are processed.
    Stopped,
}

#[derive(Clone, Debug, Default)]
pub struct CoordinatorConfig {
    /// Fee offered on every witness transaction.
    pub fee: Fee,
    pub retry: RetryConfig,
}

/// What happened to the locks of one round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub round: u64,
    pub witnessed: usize,
    /// Already witnessed before this round was processed.
    pub skipped: usize,
    /// Refused by the ledger or failed on execution. These remain unwitnessed.
    pub rejected: usize,
}

/// Watches the ledger on behalf of one witness and attests every lock exactly once.
///
/// Locks of a round are attested in ascending id order. Progress is checkpointed in the
/// store after each round, so a restarted coordinator re-scans from the last checkpoint
/// without submitting duplicates.
pub struct WitnessCoordinator<L: ?Sized, S> {
    ledger: Arc<L>,
    store: S,
    signer: Arc<dyn Signer>,
    identity: Address,
    config: CoordinatorConfig,
    state: CoordinatorState,
}

impl<L: ?Sized, S> fmt::Debug for WitnessCoordinator<L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WitnessCoordinator")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<L, S> WitnessCoordinator<L, S>
where
    L: LedgerClient + ?Sized,
    S: WitnessStore,
{
    pub fn new(
        ledger: Arc<L>,
        store: S,
        signer: Arc<dyn Signer>,
        config: CoordinatorConfig,
    ) -> Self {
        let identity = Address::from_pk(&signer.public_key());
        Self {
            ledger,
            store,
            signer,
            identity,
            config,
            state: CoordinatorState::Idle,
        }
    }

    /// Address the aggregator knows this witness by.
    pub fn identity(&self) -> Address {
        self.identity
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs until `shutdown` fires or a fatal error occurs.
    ///
    /// Subscribes first, then catches up on every round after the checkpoint, then
    /// follows the subscription. Returns `Ok` only on shutdown. The coordinator is
    /// [`CoordinatorState::Stopped`] afterwards either way.
    pub async fn run(&mut self, mut shutdown: ShutdownGuard) -> Result<(), WitnessError> {
        if self.state == CoordinatorState::Stopped {
            return Err(WitnessError::SubscriptionTerminated);
        }

        let span = info_span!("witness", identity = %self.identity);
        let res = self.run_inner(&mut shutdown).instrument(span).await;
        self.state = CoordinatorState::Stopped;

        match &res {
            Ok(()) => info!(identity = %self.identity, "witness coordinator stopped"),
            Err(err) => error!(identity = %self.identity, %err, "witness coordinator failed"),
        }
        res
    }

    async fn run_inner(&mut self, shutdown: &mut ShutdownGuard) -> Result<(), WitnessError> {
        let ledger = Arc::clone(&self.ledger);
        let mut sub = subscribe(ledger.as_ref()).await?;
        self.state = CoordinatorState::Watching;

        // Rounds up to the head are fetched directly. Anything the subscription delivers
        // at or below the checkpoint is dropped below.
        let head = retry_transient(&self.config.retry, "reading latest round", || {
            ledger.latest_round()
        })
        .await?;
        let start = self.store.checkpoint() + 1;
        if start <= head {
            info!(from = %start, to = %head, "catching up");
        }
        for round in start..=head {
            if shutdown.should_shutdown() {
                sub.cancel();
                return Ok(());
            }
            let events = retry_transient(&self.config.retry, "fetching round", || {
                ledger.get_events(round)
            })
            .await?;
            self.process_block(round, &events).await?;
        }

        loop {
            let block = tokio::select! {
                biased;
                _ = shutdown.wait_for_shutdown() => {
                    info!("shutdown requested");
                    sub.cancel();
                    return Ok(());
                }
                block = sub.next() => block,
            };

            let Some(block) = block else {
                warn!("block subscription ended");
                return Err(WitnessError::SubscriptionTerminated);
            };

            if block.round <= self.store.checkpoint() {
                trace!(round = %block.round, "round already processed");
                continue;
            }
            self.process_block(block.round, &block.events).await?;
        }
    }

    /// Attests every lock of `round` this witness has not attested yet, then checkpoints
    /// the round.
    ///
    /// Rejected locks are logged, left unwitnessed and recorded in the store for
    /// [`Self::retry_rejected`]. A fatal error aborts the batch without checkpointing it.
    /// Locks attested before the failure stay recorded.
    pub async fn process_block(
        &mut self,
        round: u64,
        events: &[RawEvent],
    ) -> Result<BatchSummary, WitnessError> {
        let locks = sorted_locks(round, events);
        let summary = self.attest_locks(round, &locks).await?;

        if round > self.store.checkpoint() {
            self.store.set_checkpoint(round)?;
        }
        if !locks.is_empty() {
            debug!(?summary, "processed round");
        }
        Ok(summary)
    }

    /// Attests every previously rejected lock again, oldest round first.
    ///
    /// Locks are re-read from the rounds they were locked in. Those that go through leave
    /// the rejected set, those rejected again stay in it. Checkpoints are not touched.
    pub async fn retry_rejected(&mut self) -> Result<Vec<BatchSummary>, WitnessError> {
        let mut by_round: BTreeMap<u64, Vec<LockId>> = BTreeMap::new();
        for (id, round) in self.store.rejected() {
            by_round.entry(round).or_default().push(id);
        }
        if by_round.is_empty() {
            return Ok(Vec::new());
        }
        info!(rounds = by_round.len(), "retrying rejected locks");

        let ledger = Arc::clone(&self.ledger);
        let mut summaries = Vec::with_capacity(by_round.len());
        for (round, ids) in by_round {
            let events = retry_transient(&self.config.retry, "fetching round", || {
                ledger.get_events(round)
            })
            .await?;
            let locks: Vec<_> = sorted_locks(round, &events)
                .into_iter()
                .filter(|lock| ids.contains(&lock.id))
                .collect();
            if locks.len() < ids.len() {
                warn!(%round, expected = ids.len(), found = locks.len(), "rejected locks missing from their round");
            }
            summaries.push(self.attest_locks(round, &locks).await?);
        }
        Ok(summaries)
    }

    async fn attest_locks(
        &mut self,
        round: u64,
        locks: &[LockEvent],
    ) -> Result<BatchSummary, WitnessError> {
        let mut summary = BatchSummary {
            round,
            ..Default::default()
        };

        for lock in locks {
            if self.store.is_witnessed(lock.id) {
                debug!(%round, lock_id = %lock.id, "lock already witnessed");
                summary.skipped += 1;
                continue;
            }

            match attest_lock(
                self.ledger.as_ref(),
                self.signer.as_ref(),
                &self.config.fee,
                &self.config.retry,
                lock,
            )
            .await
            {
                Ok(()) => {
                    self.store.mark_witnessed(lock.id)?;
                    info!(%round, lock_id = %lock.id, owner = %lock.owner, amount = %lock.amount, "witnessed lock");
                    summary.witnessed += 1;
                }
                Err(err) if !err.is_fatal() => {
                    warn!(%round, lock_id = %lock.id, %err, "witness call refused, moving on");
                    self.store.mark_rejected(lock.id, round)?;
                    summary.rejected += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(summary)
    }
}

/// Lock events of a round in ascending id order, each id once.
fn sorted_locks(round: u64, events: &[RawEvent]) -> Vec<LockEvent> {
    let mut locks: Vec<LockEvent> = decode_events(round, events);
    locks.sort_by_key(|lock| lock.id);
    locks.dedup_by_key(|lock| lock.id);
    locks
}

/// Runs a ledger read, retrying transport failures with `retry`'s backoff.
async fn retry_transient<T, F, Fut>(
    retry: &RetryConfig,
    what: &str,
    mut op: F,
) -> Result<T, WitnessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LedgerError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && retry.should_retry(attempt) => {
                let delay = retry.delay(attempt);
                warn!(%attempt, ?delay, %err, "{what} failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use ferry_bridge_types::BridgeParameters;
use ferry_events::encode_event;
use ferry_ledger::{
    subscription_channel, BlockNotification, BlockSender, BlockSubscription, LedgerClient,
    LedgerError, RawEvent,
};
use ferry_primitives::{Address, ContextPolicy};
use ferry_tx_types::{CoreError, ModuleError};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::*;

use crate::Dispatcher;

/// Buffer of each subscriber's delivery channel.
const SUBSCRIBER_BUFFER: usize = 64;

/// Genesis settings for a [`LocalLedger`].
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub params: BridgeParameters,
    pub policy: ContextPolicy,
}

impl RuntimeConfig {
    pub fn new(params: BridgeParameters) -> Self {
        Self {
            params,
            policy: ContextPolicy::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Head {
    round: u64,
    closed: bool,
}

#[derive(Debug)]
struct State {
    dispatcher: Dispatcher,
    /// Events of round `i + 1` live at index `i`.
    blocks: Vec<Vec<RawEvent>>,
}

/// A ledger living in this process. Cheap to clone; clones share state.
///
/// Every accepted transaction is executed immediately and finalized in its own round.
#[derive(Clone, Debug)]
pub struct LocalLedger {
    state: Arc<Mutex<State>>,
    head_tx: Arc<watch::Sender<Head>>,
}

impl LocalLedger {
    pub fn new(config: RuntimeConfig) -> Self {
        let (head_tx, _) = watch::channel(Head {
            round: 0,
            closed: false,
        });
        Self {
            state: Arc::new(Mutex::new(State {
                dispatcher: Dispatcher::new(config.params, config.policy),
                blocks: Vec::new(),
            })),
            head_tx: Arc::new(head_tx),
        }
    }

    /// Executes a batch of encoded transactions in a single round.
    ///
    /// Refused transactions are skipped and do not affect the others. A round is produced
    /// even if every transaction was refused.
    pub fn execute_batch(&self, txs: &[Vec<u8>]) -> Vec<Result<Vec<u8>, LedgerError>> {
        let mut state = self.state.lock();
        let mut events = Vec::new();
        let mut results = Vec::with_capacity(txs.len());

        for raw in txs {
            let res = match state.dispatcher.execute_tx(raw) {
                Ok(executed) => {
                    for ev in &executed.events {
                        match encode_event(ev) {
                            Ok(raw_ev) => events.push(raw_ev),
                            Err(err) => error!(%err, "failed to encode event"),
                        }
                    }
                    executed
                        .result
                        .encode()
                        .map_err(|e| LedgerError::Codec(e.to_string()))
                }
                Err(err) => {
                    debug!(%err, "transaction refused");
                    Err(reject(&err))
                }
            };
            results.push(res);
        }

        let round = Self::push_block(&mut state, events);
        drop(state);
        self.publish(round);
        results
    }

    /// Finalizes a round holding exactly `events`, bypassing execution.
    ///
    /// Lets tests reproduce arbitrary event orderings and duplicates within a block.
    pub fn append_block(&self, events: Vec<RawEvent>) -> u64 {
        let round = Self::push_block(&mut self.state.lock(), events);
        self.publish(round);
        round
    }

    /// Terminates every current and future subscription, as a node shutting down would.
    pub fn close_subscriptions(&self) {
        self.head_tx.send_modify(|head| head.closed = true);
    }

    /// Reads state under the ledger lock.
    pub fn with_dispatcher<R>(&self, f: impl FnOnce(&Dispatcher) -> R) -> R {
        f(&self.state.lock().dispatcher)
    }

    fn push_block(state: &mut State, events: Vec<RawEvent>) -> u64 {
        state.blocks.push(events);
        state.blocks.len() as u64
    }

    fn publish(&self, round: u64) {
        trace!(%round, "round finalized");
        self.head_tx.send_modify(|head| head.round = head.round.max(round));
    }

    fn events_at(&self, round: u64) -> Option<Vec<RawEvent>> {
        let idx = usize::try_from(round.checked_sub(1)?).ok()?;
        self.state.lock().blocks.get(idx).cloned()
    }
}

fn reject(err: &CoreError) -> LedgerError {
    LedgerError::Rejected {
        module: err.module().to_owned(),
        code: err.code(),
    }
}

/// Feeds one subscriber every round after `last_seen`, in order and without gaps.
async fn forward_blocks(
    ledger: LocalLedger,
    mut head_rx: watch::Receiver<Head>,
    mut sender: BlockSender,
    mut last_seen: u64,
) {
    loop {
        let head = *head_rx.borrow_and_update();
        if head.closed {
            debug!("ledger closed, ending subscription");
            return;
        }

        while last_seen < head.round {
            let round = last_seen + 1;
            let Some(events) = ledger.events_at(round) else {
                warn!(%round, "finalized round missing from store");
                return;
            };
            if !sender.send(BlockNotification { round, events }).await {
                return;
            }
            last_seen = round;
        }

        tokio::select! {
            _ = sender.closed() => return,
            changed = head_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl LedgerClient for LocalLedger {
    async fn submit_tx(&self, tx: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        self.execute_batch(&[tx])
            .pop()
            .unwrap_or_else(|| Err(LedgerError::Transport("empty batch result".to_owned())))
    }

    async fn watch_blocks(&self) -> Result<BlockSubscription, LedgerError> {
        let head_rx = self.head_tx.subscribe();
        let head = *head_rx.borrow();
        if head.closed {
            return Err(LedgerError::SubscriptionClosed);
        }

        let (sender, sub) = subscription_channel(SUBSCRIBER_BUFFER);
        tokio::spawn(forward_blocks(self.clone(), head_rx, sender, head.round));
        Ok(sub)
    }

    async fn get_events(&self, round: u64) -> Result<Vec<RawEvent>, LedgerError> {
        self.events_at(round)
            .ok_or(LedgerError::RoundUnavailable(round))
    }

    async fn get_nonce(&self, address: Address) -> Result<u64, LedgerError> {
        Ok(self.with_dispatcher(|d| d.accounts().nonce(&address)))
    }

    async fn latest_round(&self) -> Result<u64, LedgerError> {
        Ok(self.head_tx.borrow().round)
    }
}

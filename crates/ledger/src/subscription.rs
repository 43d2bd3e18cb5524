use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::BlockNotification;

/// Creates a connected producer and subscriber pair.
pub fn subscription_channel(buffer: usize) -> (BlockSender, BlockSubscription) {
    let (tx, rx) = mpsc::channel(buffer);
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let cancel_tx = Arc::new(cancel_tx);

    let sender = BlockSender {
        tx,
        cancel_rx: cancel_rx.clone(),
    };
    let sub = BlockSubscription {
        rx,
        cancel_tx,
        cancel_rx,
        terminated: false,
    };
    (sender, sub)
}

/// Receiving end of a block subscription.
///
/// Once it yields `None`, because it was cancelled or the producer went away, it stays
/// terminated and cannot be restarted.
#[derive(Debug)]
pub struct BlockSubscription {
    rx: mpsc::Receiver<BlockNotification>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
    terminated: bool,
}

impl BlockSubscription {
    /// Waits for the next block. Returns `None` once the subscription has terminated.
    pub async fn next(&mut self) -> Option<BlockNotification> {
        if self.terminated || *self.cancel_rx.borrow() {
            self.terminate();
            return None;
        }

        let next = tokio::select! {
            biased;
            _ = self.cancel_rx.changed() => None,
            block = self.rx.recv() => block,
        };

        if next.is_none() || *self.cancel_rx.borrow() {
            self.terminate();
            return None;
        }
        next
    }

    /// Handle that can cancel this subscription from elsewhere.
    pub fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle {
            cancel_tx: self.cancel_tx.clone(),
        }
    }

    pub fn cancel(&mut self) {
        self.cancel_tx.send_replace(true);
        self.terminate();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn terminate(&mut self) {
        self.terminated = true;
        self.rx.close();
    }
}

/// Cancels a subscription without owning it.
#[derive(Clone, Debug)]
pub struct SubscriptionHandle {
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl SubscriptionHandle {
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

/// Producing end of a block subscription.
#[derive(Debug)]
pub struct BlockSender {
    tx: mpsc::Sender<BlockNotification>,
    cancel_rx: watch::Receiver<bool>,
}

impl BlockSender {
    /// Delivers a block. Returns false if the subscriber is gone or cancelled, in which case
    /// the producer should stop.
    pub async fn send(&self, block: BlockNotification) -> bool {
        if self.is_closed() {
            return false;
        }
        self.tx.send(block).await.is_ok()
    }

    pub fn is_closed(&self) -> bool {
        *self.cancel_rx.borrow() || self.tx.is_closed()
    }

    /// Resolves once the subscriber cancels or is dropped.
    pub async fn closed(&mut self) {
        tokio::select! {
            _ = self.tx.closed() => {}
            _ = self.cancel_rx.wait_for(|c| *c) => {}
        }
    }
}

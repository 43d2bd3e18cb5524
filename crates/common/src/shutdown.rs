//! Process-wide shutdown signalling.

use tokio::sync::watch;

/// Owner side of a shutdown signal. Dropping it does not trigger shutdown.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// New guard observing this signal.
    pub fn guard(&self) -> ShutdownGuard {
        ShutdownGuard {
            rx: self.tx.subscribe(),
        }
    }

    /// Asks every guard to stop. Idempotent.
    pub fn send(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side handed to long running tasks.
#[derive(Clone, Debug)]
pub struct ShutdownGuard {
    rx: watch::Receiver<bool>,
}

impl ShutdownGuard {
    pub fn should_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested. Never resolves if the signal is dropped without
    /// being sent.
    pub async fn wait_for_shutdown(&mut self) {
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_guard_observes_signal() {
        let signal = ShutdownSignal::new();
        let mut guard = signal.guard();
        assert!(!guard.should_shutdown());

        let waiter = tokio::spawn(async move {
            guard.wait_for_shutdown().await;
            guard.should_shutdown()
        });
        signal.send();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_signal_does_not_shut_down() {
        let signal = ShutdownSignal::new();
        let mut guard = signal.guard();
        drop(signal);
        assert!(timeout(Duration::from_millis(20), guard.wait_for_shutdown())
            .await
            .is_err());
    }
}

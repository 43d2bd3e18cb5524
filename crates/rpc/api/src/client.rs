use std::time::Duration;

use async_trait::async_trait;
use ferry_ledger::{
    subscription_channel, BlockNotification, BlockSender, BlockSubscription, LedgerClient,
    LedgerError, RawEvent, RuntimeId,
};
use ferry_primitives::Address;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use tokio::time::sleep;
use tracing::*;

use crate::{from_client_error, HexBytes, LedgerRpcClient};

/// Buffer of the channel feeding a polling subscription.
const SUBSCRIPTION_BUFFER: usize = 64;

/// [`LedgerClient`] over the node's JSON-RPC API.
///
/// Block watching is emulated by polling the latest round.
#[derive(Debug, Clone)]
pub struct RpcLedgerClient {
    client: HttpClient,
    runtime_id: RuntimeId,
    poll_interval: Duration,
}

impl RpcLedgerClient {
    pub fn try_new(
        url: &str,
        runtime_id: RuntimeId,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LedgerError::Transport(format!(
                "unsupported ledger RPC scheme: {url}"
            )));
        }
        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(url)
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            runtime_id,
            poll_interval,
        })
    }

    pub fn runtime_id(&self) -> RuntimeId {
        self.runtime_id
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn submit_tx(&self, tx: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        self.client
            .submit_tx(self.runtime_id, HexBytes(tx))
            .await
            .map(HexBytes::into_inner)
            .map_err(from_client_error)
    }

    async fn watch_blocks(&self) -> Result<BlockSubscription, LedgerError> {
        let head = self.latest_round().await?;
        let (sender, sub) = subscription_channel(SUBSCRIPTION_BUFFER);
        tokio::spawn(poll_blocks(self.clone(), sender, head));
        Ok(sub)
    }

    async fn get_events(&self, round: u64) -> Result<Vec<RawEvent>, LedgerError> {
        self.client
            .get_events(self.runtime_id, round)
            .await
            .map_err(from_client_error)
    }

    async fn get_nonce(&self, address: Address) -> Result<u64, LedgerError> {
        self.client
            .get_nonce(self.runtime_id, address)
            .await
            .map_err(from_client_error)
    }

    async fn latest_round(&self) -> Result<u64, LedgerError> {
        self.client
            .get_latest_round(self.runtime_id)
            .await
            .map_err(from_client_error)
    }
}

/// Delivers every round after `last_seen` to `sender`, polling for new ones.
///
/// Failed fetches are retried on the next tick, so no round is ever skipped. Stops once the
/// subscription is dropped or canceled.
async fn poll_blocks(client: RpcLedgerClient, mut sender: BlockSender, mut last_seen: u64) {
    loop {
        tokio::select! {
            _ = sender.closed() => break,
            _ = sleep(client.poll_interval) => {}
        }

        let head = match client.latest_round().await {
            Ok(head) => head,
            Err(err) => {
                warn!(%err, "polling latest round failed");
                continue;
            }
        };

        while last_seen < head {
            let round = last_seen + 1;
            let events = match client.get_events(round).await {
                Ok(events) => events,
                Err(err) => {
                    warn!(%round, %err, "fetching round failed, will retry");
                    break;
                }
            };
            if !sender.send(BlockNotification { round, events }).await {
                debug!("subscriber gone, stopping poller");
                return;
            }
            last_seen = round;
        }
    }
    debug!(%last_seen, "block poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> Result<RpcLedgerClient, LedgerError> {
        RpcLedgerClient::try_new(
            url,
            RuntimeId::from([0; 32]),
            Duration::from_millis(100),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_http_urls_accepted() {
        assert!(client("http://localhost:8545").is_ok());
        assert!(client("https://node.example:443").is_ok());
    }

    #[test]
    fn test_other_schemes_rejected() {
        let err = client("ws://localhost:8546").unwrap_err();
        match err {
            LedgerError::Transport(msg) => assert!(msg.contains("unsupported ledger RPC scheme")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

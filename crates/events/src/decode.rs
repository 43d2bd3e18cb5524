use borsh::{BorshDeserialize, BorshSerialize};
use ferry_bridge_types::{
    BridgeEvent, LockEvent, ReleaseEvent, WitnessesSignedEvent, BRIDGE_MODULE_NAME,
    LOCKED_EVENT_CODE, RELEASED_EVENT_CODE, WITNESSES_SIGNED_EVENT_CODE,
};
use ferry_ledger::{BlockSubscription, LedgerClient, LedgerError, RawEvent};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::EventKey;

/// A single event that could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed event key {0:?}")]
    MalformedKey(Vec<u8>),

    #[error("malformed value for {key}: {reason}")]
    MalformedValue { key: EventKey, reason: String },
}

/// A typed event with a fixed key.
pub trait DomainEvent: BorshSerialize + BorshDeserialize {
    const MODULE: &'static str;
    const CODE: u32;

    fn key() -> EventKey {
        EventKey::new(Self::MODULE, Self::CODE)
    }

    fn decode_value(raw: &[u8]) -> Result<Self, DecodeError> {
        borsh::from_slice(raw).map_err(|e| DecodeError::MalformedValue {
            key: Self::key(),
            reason: e.to_string(),
        })
    }
}

impl DomainEvent for LockEvent {
    const MODULE: &'static str = BRIDGE_MODULE_NAME;
    const CODE: u32 = LOCKED_EVENT_CODE;
}

impl DomainEvent for ReleaseEvent {
    const MODULE: &'static str = BRIDGE_MODULE_NAME;
    const CODE: u32 = RELEASED_EVENT_CODE;
}

impl DomainEvent for WitnessesSignedEvent {
    const MODULE: &'static str = BRIDGE_MODULE_NAME;
    const CODE: u32 = WITNESSES_SIGNED_EVENT_CODE;
}

/// Opens a block subscription on the ledger.
pub async fn subscribe(
    client: &(impl LedgerClient + ?Sized),
) -> Result<BlockSubscription, LedgerError> {
    let sub = client.watch_blocks().await?;
    debug!("subscribed to ledger blocks");
    Ok(sub)
}

/// Decodes every event of type `E` in `raw`, preserving order.
///
/// Entries with another key are skipped at trace level. Entries with the right key but an
/// undecodable value are skipped with a warning.
pub fn decode_events<E: DomainEvent>(round: u64, raw: &[RawEvent]) -> Vec<E> {
    let key = E::key();
    let mut out = Vec::new();
    for (index, ev) in raw.iter().enumerate() {
        if !key.matches(&ev.key) {
            trace!(%round, %index, expected = %key, "skipping event with another key");
            continue;
        }
        match E::decode_value(&ev.value) {
            Ok(decoded) => out.push(decoded),
            Err(err) => warn!(%round, %index, %err, "skipping undecodable event"),
        }
    }
    out
}

/// Decodes every bridge event in `raw`, preserving order.
pub fn decode_bridge_events(round: u64, raw: &[RawEvent]) -> Vec<BridgeEvent> {
    let mut out = Vec::new();
    for (index, ev) in raw.iter().enumerate() {
        match decode_bridge_event(ev) {
            Ok(Some(decoded)) => out.push(decoded),
            Ok(None) => trace!(%round, %index, "ignoring non-bridge event"),
            Err(err) => warn!(%round, %index, %err, "skipping undecodable event"),
        }
    }
    out
}

fn decode_bridge_event(ev: &RawEvent) -> Result<Option<BridgeEvent>, DecodeError> {
    let key = EventKey::from_bytes(&ev.key)?;
    if key.module() != BRIDGE_MODULE_NAME {
        return Ok(None);
    }
    let decoded = match key.code() {
        LOCKED_EVENT_CODE => BridgeEvent::Locked(LockEvent::decode_value(&ev.value)?),
        RELEASED_EVENT_CODE => BridgeEvent::Released(ReleaseEvent::decode_value(&ev.value)?),
        WITNESSES_SIGNED_EVENT_CODE => {
            BridgeEvent::WitnessesSigned(WitnessesSignedEvent::decode_value(&ev.value)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(decoded))
}

/// Encodes a bridge event into its raw key/value form.
pub fn encode_event(event: &BridgeEvent) -> Result<RawEvent, std::io::Error> {
    let key = EventKey::new(BRIDGE_MODULE_NAME, event.code());
    Ok(RawEvent::new(key.to_bytes(), event.encode_value()?))
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use ferry_primitives::{Address, BaseUnits, Signature};
    use tracing::Level;

    use super::*;

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs.contents())
    }

    fn lock(id: u64) -> BridgeEvent {
        BridgeEvent::Locked(LockEvent {
            id,
            owner: Address::new([1; 21]),
            amount: BaseUnits::native(id),
        })
    }

    fn signed(id: u64) -> BridgeEvent {
        BridgeEvent::WitnessesSigned(WitnessesSignedEvent {
            id,
            signatures: vec![Signature::new(vec![7; 64])],
        })
    }

    #[test]
    fn test_decode_filters_by_key() {
        let raw: Vec<_> = [lock(1), signed(1), lock(2)]
            .iter()
            .map(|e| encode_event(e).unwrap())
            .collect();

        let locks: Vec<LockEvent> = decode_events(5, &raw);
        assert_eq!(locks.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 2]);

        let sigs: Vec<WitnessesSignedEvent> = decode_events(5, &raw);
        assert_eq!(sigs.len(), 1);
    }

    #[test]
    fn test_corrupt_entry_does_not_abort_block() {
        let mut raw: Vec<_> = [lock(1), lock(2), lock(3)]
            .iter()
            .map(|e| encode_event(e).unwrap())
            .collect();
        raw[1].value.truncate(3);
        raw.insert(0, RawEvent::new(vec![1, 2], vec![]));

        let locks: Vec<LockEvent> = decode_events(9, &raw);
        assert_eq!(locks.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 3]);

        let all = decode_bridge_events(9, &raw);
        assert_eq!(all, vec![lock(1), lock(3)]);
    }

    #[test]
    fn test_every_skip_is_logged() {
        let mut raw: Vec<_> = [lock(1), signed(1), lock(2)]
            .iter()
            .map(|e| encode_event(e).unwrap())
            .collect();
        raw[2].value.truncate(2);

        let (locks, logs) = with_captured_logs(|| decode_events::<LockEvent>(7, &raw));

        assert_eq!(locks.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(logs.matches("skipping event with another key").count(), 1);
        assert_eq!(logs.matches("skipping undecodable event").count(), 1);
        assert!(logs.contains("index=1"), "{logs}");
    }

    #[test]
    fn test_decode_bridge_events_ignores_other_modules() {
        let other = RawEvent::new(EventKey::new("accounts", 1).to_bytes(), vec![0xde, 0xad]);
        let unknown_code = RawEvent::new(EventKey::new("bridge", 99).to_bytes(), vec![]);
        let raw = vec![other, encode_event(&signed(4)).unwrap(), unknown_code];
        assert_eq!(decode_bridge_events(1, &raw), vec![signed(4)]);
    }
}

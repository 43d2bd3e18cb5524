use ferry_bridge_types::BridgeEvent;
use ferry_primitives::Address;

/// State visible to a module while it executes one call.
#[derive(Debug)]
pub struct TxContext {
    caller: Address,
    events: Vec<BridgeEvent>,
}

impl TxContext {
    pub(crate) fn new(caller: Address) -> Self {
        Self {
            caller,
            events: Vec::new(),
        }
    }

    /// Address of the first signer.
    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn emit_event(&mut self, event: BridgeEvent) {
        self.events.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<BridgeEvent> {
        std::mem::take(&mut self.events)
    }
}

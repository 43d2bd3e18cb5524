use std::collections::HashMap;

use ferry_primitives::Address;
use ferry_tx_types::CoreError;

/// Per-account nonces.
#[derive(Debug, Default)]
pub struct Accounts {
    nonces: HashMap<Address, u64>,
}

impl Accounts {
    /// Nonce the next transaction from `addr` must carry.
    pub fn nonce(&self, addr: &Address) -> u64 {
        self.nonces.get(addr).copied().unwrap_or(0)
    }

    pub fn check_nonce(&self, addr: &Address, nonce: u64) -> Result<(), CoreError> {
        let expected = self.nonce(addr);
        if nonce != expected {
            return Err(CoreError::InvalidNonce {
                expected,
                actual: nonce,
            });
        }
        Ok(())
    }

    pub fn increment_nonce(&mut self, addr: &Address) {
        *self.nonces.entry(*addr).or_default() += 1;
    }
}

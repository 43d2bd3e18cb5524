use std::{collections::BTreeSet, io};

use borsh::{BorshDeserialize, BorshSerialize};
use ferry_primitives::{Address, PublicKey};
use serde::{Deserialize, Serialize};

use crate::ParamsError;

/// Authorized witnesses and how many distinct ones must attest a lock.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct BridgeParameters {
    witnesses: Vec<PublicKey>,
    quorum: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParameters {
    witnesses: Vec<PublicKey>,
    quorum: usize,
}

impl TryFrom<RawParameters> for BridgeParameters {
    type Error = ParamsError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        Self::try_new(raw.witnesses, raw.quorum)
    }
}

impl BorshDeserialize for BridgeParameters {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let witnesses = Vec::<PublicKey>::deserialize_reader(reader)?;
        let quorum = usize::deserialize_reader(reader)?;
        Self::try_new(witnesses, quorum).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl BridgeParameters {
    /// Validates and builds the parameters.
    ///
    /// # Errors
    ///
    /// - `NoWitnesses` if `witnesses` is empty.
    /// - `DuplicateWitness` if two keys derive the same address.
    /// - `InvalidQuorum` unless `1 <= quorum <= witnesses.len()`.
    pub fn try_new(witnesses: Vec<PublicKey>, quorum: usize) -> Result<Self, ParamsError> {
        if witnesses.is_empty() {
            return Err(ParamsError::NoWitnesses);
        }

        let mut seen = BTreeSet::new();
        for pk in &witnesses {
            if !seen.insert(Address::from_pk(pk)) {
                return Err(ParamsError::DuplicateWitness(pk.to_string()));
            }
        }

        if quorum == 0 || quorum > witnesses.len() {
            return Err(ParamsError::InvalidQuorum {
                quorum,
                witnesses: witnesses.len(),
            });
        }

        Ok(Self { witnesses, quorum })
    }

    pub fn witnesses(&self) -> &[PublicKey] {
        &self.witnesses
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Key of the authorized witness with this address, if any.
    pub fn witness_key(&self, addr: &Address) -> Option<&PublicKey> {
        self.witnesses
            .iter()
            .find(|pk| Address::from_pk(pk) == *addr)
    }

    pub fn is_witness(&self, addr: &Address) -> bool {
        self.witness_key(addr).is_some()
    }
}

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use ferry_bridge_types::LockId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::StoreError;

/// Durable record of what a witness has already done.
pub trait WitnessStore: Send {
    fn is_witnessed(&self, id: LockId) -> bool;

    /// Records a lock as attested, clearing any earlier rejection. Must be durable before
    /// returning.
    fn mark_witnessed(&mut self, id: LockId) -> Result<(), StoreError>;

    /// Records a lock whose witness call was refused, with the round it was locked in.
    fn mark_rejected(&mut self, id: LockId, round: u64) -> Result<(), StoreError>;

    /// Refused locks awaiting another attempt, mapped to their round.
    fn rejected(&self) -> BTreeMap<LockId, u64>;

    /// Last round whose every lock was handled. Zero if none.
    fn checkpoint(&self) -> u64;

    fn set_checkpoint(&mut self, round: u64) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoreData {
    checkpoint: u64,
    witnessed: BTreeSet<LockId>,
    #[serde(default)]
    rejected: BTreeMap<LockId, u64>,
}

impl StoreData {
    /// Returns whether anything changed.
    fn mark_witnessed(&mut self, id: LockId) -> bool {
        let cleared = self.rejected.remove(&id).is_some();
        self.witnessed.insert(id) || cleared
    }

    /// Returns whether anything changed.
    fn mark_rejected(&mut self, id: LockId, round: u64) -> bool {
        if self.witnessed.contains(&id) {
            return false;
        }
        self.rejected.insert(id, round) != Some(round)
    }
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryWitnessStore {
    data: StoreData,
}

impl MemoryWitnessStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WitnessStore for MemoryWitnessStore {
    fn is_witnessed(&self, id: LockId) -> bool {
        self.data.witnessed.contains(&id)
    }

    fn mark_witnessed(&mut self, id: LockId) -> Result<(), StoreError> {
        self.data.mark_witnessed(id);
        Ok(())
    }

    fn mark_rejected(&mut self, id: LockId, round: u64) -> Result<(), StoreError> {
        self.data.mark_rejected(id, round);
        Ok(())
    }

    fn rejected(&self) -> BTreeMap<LockId, u64> {
        self.data.rejected.clone()
    }

    fn checkpoint(&self) -> u64 {
        self.data.checkpoint
    }

    fn set_checkpoint(&mut self, round: u64) -> Result<(), StoreError> {
        self.data.checkpoint = round;
        Ok(())
    }
}

/// JSON file store. Every change rewrites the file through a temporary sibling and a rename,
/// so a crash leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileWitnessStore {
    path: PathBuf,
    data: StoreData,
}

impl FileWitnessStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => StoreData::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), checkpoint = data.checkpoint, "opened witness store");
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let raw = serde_json::to_vec_pretty(&self.data).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let mut file = File::create(&tmp).map_err(io_err)?;
        file.write_all(&raw).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl WitnessStore for FileWitnessStore {
    fn is_witnessed(&self, id: LockId) -> bool {
        self.data.witnessed.contains(&id)
    }

    fn mark_witnessed(&mut self, id: LockId) -> Result<(), StoreError> {
        if self.data.mark_witnessed(id) {
            self.persist()?;
        }
        Ok(())
    }

    fn mark_rejected(&mut self, id: LockId, round: u64) -> Result<(), StoreError> {
        if self.data.mark_rejected(id, round) {
            self.persist()?;
        }
        Ok(())
    }

    fn rejected(&self) -> BTreeMap<LockId, u64> {
        self.data.rejected.clone()
    }

    fn checkpoint(&self) -> u64 {
        self.data.checkpoint
    }

    fn set_checkpoint(&mut self, round: u64) -> Result<(), StoreError> {
        if self.data.checkpoint != round {
            self.data.checkpoint = round;
            self.persist()?;
        }
        Ok(())
    }
}

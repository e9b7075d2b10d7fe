use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use crate::{errors::LedgerError, ledger::Ledger};

use super::{LedgerPersistence, Result};

/// Keeps the serialized snapshot in memory. Used by tests and by callers that
/// do not want anything written to disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: &Ledger) -> Result<Self> {
        let storage = Self::new();
        *storage.lock()? = Some(serde_json::to_string(ledger)?);
        Ok(storage)
    }

    /// Number of snapshots written since creation.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.snapshot
            .lock()
            .map_err(|_| LedgerError::Persistence("in-memory snapshot lock poisoned".into()))
    }
}

impl LedgerPersistence for MemoryStorage {
    fn load(&self) -> Result<Ledger> {
        match self.lock()?.as_deref() {
            Some(data) => Ok(serde_json::from_str(data)?),
            None => Ok(Ledger::new()),
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let data = serde_json::to_string(ledger)?;
        *self.lock()? = Some(data);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub mod backup;
pub mod json_backend;
pub mod memory;

use crate::{errors::LedgerError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Whole-snapshot persistence for the ledger. Every mutation is followed by a
/// full `save`; there are no partial writes.
pub trait LedgerPersistence: Send + Sync {
    /// Returns an empty ledger when nothing has been stored yet.
    fn load(&self) -> Result<Ledger>;
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

pub use backup::{
    backup_reminder, default_backup_file_name, export_backup, import_backup, BackupReminder,
    BackupState, BACKUP_APP, BACKUP_VERSION,
};
pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;

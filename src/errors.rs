use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Reasons a backup payload can be refused. The ledger is never touched when
/// one of these is returned.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup could not be parsed as JSON: {0}")]
    Unparsable(#[source] serde_json::Error),
    #[error("backup does not look valid for this app: {0}")]
    InvalidShape(String),
    #[error(transparent)]
    Storage(#[from] LedgerError),
}

impl BackupError {
    pub fn is_invalid_shape(&self) -> bool {
        matches!(self, BackupError::InvalidShape(_))
    }

    pub fn is_unparsable(&self) -> bool {
        matches!(self, BackupError::Unparsable(_))
    }
}

/// Failures surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Backup(#[from] BackupError),
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Input(String),
}

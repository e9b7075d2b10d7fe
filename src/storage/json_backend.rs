use chrono::{DateTime, Utc};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    ledger::{Ledger, MonthKey},
    utils::paths::{self, ensure_dir},
};

use super::{
    backup::{default_backup_file_name, export_backup, BackupState},
    LedgerPersistence, Result,
};

const BACKUP_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed JSON persistence for the ledger, its exported backups and
/// the reminder state.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    ledger_file: PathBuf,
    backups_dir: PathBuf,
    state_file: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(paths::app_data_dir);
        ensure_dir(&root)?;
        let backups_dir = paths::backups_dir_in(&root);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            ledger_file: paths::ledger_file_in(&root),
            state_file: paths::state_file_in(&root),
            backups_dir,
            root,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_file
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Writes an exported backup for `year` into the backups directory and
    /// records the time for the reminder.
    pub fn write_backup(&self, ledger: &Ledger, year: i32, now: DateTime<Utc>) -> Result<PathBuf> {
        let path = self.backups_dir.join(default_backup_file_name(year));
        self.write_backup_to(ledger, &path, now)?;
        Ok(path)
    }

    pub fn write_backup_to(&self, ledger: &Ledger, path: &Path, now: DateTime<Utc>) -> Result<()> {
        let json = export_backup(ledger, now)?;
        let tmp = tmp_path(path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, path)?;
        self.record_backup(now)?;
        tracing::info!(path = %path.display(), "backup written");
        Ok(())
    }

    /// Backup files in the managed directory, newest name first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            entries.push(path);
        }
        entries.sort_by(|a, b| b.cmp(a));
        Ok(entries)
    }

    pub fn read_state(&self) -> Result<BackupState> {
        if self.state_file.exists() {
            let data = fs::read_to_string(&self.state_file)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(BackupState::default())
        }
    }

    pub fn record_backup(&self, at: DateTime<Utc>) -> Result<()> {
        let mut state = self.read_state()?;
        state.last_backup_at = Some(at);
        self.write_state(&state)
    }

    pub fn dismiss_reminder(&self, month: MonthKey) -> Result<()> {
        let mut state = self.read_state()?;
        state.backup_dismissed_for = Some(month);
        self.write_state(&state)
    }

    fn write_state(&self, state: &BackupState) -> Result<()> {
        let data = serde_json::to_string_pretty(state)?;
        let tmp = tmp_path(&self.state_file);
        write_atomic(&tmp, &data)?;
        fs::rename(&tmp, &self.state_file)?;
        Ok(())
    }
}

impl LedgerPersistence for JsonStorage {
    fn load(&self) -> Result<Ledger> {
        load_ledger_from_path(&self.ledger_file)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        save_ledger_to_path(ledger, &self.ledger_file)
    }
}

/// Saves a ledger to an arbitrary path on disk, staging through a temp file.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), records = ledger.record_count(), "ledger saved");
    Ok(())
}

/// Loads a ledger from disk; a missing file is an empty ledger.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        return Ok(Ledger::new());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

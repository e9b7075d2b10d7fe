//! Backup payload codec and the monthly backup reminder.

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::{BackupError, LedgerError},
    ledger::{Ledger, MonthKey},
};

pub const BACKUP_APP: &str = "BudgetTracker";
pub const BACKUP_VERSION: u32 = 3;
const LEDGER_FIELD: &str = "budgetDataV2";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupPayload<'a> {
    app: &'a str,
    version: u32,
    exported_at: DateTime<Utc>,
    #[serde(rename = "budgetDataV2")]
    budget_data: &'a Ledger,
}

/// Serializes the ledger inside the versioned backup envelope.
pub fn export_backup(ledger: &Ledger, exported_at: DateTime<Utc>) -> Result<String, LedgerError> {
    let payload = BackupPayload {
        app: BACKUP_APP,
        version: BACKUP_VERSION,
        exported_at,
        budget_data: ledger,
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Parses a backup payload. Syntax errors and shape mismatches are reported
/// as different [`BackupError`] variants.
pub fn import_backup(text: &str) -> Result<Ledger, BackupError> {
    let value: Value = serde_json::from_str(text).map_err(BackupError::Unparsable)?;
    let payload = value
        .as_object()
        .ok_or_else(|| BackupError::InvalidShape("payload is not a JSON object".into()))?;

    match payload.get("app").and_then(Value::as_str) {
        Some(BACKUP_APP) => {}
        other => {
            return Err(BackupError::InvalidShape(format!(
                "expected app `{}`, found {}",
                BACKUP_APP,
                other.map_or_else(|| "nothing".to_string(), |app| format!("`{}`", app))
            )))
        }
    }

    if let Some(version) = payload.get("version").and_then(Value::as_u64) {
        if version > BACKUP_VERSION as u64 {
            tracing::warn!(version, supported = BACKUP_VERSION, "backup is from a newer version");
        }
    }

    let data = payload
        .get(LEDGER_FIELD)
        .filter(|data| data.is_object())
        .ok_or_else(|| {
            BackupError::InvalidShape(format!("`{}` is missing or not an object", LEDGER_FIELD))
        })?;
    serde_json::from_value(data.clone()).map_err(|err| BackupError::InvalidShape(err.to_string()))
}

pub fn default_backup_file_name(year: i32) -> String {
    format!("budget_backup_{}.json", year)
}

/// Bookkeeping for the "save a monthly backup" reminder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupState {
    #[serde(default)]
    pub last_backup_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub backup_dismissed_for: Option<MonthKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupReminder {
    NeverBackedUp,
    Stale,
}

impl BackupReminder {
    pub fn message(&self) -> &'static str {
        match self {
            BackupReminder::NeverBackedUp => {
                "Quick reminder: you haven't saved a backup yet this month."
            }
            BackupReminder::Stale => "Friendly reminder: save a monthly backup for your archive.",
        }
    }
}

/// Whether to nag about backups while `viewed` is on screen. The last backup
/// counts for the month it fell in on the local clock.
pub fn backup_reminder(state: &BackupState, viewed: MonthKey) -> Option<BackupReminder> {
    if state.backup_dismissed_for == Some(viewed) {
        return None;
    }
    let Some(at) = state.last_backup_at else {
        return Some(BackupReminder::NeverBackedUp);
    };
    let local = at.with_timezone(&Local);
    if local.year() == viewed.year() && local.month0() == viewed.month() {
        None
    } else {
        Some(BackupReminder::Stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Expense;
    use chrono::TimeZone;

    fn month(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.append(month(2024, 1), Expense::new("Rent", None, 700.0));
        ledger
    }

    #[test]
    fn export_wraps_ledger_in_envelope() {
        let at = Utc.with_ymd_and_hms(2024, 2, 10, 8, 30, 0).unwrap();
        let text = export_backup(&sample_ledger(), at).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["app"], "BudgetTracker");
        assert_eq!(value["version"], 3);
        assert!(value["exportedAt"].as_str().unwrap().starts_with("2024-02-10T08:30:00"));
        assert_eq!(value["budgetDataV2"]["2024-1"][0]["amount"], 700.0);
    }

    #[test]
    fn import_accepts_exported_payload() {
        let text = export_backup(&sample_ledger(), Utc::now()).unwrap();
        let ledger = import_backup(&text).unwrap();
        assert_eq!(ledger.record_count(), 1);
        assert_eq!(ledger.get(month(2024, 1))[0].main, "Rent");
    }

    #[test]
    fn import_distinguishes_syntax_from_shape_errors() {
        let err = import_backup("{ not json").unwrap_err();
        assert!(err.is_unparsable(), "unexpected error: {err:?}");

        let err = import_backup(r#"{"app":"Other","version":3,"budgetDataV2":{}}"#).unwrap_err();
        assert!(err.is_invalid_shape(), "unexpected error: {err:?}");

        let err = import_backup(r#"{"app":"BudgetTracker","budgetDataV2":5}"#).unwrap_err();
        assert!(err.is_invalid_shape(), "unexpected error: {err:?}");

        let err = import_backup(r#"{"app":"BudgetTracker"}"#).unwrap_err();
        assert!(err.is_invalid_shape(), "unexpected error: {err:?}");

        let err = import_backup("[1,2]").unwrap_err();
        assert!(err.is_invalid_shape(), "unexpected error: {err:?}");
    }

    #[test]
    fn reminder_follows_last_backup_and_dismissal() {
        let viewed = month(2024, 5);
        let mut state = BackupState::default();
        assert_eq!(backup_reminder(&state, viewed), Some(BackupReminder::NeverBackedUp));

        state.last_backup_at = Some(Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap());
        assert_eq!(backup_reminder(&state, viewed), Some(BackupReminder::Stale));

        state.last_backup_at = Some(Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap());
        assert_eq!(backup_reminder(&state, viewed), None);

        state.last_backup_at = None;
        state.backup_dismissed_for = Some(viewed);
        assert_eq!(backup_reminder(&state, viewed), None);
        assert!(backup_reminder(&state, month(2024, 6)).is_some());
    }

    #[test]
    fn reminder_month_follows_local_clock() {
        let at = Utc.with_ymd_and_hms(2024, 3, 31, 23, 30, 0).unwrap();
        let local = at.with_timezone(&Local);
        let local_month = month(local.year(), local.month0());
        let other_month = if local_month == month(2024, 2) {
            month(2024, 3)
        } else {
            month(2024, 2)
        };
        let state = BackupState {
            last_backup_at: Some(at),
            backup_dismissed_for: None,
        };
        assert_eq!(backup_reminder(&state, local_month), None);
        assert_eq!(backup_reminder(&state, other_month), Some(BackupReminder::Stale));
    }

    #[test]
    fn default_file_name_uses_year() {
        assert_eq!(default_backup_file_name(2025), "budget_backup_2025.json");
    }
}

//! Recurrence windows and the virtual entries they project into a month.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    expense::Expense,
    month::{absolute_month, MonthKey},
};

/// Monthly repetition of an expense, starting at its creation month.
///
/// The end is only honoured when both `end_year` and `end_month` are present;
/// otherwise the series is open-ended. An end earlier than the start is kept
/// as-is and simply never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub start_year: i32,
    pub start_month: u32,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub end_month: Option<u32>,
}

impl Recurrence {
    pub fn starting_at(start: MonthKey) -> Self {
        Self {
            start_year: start.year(),
            start_month: start.month(),
            end_year: None,
            end_month: None,
        }
    }

    pub fn start_abs(&self) -> i64 {
        absolute_month(self.start_year, self.start_month)
    }

    /// Last active absolute month, `None` while the series is ongoing.
    pub fn end_abs(&self) -> Option<i64> {
        match (self.end_year, self.end_month) {
            (Some(year), Some(month)) => Some(absolute_month(year, month)),
            _ => None,
        }
    }

    pub fn is_open_ended(&self) -> bool {
        self.end_abs().is_none()
    }

    pub fn is_active_in(&self, target: MonthKey) -> bool {
        let target = target.absolute();
        target >= self.start_abs() && self.end_abs().map_or(true, |end| target <= end)
    }

    pub fn is_start_month(&self, target: MonthKey) -> bool {
        target.absolute() == self.start_abs()
    }

    /// Caps the series so `last` is the final month it appears in.
    pub fn stop_at(&mut self, last: MonthKey) {
        self.end_year = Some(last.year());
        self.end_month = Some(last.month());
    }
}

/// A ledger record as it appears in one specific month.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualEntry {
    pub expense: Expense,
    pub source_key: MonthKey,
    pub source_index: usize,
    /// `false` only for the occurrence in the record's own start month.
    pub is_generated: bool,
}

impl VirtualEntry {
    pub fn id(&self) -> Uuid {
        self.expense.id
    }

    pub fn amount(&self) -> f64 {
        self.expense.amount
    }
}

//! Expense records and the draft form used to create or re-enter them.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{category::CategoryTaxonomy, month::MonthKey, recurring::Recurrence};

/// A single recorded expense, stored under the month it was created in.
///
/// `id` lives only in memory: it is regenerated whenever a ledger is loaded so
/// the persisted shape stays `{main, sub, amount, note, recurring?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub main: String,
    #[serde(default)]
    pub sub: Option<String>,
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Recurrence>,
}

impl Expense {
    pub fn new(main: impl Into<String>, sub: Option<String>, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            main: main.into(),
            sub,
            amount,
            note: String::new(),
            recurring: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurring = Some(recurrence);
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring.is_some()
    }

    pub fn label(&self) -> String {
        CategoryTaxonomy::label(&self.main, self.sub.as_deref())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// User input for a new expense, before it is validated and placed in a month.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub main: String,
    pub sub: Option<String>,
    pub amount: f64,
    pub note: String,
    pub recurring: bool,
}

impl ExpenseDraft {
    pub fn new(main: impl Into<String>, amount: f64) -> Self {
        Self {
            main: main.into(),
            sub: None,
            amount,
            note: String::new(),
            recurring: false,
        }
    }

    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Pre-fills a draft from an existing record, as when re-entering it for edit.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            main: expense.main.clone(),
            sub: expense.sub.clone(),
            amount: expense.amount,
            note: expense.note.clone(),
            recurring: expense.is_recurring(),
        }
    }

    /// Materializes the draft as a record created in `at`. A recurring draft
    /// always starts a fresh series at `at`.
    pub fn into_expense(self, at: MonthKey) -> Expense {
        let expense = Expense::new(self.main, self.sub, self.amount).with_note(self.note);
        if self.recurring {
            expense.with_recurrence(Recurrence::starting_at(at))
        } else {
            expense
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn persisted_shape_omits_id_and_keeps_null_sub() {
        let expense = Expense::new("Rent", None, 700.0).with_note("March");
        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(
            value,
            json!({ "main": "Rent", "sub": null, "amount": 700.0, "note": "March" })
        );
    }

    #[test]
    fn loading_assigns_fresh_ids_and_tolerates_null_note() {
        let raw = json!({ "main": "Food", "sub": "Snack", "amount": 3.5, "note": null });
        let first: Expense = serde_json::from_value(raw.clone()).unwrap();
        let second: Expense = serde_json::from_value(raw).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.note, "");
        assert_eq!(first.sub.as_deref(), Some("Snack"));
        assert!(!first.is_recurring());
    }

    #[test]
    fn recurring_draft_restarts_series_at_given_month() {
        let original = Expense::new("Subscriptions", Some("Netflix".into()), 12.99)
            .with_recurrence(Recurrence::starting_at(MonthKey::new(2023, 4).unwrap()));
        let draft = ExpenseDraft::from_expense(&original);
        assert!(draft.recurring);

        let at = MonthKey::new(2024, 8).unwrap();
        let replacement = draft.into_expense(at);
        let rule = replacement.recurring.expect("recurrence kept");
        assert_eq!((rule.start_year, rule.start_month), (2024, 8));
        assert!(rule.is_open_ended());
        assert_ne!(replacement.id, original.id);
    }
}

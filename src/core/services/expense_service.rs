//! Business logic helpers for creating and changing expenses.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::{CategoryTaxonomy, Expense, ExpenseDraft, Ledger, MonthKey};

/// Provides validated mutation helpers for ledger expenses.
pub struct ExpenseService;

impl ExpenseService {
    /// Checks category membership and that the amount is finite and positive.
    pub fn validate(taxonomy: &CategoryTaxonomy, draft: &ExpenseDraft) -> ServiceResult<()> {
        taxonomy
            .validate(&draft.main, draft.sub.as_deref())
            .map_err(ServiceError::Invalid)?;
        if !draft.amount.is_finite() || draft.amount <= 0.0 {
            return Err(ServiceError::Invalid(format!(
                "amount must be a positive number, got {}",
                draft.amount
            )));
        }
        Ok(())
    }

    /// Appends the draft to `at`'s bucket and returns the new record's id.
    /// Nothing is written when validation fails.
    pub fn add(
        ledger: &mut Ledger,
        taxonomy: &CategoryTaxonomy,
        at: MonthKey,
        draft: ExpenseDraft,
    ) -> ServiceResult<Uuid> {
        Self::validate(taxonomy, &draft)?;
        let id = ledger.append(at, draft.into_expense(at));
        tracing::info!(%id, month = %at, "expense added");
        Ok(id)
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Option<Expense> {
        let removed = ledger.remove(id);
        if removed.is_some() {
            tracing::info!(%id, "expense removed");
        }
        removed
    }

    /// Ends a recurring series at `last`. Returns `false` for unknown or
    /// one-off records.
    pub fn stop_recurring(ledger: &mut Ledger, id: Uuid, last: MonthKey) -> bool {
        let Some(rule) = ledger
            .expense_mut(id)
            .and_then(|expense| expense.recurring.as_mut())
        else {
            return false;
        };
        rule.stop_at(last);
        tracing::info!(%id, end = %last, "recurrence stopped");
        true
    }

    /// Swaps a record for a freshly created one at `at`. The draft is checked
    /// before anything is removed; `Ok(None)` means the record no longer exists.
    pub fn replace(
        ledger: &mut Ledger,
        taxonomy: &CategoryTaxonomy,
        id: Uuid,
        at: MonthKey,
        draft: ExpenseDraft,
    ) -> ServiceResult<Option<Uuid>> {
        Self::validate(taxonomy, &draft)?;
        if ledger.remove(id).is_none() {
            return Ok(None);
        }
        let replacement = ledger.append(at, draft.into_expense(at));
        tracing::info!(%id, %replacement, month = %at, "expense replaced");
        Ok(Some(replacement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Recurrence;

    fn month(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    #[test]
    fn add_rejects_invalid_drafts_without_touching_ledger() {
        let taxonomy = CategoryTaxonomy::default();
        let mut ledger = Ledger::new();
        let at = month(2024, 0);

        let rejected = [
            ExpenseDraft::new("Food", 0.0),
            ExpenseDraft::new("Food", -3.0),
            ExpenseDraft::new("Food", f64::NAN),
            ExpenseDraft::new("Food", f64::INFINITY),
            ExpenseDraft::new("Groceries", 10.0),
            ExpenseDraft::new("Food", 10.0).with_sub("Fuel"),
            ExpenseDraft::new("Rent", 10.0).with_sub("Deposit"),
        ];
        for draft in rejected {
            let err = ExpenseService::add(&mut ledger, &taxonomy, at, draft.clone())
                .expect_err("draft should be rejected");
            assert!(
                matches!(err, ServiceError::Invalid(_)),
                "unexpected error for {draft:?}: {err:?}"
            );
        }
        assert!(ledger.is_empty());
    }

    #[test]
    fn add_attaches_open_recurrence_at_creation_month() {
        let taxonomy = CategoryTaxonomy::default();
        let mut ledger = Ledger::new();
        let at = month(2024, 3);
        let draft = ExpenseDraft::new("Insurance", 45.0)
            .with_sub("Car")
            .recurring(true);

        let id = ExpenseService::add(&mut ledger, &taxonomy, at, draft).unwrap();
        let stored = ledger.expense(id).unwrap();
        assert_eq!(stored.recurring, Some(Recurrence::starting_at(at)));
        assert_eq!(ledger.locate(id), Some((at, 0)));
    }

    #[test]
    fn stop_recurring_ignores_one_off_records() {
        let taxonomy = CategoryTaxonomy::default();
        let mut ledger = Ledger::new();
        let at = month(2024, 3);
        let id =
            ExpenseService::add(&mut ledger, &taxonomy, at, ExpenseDraft::new("Health", 5.0))
                .unwrap();

        assert!(!ExpenseService::stop_recurring(&mut ledger, id, at));
        assert!(!ExpenseService::stop_recurring(&mut ledger, Uuid::new_v4(), at));
        assert!(ledger.expense(id).unwrap().recurring.is_none());
    }

    #[test]
    fn replace_keeps_original_when_draft_is_invalid() {
        let taxonomy = CategoryTaxonomy::default();
        let mut ledger = Ledger::new();
        let at = month(2024, 3);
        let id = ExpenseService::add(&mut ledger, &taxonomy, at, ExpenseDraft::new("Travel", 80.0))
            .unwrap();

        let result =
            ExpenseService::replace(&mut ledger, &taxonomy, id, at, ExpenseDraft::new("Travel", 0.0));
        assert!(result.is_err());
        assert!(ledger.expense(id).is_some());
    }

    #[test]
    fn replace_moves_record_to_target_month() {
        let taxonomy = CategoryTaxonomy::default();
        let mut ledger = Ledger::new();
        let original_month = month(2023, 1);
        let id = ExpenseService::add(
            &mut ledger,
            &taxonomy,
            original_month,
            ExpenseDraft::new("Rent", 650.0).recurring(true),
        )
        .unwrap();

        let at = month(2024, 5);
        let new_id = ExpenseService::replace(
            &mut ledger,
            &taxonomy,
            id,
            at,
            ExpenseDraft::new("Rent", 700.0).recurring(true),
        )
        .unwrap()
        .expect("record existed");

        assert!(ledger.expense(id).is_none());
        let stored = ledger.expense(new_id).unwrap();
        assert_eq!(stored.amount, 700.0);
        assert_eq!(stored.recurring, Some(Recurrence::starting_at(at)));
        assert!(ledger.get(original_month).is_empty());

        let missing = ExpenseService::replace(
            &mut ledger,
            &taxonomy,
            id,
            at,
            ExpenseDraft::new("Rent", 1.0),
        )
        .unwrap();
        assert!(missing.is_none());
    }
}

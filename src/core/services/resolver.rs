//! Projects raw ledger records into the entries present in a given month.

use crate::ledger::{Expense, Ledger, MonthKey, VirtualEntry};

/// Stateless month projection over a [`Ledger`].
pub struct RecurrenceResolver;

impl RecurrenceResolver {
    /// Entries active in `target`: one-off records created that month plus
    /// every recurring record whose window contains it.
    ///
    /// Output follows creation-key order, then insertion order.
    pub fn resolve(ledger: &Ledger, target: MonthKey) -> Vec<VirtualEntry> {
        let entries: Vec<VirtualEntry> = ledger
            .iter()
            .filter_map(|(source_key, source_index, expense)| {
                Self::occurrence(source_key, expense, target).map(|is_generated| VirtualEntry {
                    expense: expense.clone(),
                    source_key,
                    source_index,
                    is_generated,
                })
            })
            .collect();
        tracing::debug!(month = %target, entries = entries.len(), "resolved month");
        entries
    }

    /// One resolution per month of `year`, January first.
    pub fn resolve_year(ledger: &Ledger, year: i32) -> Vec<Vec<VirtualEntry>> {
        MonthKey::months_of(year)
            .map(|month| Self::resolve(ledger, month))
            .collect()
    }

    /// `Some(is_generated)` when the record shows up in `target`.
    fn occurrence(source_key: MonthKey, expense: &Expense, target: MonthKey) -> Option<bool> {
        match &expense.recurring {
            None => (source_key == target).then_some(false),
            Some(rule) => rule
                .is_active_in(target)
                .then(|| !rule.is_start_month(target)),
        }
    }
}

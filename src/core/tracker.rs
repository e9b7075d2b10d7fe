//! Browsing session over a ledger: selected month, list filters, the last
//! rendered list, and the persistence collaborator every mutation goes through.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    core::services::{
        AnnualReport, EntryFilter, ExpenseService, FilterService, GroupDimension, Grouping,
        MonthlySeries, Percentages, RecurrenceResolver, SeriesSelector, SummaryService,
    },
    errors::{BackupError, LedgerError},
    ledger::{CategoryTaxonomy, Expense, ExpenseDraft, Ledger, MonthKey, VirtualEntry},
    storage::{self, LedgerPersistence},
};

/// Everything a list and chart renderer needs for the selected month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthView {
    pub month: MonthKey,
    /// Filtered entries, in the order positions refer to.
    pub entries: Vec<VirtualEntry>,
    pub total: f64,
    /// Built from the unfiltered month.
    pub grouping: Grouping,
    pub percentages: Percentages,
}

/// Facade that coordinates ledger state, list addressing and persistence.
///
/// Mutations address records by their position in the last rendered list.
/// Positions are translated to record ids immediately, so a position that no
/// longer refers to a live record is a no-op rather than a wrong target.
pub struct BudgetTracker {
    ledger: Ledger,
    taxonomy: CategoryTaxonomy,
    storage: Box<dyn LedgerPersistence>,
    selected: MonthKey,
    filter: EntryFilter,
    visible: Vec<VirtualEntry>,
}

impl BudgetTracker {
    pub fn open(
        storage: Box<dyn LedgerPersistence>,
        taxonomy: CategoryTaxonomy,
        selected: MonthKey,
    ) -> Result<Self, LedgerError> {
        let ledger = storage.load()?;
        tracing::info!(records = ledger.record_count(), "ledger loaded");
        let mut tracker = Self {
            ledger,
            taxonomy,
            storage,
            selected,
            filter: EntryFilter::default(),
            visible: Vec::new(),
        };
        tracker.refresh();
        Ok(tracker)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    pub fn selected(&self) -> MonthKey {
        self.selected
    }

    pub fn filter(&self) -> &EntryFilter {
        &self.filter
    }

    pub fn select(&mut self, month: MonthKey) -> &[VirtualEntry] {
        self.selected = month;
        self.refresh()
    }

    pub fn set_filter(&mut self, filter: EntryFilter) -> &[VirtualEntry] {
        self.filter = filter;
        self.refresh()
    }

    /// The list positions currently refer to.
    pub fn visible(&self) -> &[VirtualEntry] {
        &self.visible
    }

    pub fn visible_total(&self) -> f64 {
        FilterService::visible_total(&self.visible)
    }

    pub fn render(&mut self, dimension: GroupDimension) -> MonthView {
        let all = RecurrenceResolver::resolve(&self.ledger, self.selected);
        self.visible = FilterService::apply(&all, &self.filter);
        let grouping = SummaryService::group_by(&all, dimension);
        MonthView {
            month: self.selected,
            entries: self.visible.clone(),
            total: self.visible_total(),
            percentages: SummaryService::percentages_of(&grouping),
            grouping,
        }
    }

    /// Adds to the selected month. Invalid input is logged and leaves
    /// everything unchanged, reported as `Ok(None)`.
    pub fn add(&mut self, draft: ExpenseDraft) -> Result<Option<Uuid>, LedgerError> {
        let mut next = self.ledger.clone();
        match ExpenseService::add(&mut next, &self.taxonomy, self.selected, draft) {
            Ok(id) => {
                self.commit(next)?;
                Ok(Some(id))
            }
            Err(err) => {
                tracing::warn!(error = %err, "expense rejected");
                Ok(None)
            }
        }
    }

    pub fn delete_at(&mut self, index: usize) -> Result<Option<Expense>, LedgerError> {
        let Some(id) = self.id_at(index) else {
            return Ok(None);
        };
        let mut next = self.ledger.clone();
        let removed = ExpenseService::remove(&mut next, id);
        if removed.is_some() {
            self.commit(next)?;
        }
        Ok(removed)
    }

    /// Ends the series at the selected month, whichever occurrence `index`
    /// points at.
    pub fn stop_recurring_at(&mut self, index: usize) -> Result<bool, LedgerError> {
        let Some(id) = self.id_at(index) else {
            return Ok(false);
        };
        let mut next = self.ledger.clone();
        let stopped = ExpenseService::stop_recurring(&mut next, id, self.selected);
        if stopped {
            self.commit(next)?;
        }
        Ok(stopped)
    }

    /// Removes the record and hands back its values for re-entry. Re-adding
    /// the draft files it under the selected month, restarting any series.
    pub fn edit_at(&mut self, index: usize) -> Result<Option<ExpenseDraft>, LedgerError> {
        Ok(self
            .delete_at(index)?
            .map(|expense| ExpenseDraft::from_expense(&expense)))
    }

    /// One-step edit: the record is replaced by `draft` created in the selected
    /// month. An invalid draft leaves the original in place.
    pub fn replace_at(
        &mut self,
        index: usize,
        draft: ExpenseDraft,
    ) -> Result<Option<Uuid>, LedgerError> {
        let Some(id) = self.id_at(index) else {
            return Ok(None);
        };
        let mut next = self.ledger.clone();
        match ExpenseService::replace(&mut next, &self.taxonomy, id, self.selected, draft) {
            Ok(Some(replacement)) => {
                self.commit(next)?;
                Ok(Some(replacement))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                tracing::warn!(error = %err, "replacement rejected");
                Ok(None)
            }
        }
    }

    /// Series over the selected year.
    pub fn monthly_series(&self, selector: &SeriesSelector) -> MonthlySeries {
        SummaryService::monthly_series(
            &self.ledger,
            &self.taxonomy,
            self.selected.year(),
            selector,
        )
    }

    pub fn annual_report(&self, year: i32) -> AnnualReport {
        SummaryService::annual_report(&self.ledger, &self.taxonomy, year)
    }

    pub fn export_backup(&self, now: DateTime<Utc>) -> Result<String, LedgerError> {
        storage::export_backup(&self.ledger, now)
    }

    /// Replaces the whole ledger with the backup's contents. A rejected
    /// payload, or a failed save, leaves the current ledger in place.
    pub fn import_backup(&mut self, text: &str) -> Result<(), BackupError> {
        let imported = storage::import_backup(text)?;
        self.commit(imported)?;
        tracing::info!(records = self.ledger.record_count(), "backup imported");
        Ok(())
    }

    fn id_at(&self, index: usize) -> Option<Uuid> {
        let id = self.visible.get(index).map(VirtualEntry::id);
        if id.is_none() {
            tracing::debug!(index, visible = self.visible.len(), "no entry at position");
        }
        id
    }

    /// Persists `next` and only then makes it the current ledger, so a failed
    /// save leaves both the ledger and the rendered list as they were.
    fn commit(&mut self, next: Ledger) -> Result<(), LedgerError> {
        self.storage.save(&next)?;
        self.ledger = next;
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) -> &[VirtualEntry] {
        let all = RecurrenceResolver::resolve(&self.ledger, self.selected);
        self.visible = FilterService::apply(&all, &self.filter);
        &self.visible
    }
}

//! Ledger domain models, persistence-friendly types, and helpers.

pub mod category;
pub mod expense;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod month;
pub mod recurring;

pub use category::{CategoryTaxonomy, MainCategory};
pub use expense::{Expense, ExpenseDraft};
pub use ledger::Ledger;
pub use month::{MonthKey, MONTHS_PER_YEAR, MONTH_NAMES};
pub use recurring::{Recurrence, VirtualEntry};

pub mod expense_service;
pub mod filter_service;
pub mod resolver;
pub mod summary_service;

pub use expense_service::ExpenseService;
pub use filter_service::{CategoryFilter, EntryFilter, FilterService, ALL_LABEL};
pub use resolver::RecurrenceResolver;
pub use summary_service::{
    AnnualReport, CategorySeries, GroupDimension, GroupTotal, Grouping, MonthlySeries,
    Percentages, SeriesSelector, SummaryService, NO_DATA_LABEL, TOTAL_LABEL,
};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Invalid(String),
}

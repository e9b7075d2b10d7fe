//! Category filters and note search over resolved month entries.

use std::{convert::Infallible, fmt, str::FromStr};

use crate::ledger::{CategoryTaxonomy, Expense, VirtualEntry};

pub const ALL_LABEL: &str = "All";

/// Either no restriction or an exact category name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn only(name: impl Into<String>) -> Self {
        CategoryFilter::Only(name.into())
    }

    /// A specific filter never matches a missing value.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == ALL_LABEL {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(value.to_string()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_LABEL),
            CategoryFilter::Only(name) => f.write_str(name),
        }
    }
}

/// Filters applied to the visible expense list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryFilter {
    pub main: CategoryFilter,
    pub sub: CategoryFilter,
    pub search: String,
}

impl EntryFilter {
    pub fn with_main(mut self, main: CategoryFilter) -> Self {
        self.main = main;
        self
    }

    pub fn with_sub(mut self, sub: CategoryFilter) -> Self {
        self.sub = sub;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if !self.main.matches(Some(expense.main.as_str())) {
            return false;
        }
        if !self.sub.matches(expense.sub.as_deref()) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty() || expense.note.to_lowercase().contains(&needle)
    }
}

pub struct FilterService;

impl FilterService {
    /// Keeps matching entries in their original order.
    pub fn apply(entries: &[VirtualEntry], filter: &EntryFilter) -> Vec<VirtualEntry> {
        entries
            .iter()
            .filter(|entry| filter.matches(&entry.expense))
            .cloned()
            .collect()
    }

    pub fn visible_total(entries: &[VirtualEntry]) -> f64 {
        entries.iter().map(VirtualEntry::amount).sum()
    }

    /// Choices for the sub filter given the current main filter: `All`, then
    /// either that main's subcategories or every known subcategory.
    pub fn sub_filter_options(taxonomy: &CategoryTaxonomy, main: &CategoryFilter) -> Vec<String> {
        let mut options = vec![ALL_LABEL.to_string()];
        match main {
            CategoryFilter::All => options.extend(
                taxonomy
                    .all_subcategories()
                    .into_iter()
                    .map(str::to_string),
            ),
            CategoryFilter::Only(name) => {
                options.extend(taxonomy.subcategories(name).iter().cloned())
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MonthKey;

    fn entry(main: &str, sub: Option<&str>, amount: f64, note: &str) -> VirtualEntry {
        VirtualEntry {
            expense: Expense::new(main, sub.map(str::to_string), amount).with_note(note),
            source_key: MonthKey::new(2024, 0).unwrap(),
            source_index: 0,
            is_generated: false,
        }
    }

    fn sample() -> Vec<VirtualEntry> {
        vec![
            entry("Food", Some("Supermarket"), 40.0, "Weekly groceries"),
            entry("Food", None, 5.0, ""),
            entry("Transport", Some("Fuel"), 60.0, "Road trip"),
            entry("Rent", None, 700.0, "March rent"),
        ]
    }

    #[test]
    fn default_filter_keeps_everything() {
        let all = FilterService::apply(&sample(), &EntryFilter::default());
        assert_eq!(all.len(), 4);
        assert_eq!(FilterService::visible_total(&all), 805.0);
    }

    #[test]
    fn main_filter_is_exact() {
        let filter = EntryFilter::default().with_main(CategoryFilter::only("Food"));
        let food = FilterService::apply(&sample(), &filter);
        assert_eq!(food.len(), 2);
        assert!(food.iter().all(|e| e.expense.main == "Food"));
    }

    #[test]
    fn sub_filter_skips_records_without_sub() {
        let filter = EntryFilter::default().with_sub(CategoryFilter::only("Supermarket"));
        let subs = FilterService::apply(&sample(), &filter);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].amount(), 40.0);
    }

    #[test]
    fn search_is_trimmed_and_case_insensitive() {
        let filter = EntryFilter::default().with_search("  RENT ");
        let hits = FilterService::apply(&sample(), &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].expense.main, "Rent");
    }

    #[test]
    fn empty_note_never_matches_a_search() {
        let filter = EntryFilter::default()
            .with_main(CategoryFilter::only("Food"))
            .with_search("e");
        let hits = FilterService::apply(&sample(), &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].expense.note, "Weekly groceries");
    }

    #[test]
    fn parses_all_literal() {
        assert_eq!("All".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Food".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::only("Food")
        );
    }

    #[test]
    fn sub_filter_options_follow_main_selection() {
        let taxonomy = CategoryTaxonomy::default();
        let food = FilterService::sub_filter_options(&taxonomy, &CategoryFilter::only("Food"));
        assert_eq!(food, vec!["All", "Restaurant", "Snack", "Supermarket"]);

        let rent = FilterService::sub_filter_options(&taxonomy, &CategoryFilter::only("Rent"));
        assert_eq!(rent, vec!["All"]);

        let all = FilterService::sub_filter_options(&taxonomy, &CategoryFilter::All);
        assert_eq!(all.first().map(String::as_str), Some("All"));
        assert!(all.contains(&"Uber".to_string()));
        assert!(all.windows(2).skip(1).all(|pair| pair[0] <= pair[1]));
    }
}

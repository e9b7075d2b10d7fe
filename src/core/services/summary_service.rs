//! Category groupings, percentage shares and per-month series for charts and
//! annual reports.

use std::{collections::BTreeMap, convert::Infallible, str::FromStr};

use crate::ledger::{CategoryTaxonomy, Ledger, VirtualEntry, MONTHS_PER_YEAR};

use super::RecurrenceResolver;

pub const NO_DATA_LABEL: &str = "No data";
pub const TOTAL_LABEL: &str = "Total";

const MONTHS: usize = MONTHS_PER_YEAR as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupDimension {
    #[default]
    Main,
    /// Subcategory, falling back to the main category when a record has none.
    Sub,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub label: String,
    pub amount: f64,
}

/// Summed amounts per label, in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grouping {
    totals: Vec<GroupTotal>,
    parents: BTreeMap<String, String>,
}

impl Grouping {
    pub fn add(&mut self, label: &str, amount: f64) {
        match self.totals.iter_mut().find(|total| total.label == label) {
            Some(total) => total.amount += amount,
            None => self.totals.push(GroupTotal {
                label: label.to_string(),
                amount,
            }),
        }
    }

    pub fn totals(&self) -> &[GroupTotal] {
        &self.totals
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.totals
            .iter()
            .find(|total| total.label == label)
            .map(|total| total.amount)
    }

    pub fn total(&self) -> f64 {
        self.totals.iter().map(|total| total.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Owning main category for a subcategory label, when grouped by sub.
    pub fn parent_of(&self, label: &str) -> Option<&str> {
        self.parents.get(label).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Percentages {
    /// Nothing to divide by; render a single placeholder slice.
    NoData,
    Shares(Vec<(String, f64)>),
}

impl Percentages {
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Percentages::NoData => vec![NO_DATA_LABEL],
            Percentages::Shares(shares) => shares.iter().map(|(label, _)| label.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesSelector {
    /// Every main category, stacked.
    Total,
    Category(String),
}

impl FromStr for SeriesSelector {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == TOTAL_LABEL {
            Ok(SeriesSelector::Total)
        } else {
            Ok(SeriesSelector::Category(value.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub label: String,
    pub values: [f64; MONTHS],
}

impl CategorySeries {
    fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: [0.0; MONTHS],
        }
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MonthlySeries {
    Single(CategorySeries),
    Stacked(Vec<CategorySeries>),
}

/// Category by month breakdown of one year.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualReport {
    pub year: i32,
    /// Taxonomy mains in order, then any other main found in the data.
    pub rows: Vec<CategorySeries>,
    pub monthly_totals: [f64; MONTHS],
    pub yearly_total: f64,
}

impl AnnualReport {
    pub fn category_total(&self, label: &str) -> f64 {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(CategorySeries::total)
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.yearly_total == 0.0
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn group_by(entries: &[VirtualEntry], dimension: GroupDimension) -> Grouping {
        let mut grouping = Grouping::default();
        for entry in entries {
            let expense = &entry.expense;
            match dimension {
                GroupDimension::Main => grouping.add(&expense.main, expense.amount),
                GroupDimension::Sub => match &expense.sub {
                    Some(sub) => {
                        grouping.add(sub, expense.amount);
                        grouping
                            .parents
                            .insert(sub.clone(), expense.main.clone());
                    }
                    None => grouping.add(&expense.main, expense.amount),
                },
            }
        }
        grouping
    }

    pub fn percentages_of(grouping: &Grouping) -> Percentages {
        let total = grouping.total();
        if total == 0.0 {
            return Percentages::NoData;
        }
        Percentages::Shares(
            grouping
                .totals()
                .iter()
                .map(|entry| (entry.label.clone(), entry.amount / total * 100.0))
                .collect(),
        )
    }

    pub fn monthly_series(
        ledger: &Ledger,
        taxonomy: &CategoryTaxonomy,
        year: i32,
        selector: &SeriesSelector,
    ) -> MonthlySeries {
        let months = RecurrenceResolver::resolve_year(ledger, year);
        match selector {
            SeriesSelector::Category(main) => {
                MonthlySeries::Single(Self::series_for(main, &months))
            }
            SeriesSelector::Total => MonthlySeries::Stacked(
                taxonomy
                    .mains()
                    .map(|main| Self::series_for(main, &months))
                    .collect(),
            ),
        }
    }

    pub fn annual_report(ledger: &Ledger, taxonomy: &CategoryTaxonomy, year: i32) -> AnnualReport {
        let mut rows: Vec<CategorySeries> = taxonomy.mains().map(CategorySeries::empty).collect();
        let mut monthly_totals = [0.0; MONTHS];
        let mut yearly_total = 0.0;

        for (month, entries) in RecurrenceResolver::resolve_year(ledger, year)
            .iter()
            .enumerate()
        {
            for entry in entries {
                let amount = entry.amount();
                yearly_total += amount;
                monthly_totals[month] += amount;
                let index = match rows.iter().position(|row| row.label == entry.expense.main) {
                    Some(index) => index,
                    None => {
                        rows.push(CategorySeries::empty(entry.expense.main.clone()));
                        rows.len() - 1
                    }
                };
                rows[index].values[month] += amount;
            }
        }

        AnnualReport {
            year,
            rows,
            monthly_totals,
            yearly_total,
        }
    }

    fn series_for(main: &str, months: &[Vec<VirtualEntry>]) -> CategorySeries {
        let mut series = CategorySeries::empty(main);
        for (slot, entries) in series.values.iter_mut().zip(months) {
            *slot = entries
                .iter()
                .filter(|entry| entry.expense.main == main)
                .map(VirtualEntry::amount)
                .sum();
        }
        series
    }
}

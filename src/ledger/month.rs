//! Year/month keys used to address ledger buckets and recurrence windows.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

pub const MONTHS_PER_YEAR: u32 = 12;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month with a zero-based month number (`0` is January).
///
/// Serialized as `"<year>-<month>"`, the creation key format of the ledger.
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if month >= MONTHS_PER_YEAR {
            return Err(LedgerError::InvalidRef(format!(
                "month {} is outside 0..=11",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// Builds a key from an absolute month index (`year * 12 + month`).
    pub fn from_absolute(index: i64) -> Self {
        Self {
            year: index.div_euclid(MONTHS_PER_YEAR as i64) as i32,
            month: index.rem_euclid(MONTHS_PER_YEAR as i64) as u32,
        }
    }

    /// Every month of `year`, January first.
    pub fn months_of(year: i32) -> impl Iterator<Item = MonthKey> {
        (0..MONTHS_PER_YEAR).map(move |month| MonthKey { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn absolute(&self) -> i64 {
        absolute_month(self.year, self.month)
    }

    pub fn next(&self) -> Self {
        Self::from_absolute(self.absolute() + 1)
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.month as usize]
    }
}

/// Absolute month index shared by keys and raw recurrence fields.
pub fn absolute_month(year: i32, month: u32) -> i64 {
    year as i64 * MONTHS_PER_YEAR as i64 + month as i64
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidRef(format!("`{}` is not a month key", value));
        let (year, month) = value.trim().rsplit_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

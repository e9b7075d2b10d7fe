use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::services::{CategoryFilter, EntryFilter, GroupDimension, TOTAL_LABEL};

#[derive(Parser, Debug)]
#[command(
    name = "budget_tracker_cli",
    version,
    about = "Monthly expense tracker with recurring entries"
)]
pub struct Cli {
    /// Year to browse (defaults to the current year)
    #[arg(long, global = true)]
    pub year: Option<i32>,

    /// Month to browse, 1-12 (defaults to the current month)
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Directory holding the ledger and backups (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the month's entries and the filtered total
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Record an expense in the selected month
    Add {
        /// Main category
        main: String,

        #[arg(allow_negative_numbers = true)]
        amount: f64,

        #[arg(long)]
        sub: Option<String>,

        #[arg(long, default_value = "")]
        note: String,

        /// Repeat every month from the selected month on
        #[arg(long)]
        recurring: bool,
    },

    /// Delete the record behind a listed position
    Delete {
        /// 1-based position as shown by `list` with the same filters
        position: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// End a recurring series at the selected month
    Stop {
        position: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Replace a listed record; a recurring series restarts at the selected month
    Edit {
        position: usize,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        changes: EditArgs,
    },

    /// Category totals and shares for the selected month
    Summary {
        #[arg(long, value_enum, default_value_t = GroupBy::Main)]
        by: GroupBy,
    },

    /// Per-month totals over the selected year
    Series {
        /// Main category, or "Total" for every category
        #[arg(default_value = TOTAL_LABEL)]
        category: String,
    },

    /// Category by month report for the selected year
    Report,

    /// Write a backup of the whole ledger
    Export {
        /// Target file (defaults to the managed backups directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the ledger with a backup file's contents
    Import { file: PathBuf },

    /// Show whether a backup is due for the selected month
    Reminder {
        /// Silence the reminder for the selected month
        #[arg(long)]
        dismiss: bool,
    },

    /// List categories, or the subcategory filter options of one main
    Categories { main: Option<String> },
}

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Main category filter ("All" for no filter)
    #[arg(long = "main")]
    pub main: Option<String>,

    /// Subcategory filter ("All" for no filter)
    #[arg(long = "sub")]
    pub sub: Option<String>,

    /// Case-insensitive text matched against the note
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> EntryFilter {
        let mut filter = EntryFilter::default();
        if let Some(main) = &self.main {
            filter = filter.with_main(parse_filter(main));
        }
        if let Some(sub) = &self.sub {
            filter = filter.with_sub(parse_filter(sub));
        }
        if let Some(search) = &self.search {
            filter = filter.with_search(search.as_str());
        }
        filter
    }
}

fn parse_filter(value: &str) -> CategoryFilter {
    match value.parse() {
        Ok(filter) => filter,
        Err(never) => match never {},
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct EditArgs {
    #[arg(id = "set_main", long = "set-main")]
    pub main: Option<String>,

    /// New subcategory; an empty value clears it
    #[arg(id = "set_sub", long = "set-sub")]
    pub sub: Option<String>,

    #[arg(long = "set-amount", allow_negative_numbers = true)]
    pub amount: Option<f64>,

    #[arg(long = "set-note")]
    pub note: Option<String>,

    #[arg(long = "set-recurring")]
    pub recurring: Option<bool>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Main,
    Sub,
}

impl From<GroupBy> for GroupDimension {
    fn from(value: GroupBy) -> Self {
        match value {
            GroupBy::Main => GroupDimension::Main,
            GroupBy::Sub => GroupDimension::Sub,
        }
    }
}

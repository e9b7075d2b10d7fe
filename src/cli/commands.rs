use chrono::{Datelike, Local, Utc};
use clap::Parser;
use std::fs;

use crate::{
    config::ConfigManager,
    core::{
        services::{
            CategoryFilter, ExpenseService, FilterService, MonthlySeries, Percentages,
            SeriesSelector, NO_DATA_LABEL,
        },
        BudgetTracker,
    },
    errors::CliError,
    ledger::{CategoryTaxonomy, ExpenseDraft, MonthKey, VirtualEntry, MONTH_NAMES},
    storage::{backup_reminder, JsonStorage},
    utils::format::{format_amount, format_percent},
};

use super::{
    args::{Cli, Command, EditArgs, FilterArgs},
    output,
};

/// Parses the process arguments and runs one command.
pub fn run_cli() -> Result<(), CliError> {
    execute(Cli::parse())
}

pub fn execute(cli: Cli) -> Result<(), CliError> {
    let config = ConfigManager::new()?.load()?;
    let storage = JsonStorage::new(cli.data_dir.clone().or_else(|| config.data_dir.clone()))?;
    let selected = selected_month(&cli)?;
    let mut tracker = BudgetTracker::open(
        Box::new(storage.clone()),
        config.categories.clone(),
        selected,
    )?;
    let session = Session {
        currency: &config.currency,
    };

    match cli.command {
        Command::List { filter } => session.list(&mut tracker, &filter),
        Command::Add {
            main,
            amount,
            sub,
            note,
            recurring,
        } => {
            let mut draft = ExpenseDraft::new(main, amount)
                .with_note(note)
                .recurring(recurring);
            draft.sub = sub;
            session.add(&mut tracker, draft)
        }
        Command::Delete { position, filter } => {
            let index = session.locate(&mut tracker, position, &filter)?;
            match tracker.delete_at(index)? {
                Some(expense) => output::success(format!(
                    "Deleted {} ({})",
                    expense.label(),
                    session.amount(expense.amount)
                )),
                None => output::warning("Nothing deleted."),
            }
            Ok(())
        }
        Command::Stop { position, filter } => {
            let index = session.locate(&mut tracker, position, &filter)?;
            if tracker.stop_recurring_at(index)? {
                output::success(format!(
                    "Series ends in {} {}.",
                    selected.name(),
                    selected.year()
                ));
            } else {
                output::warning("That entry is not recurring.");
            }
            Ok(())
        }
        Command::Edit {
            position,
            filter,
            changes,
        } => session.edit(&mut tracker, position, &filter, changes),
        Command::Summary { by } => {
            let view = tracker.render(by.into());
            output::section(format!("{} {}", selected.name(), selected.year()));
            match view.percentages {
                Percentages::NoData => output::info(NO_DATA_LABEL),
                Percentages::Shares(shares) => {
                    for (group, share) in view.grouping.totals().iter().zip(shares) {
                        output::info(format!(
                            "{:<24} {:>14} {:>7}",
                            group.label,
                            session.amount(group.amount),
                            format_percent(share.1)
                        ));
                    }
                }
            }
            Ok(())
        }
        Command::Series { category } => {
            let selector: SeriesSelector = match category.parse() {
                Ok(selector) => selector,
                Err(never) => match never {},
            };
            if let SeriesSelector::Category(main) = &selector {
                if !tracker.taxonomy().contains_main(main) {
                    return Err(CliError::Input(format!("unknown category `{}`", main)));
                }
            }
            output::section(format!("{} {}", category, selected.year()));
            match tracker.monthly_series(&selector) {
                MonthlySeries::Single(series) => {
                    for (name, value) in MONTH_NAMES.iter().zip(series.values) {
                        output::info(format!("{:<10} {:>14}", name, session.amount(value)));
                    }
                }
                MonthlySeries::Stacked(rows) => {
                    for row in rows.iter().filter(|row| row.total() != 0.0) {
                        output::info(format!("{:<24} {:>14}", row.label, session.amount(row.total())));
                    }
                }
            }
            Ok(())
        }
        Command::Report => {
            let report = tracker.annual_report(selected.year());
            output::section(format!("Report {}", report.year));
            if report.is_empty() {
                output::info("No expenses recorded.");
                return Ok(());
            }
            for row in report.rows.iter().filter(|row| row.total() != 0.0) {
                output::info(format!("{:<24} {:>14}", row.label, session.amount(row.total())));
            }
            for (name, value) in MONTH_NAMES.iter().zip(report.monthly_totals) {
                if value != 0.0 {
                    output::info(format!("  {:<22} {:>14}", name, session.amount(value)));
                }
            }
            output::info(format!("{:<24} {:>14}", "Total", session.amount(report.yearly_total)));
            Ok(())
        }
        Command::Export { output: target } => {
            let now = Utc::now();
            let path = match target {
                Some(path) => {
                    storage.write_backup_to(tracker.ledger(), &path, now)?;
                    path
                }
                None => storage.write_backup(tracker.ledger(), selected.year(), now)?,
            };
            output::success(format!("Backup saved to {}", path.display()));
            Ok(())
        }
        Command::Import { file } => {
            let text = fs::read_to_string(&file)?;
            tracker.import_backup(&text)?;
            storage.record_backup(Utc::now())?;
            output::success(format!(
                "Imported {} records from {}",
                tracker.ledger().record_count(),
                file.display()
            ));
            Ok(())
        }
        Command::Reminder { dismiss } => {
            if dismiss {
                storage.dismiss_reminder(selected)?;
                output::success(format!(
                    "Reminder dismissed for {} {}.",
                    selected.name(),
                    selected.year()
                ));
                return Ok(());
            }
            match backup_reminder(&storage.read_state()?, selected) {
                Some(reminder) => output::warning(reminder.message()),
                None => output::info("Backups are up to date."),
            }
            Ok(())
        }
        Command::Categories { main } => {
            print_categories(tracker.taxonomy(), main.as_deref());
            Ok(())
        }
    }
}

struct Session<'a> {
    currency: &'a str,
}

impl Session<'_> {
    fn amount(&self, value: f64) -> String {
        format_amount(value, self.currency)
    }

    fn list(&self, tracker: &mut BudgetTracker, filter: &FilterArgs) -> Result<(), CliError> {
        tracker.set_filter(filter.to_filter());
        let month = tracker.selected();
        output::section(format!("{} {}", month.name(), month.year()));
        if tracker.visible().is_empty() {
            output::info("No expenses.");
        }
        for (position, entry) in tracker.visible().iter().enumerate() {
            output::info(self.describe(position + 1, entry));
        }
        output::info(format!("Total: {}", self.amount(tracker.visible_total())));
        Ok(())
    }

    fn describe(&self, position: usize, entry: &VirtualEntry) -> String {
        let expense = &entry.expense;
        let mut line = format!(
            "{:>3}. {:<32} {:>14}",
            position,
            expense.label(),
            self.amount(expense.amount)
        );
        if !expense.note.is_empty() {
            line.push_str(&format!("  {}", expense.note));
        }
        if entry.is_generated {
            line.push_str("  (recurring)");
        } else if expense.is_recurring() {
            line.push_str("  (recurring, starts here)");
        }
        line
    }

    fn add(&self, tracker: &mut BudgetTracker, draft: ExpenseDraft) -> Result<(), CliError> {
        ExpenseService::validate(tracker.taxonomy(), &draft)
            .map_err(|err| CliError::Input(err.to_string()))?;
        let label = CategoryTaxonomy::label(&draft.main, draft.sub.as_deref());
        let amount = draft.amount;
        if tracker.add(draft)?.is_some() {
            output::success(format!("Added {} ({})", label, self.amount(amount)));
        }
        Ok(())
    }

    fn edit(
        &self,
        tracker: &mut BudgetTracker,
        position: usize,
        filter: &FilterArgs,
        changes: EditArgs,
    ) -> Result<(), CliError> {
        let index = self.locate(tracker, position, filter)?;
        let mut draft = match tracker.visible().get(index) {
            Some(entry) => ExpenseDraft::from_expense(&entry.expense),
            None => return Err(CliError::Input(format!("no entry at position {}", position))),
        };
        if let Some(main) = changes.main {
            draft.main = main;
        }
        if let Some(sub) = changes.sub {
            draft.sub = if sub.is_empty() { None } else { Some(sub) };
        }
        if let Some(amount) = changes.amount {
            draft.amount = amount;
        }
        if let Some(note) = changes.note {
            draft.note = note;
        }
        if let Some(recurring) = changes.recurring {
            draft.recurring = recurring;
        }
        ExpenseService::validate(tracker.taxonomy(), &draft)
            .map_err(|err| CliError::Input(err.to_string()))?;
        if tracker.replace_at(index, draft)?.is_some() {
            output::success(format!("Updated entry {}.", position));
        }
        Ok(())
    }

    /// Resolves a 1-based position against the filtered list.
    fn locate(
        &self,
        tracker: &mut BudgetTracker,
        position: usize,
        filter: &FilterArgs,
    ) -> Result<usize, CliError> {
        let visible = tracker.set_filter(filter.to_filter()).len();
        match position.checked_sub(1) {
            Some(index) if index < visible => Ok(index),
            _ => Err(CliError::Input(format!(
                "no entry at position {} ({} listed)",
                position, visible
            ))),
        }
    }
}

fn selected_month(cli: &Cli) -> Result<MonthKey, CliError> {
    let today = Local::now();
    let year = cli.year.unwrap_or_else(|| today.year());
    let month = cli.month.map(|month| month - 1).unwrap_or_else(|| today.month0());
    MonthKey::new(year, month).map_err(|err| CliError::Input(err.to_string()))
}

fn print_categories(taxonomy: &CategoryTaxonomy, main: Option<&str>) {
    match main {
        Some(main) => {
            let filter: CategoryFilter = match main.parse() {
                Ok(filter) => filter,
                Err(never) => match never {},
            };
            for option in FilterService::sub_filter_options(taxonomy, &filter) {
                output::info(option);
            }
        }
        None => {
            for category in taxonomy.categories() {
                if category.subcategories.is_empty() {
                    output::info(&category.name);
                } else {
                    output::info(format!(
                        "{}: {}",
                        category.name,
                        category.subcategories.join(", ")
                    ));
                }
            }
        }
    }
}

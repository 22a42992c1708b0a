use std::io;
use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDate};
use log::info;
use crate::chart;
use crate::command::Period;
use crate::config::{Config, ConfigError};
use crate::entry::{self, LineSource, Prompter, ENTRY_DATE_PROMPT};
use crate::report;
use crate::store::{QueryResult, TransactionStore};
use crate::transaction::Transaction;
use crate::util::{month_of, year_of};

#[cfg(test)]
mod tests;

const START_DATE_PROMPT: &str = "Enter the start date (dd-mm-yyyy): ";
const END_DATE_PROMPT: &str = "Enter the end date (dd-mm-yyyy): ";
const PLOT_PROMPT: &str = "Do you want to see a plot? (y/n) ";

/// Field values given up front, e.g. on the command line. Missing or invalid ones are asked for.
#[derive(Debug, Default, Clone)]
pub(crate) struct EntryFields {
    pub(crate) date: Option<String>,
    pub(crate) amount: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) description: Option<String>,
}

impl EntryFields {
    fn is_empty(&self) -> bool {
        self.date.is_none() && self.amount.is_none() && self.category.is_none() && self.description.is_none()
    }
}

/// How the result of a query is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presentation {
    List,
    /// List, then ask whether to chart it too
    ListAskPlot,
    ListAndPlot,
    PlotOnly,
}

/// Glue between the prompts, the store and the printed output
pub(crate) struct Controller {
    store: TransactionStore,
    date_format: String,
    chart_width: usize,
}

impl Controller {
    pub(crate) fn new(config: &Config) -> Result<Controller, ConfigError> {
        let store_config = config.store_config()?;
        Ok(Controller {
            date_format: store_config.date_format.clone(),
            store: TransactionStore::new(store_config),
            chart_width: config.chart_width,
        })
    }

    pub(crate) fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub(crate) fn init(&self) -> anyhow::Result<()> {
        self.store.initialize()
            .with_context(|| format!("Unable to initialise ledger {}", self.store.file_path().display()))
    }

    /// Record one transaction
    pub(crate) fn add<S: LineSource>(&self, source: &mut S, fields: &EntryFields) -> anyhow::Result<Transaction> {
        self.init()?;

        let transaction = self.collect_entry(source, fields)?;
        self.store.add_entry(&transaction)
            .with_context(|| format!("Unable to add entry to {}", self.store.file_path().display()))?;
        println!("Entry added successfully");

        Ok(transaction)
    }

    fn collect_entry<S: LineSource>(&self, source: &mut S, fields: &EntryFields) -> anyhow::Result<Transaction> {
        let mut prompter = Prompter::new(source, io::stdout(), &self.date_format);
        if fields.is_empty() {
            return Ok(prompter.get_transaction()?);
        }

        let date = match fields.date.as_deref().map(|s| entry::parse_date(s, &self.date_format)) {
            Some(Ok(date)) => date,
            Some(Err(e)) => {
                println!("{e}");
                prompter.get_date(ENTRY_DATE_PROMPT, true)?
            }
            None => prompter.get_date(ENTRY_DATE_PROMPT, true)?,
        };

        let amount = match fields.amount.as_deref().map(entry::parse_amount) {
            Some(Ok(amount)) => amount,
            Some(Err(e)) => {
                println!("{e}");
                prompter.get_amount()?
            }
            None => prompter.get_amount()?,
        };

        let category = match fields.category.as_deref().map(entry::parse_category) {
            Some(Ok(category)) => category,
            Some(Err(e)) => {
                println!("{e}");
                prompter.get_category()?
            }
            None => prompter.get_category()?,
        };

        let description = match &fields.description {
            Some(description) => description.clone(),
            None => prompter.get_description()?,
        };

        Ok(Transaction::new(date, amount, category, &description))
    }

    /// Run the query described by `period`, asking for dates if the period leaves them open
    pub(crate) fn query<S: LineSource>(&self, source: &mut S, period: &Period) -> anyhow::Result<QueryResult> {
        self.init()?;

        let result = match period {
            Period::Prompt => {
                let mut prompter = Prompter::new(source, io::stdout(), &self.date_format);
                let start = prompter.get_date(START_DATE_PROMPT, false)?;
                let end = prompter.get_date(END_DATE_PROMPT, false)?;
                self.store.get_transactions(start, end)?
            }
            Period::Between(start, end) => self.store.get_transactions_str(start, end)?,
            Period::Month(month) => {
                let range = month_of(*month, Local::now().date_naive())
                    .ok_or_else(|| anyhow!("Month must be between 1 and 12, got {month}"))?;
                self.store.get_transactions(*range.start(), *range.end())?
            }
            Period::Year(year) => {
                let range = year_of(*year).ok_or_else(|| anyhow!("Year {year} is out of range"))?;
                self.store.get_transactions(*range.start(), *range.end())?
            }
            Period::All => everything(self.store.all_transactions()?),
        };

        info!("{} transactions found", result.transactions().len());
        Ok(result)
    }

    /// Query, then print the rows and/or chart them
    pub(crate) fn view<S: LineSource>(&self, source: &mut S, period: &Period, presentation: Presentation) -> anyhow::Result<QueryResult> {
        let result = self.query(source, period)?;

        if presentation == Presentation::PlotOnly {
            println!("{}", report::notice(&result, &self.date_format));
        } else {
            report::print_result(&result, &self.date_format);
        }
        if result.is_empty() {
            return Ok(result);
        }

        let plot = match presentation {
            Presentation::List => false,
            Presentation::ListAndPlot | Presentation::PlotOnly => true,
            Presentation::ListAskPlot => Prompter::new(source, io::stdout(), &self.date_format).confirm(PLOT_PROMPT)?,
        };
        if plot {
            self.plot(&result);
        }

        Ok(result)
    }

    fn plot(&self, result: &QueryResult) {
        let series = chart::daily_totals(result.transactions());
        println!("Income and Expense Over Time");
        println!("{}", chart::render(&series, self.chart_width, &self.date_format));
    }
}

/// Wrap a whole ledger as a query result spanning its first to last date
fn everything(transactions: Vec<Transaction>) -> QueryResult {
    let dates = transactions.iter().map(|t| t.date);
    let (start, end): (Option<NaiveDate>, Option<NaiveDate>) = (dates.clone().min(), dates.max());
    match (start, end) {
        (Some(start), Some(end)) => QueryResult::Found { start, end, transactions },
        _ => QueryResult::NoTransactions,
    }
}

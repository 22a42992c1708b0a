#[cfg(test)]
use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use chrono::{Local, NaiveDate};
use log::warn;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::{Editor, Helper};
use crate::transaction::{Category, Transaction};
use crate::util;

/// Why a typed value was refused. These never leave this module's prompt loops, they are
/// printed and the user is asked again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    InvalidDate,
    NotANumber,
    NotPositive,
    InvalidCategory,
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntryError::InvalidDate => write!(f, "Invalid date format. Please enter the date in dd-mm-yyyy format"),
            EntryError::NotANumber => write!(f, "Invalid amount: not a number"),
            EntryError::NotPositive => write!(f, "Invalid amount: Amount must be a positive value."),
            EntryError::InvalidCategory => write!(f, "Invalid category. Please enter 'I' for Income or 'E' for Expense."),
        }
    }
}

impl std::error::Error for EntryError {}

/// Somewhere lines of user input come from
pub(crate) trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<String, ReadlineError>;
}

impl<H: Helper, I: History> LineSource for Editor<H, I> {
    fn read_line(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.readline(prompt)
    }
}

/// Pre-recorded answers. Running out of answers behaves like Ctrl-D.
#[cfg(test)]
pub(crate) struct ScriptedSource {
    lines: VecDeque<String>,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> ScriptedSource {
        ScriptedSource { lines: lines.into_iter().map(Into::into).collect() }
    }
}

#[cfg(test)]
impl LineSource for ScriptedSource {
    fn read_line(&mut self, _prompt: &str) -> Result<String, ReadlineError> {
        self.lines.pop_front().ok_or(ReadlineError::Eof)
    }
}

pub(crate) const ENTRY_DATE_PROMPT: &str = "Enter the date of the transaction (dd-mm-yyyy) or enter for today's date: ";

pub(crate) fn parse_date(s: &str, format: &str) -> Result<NaiveDate, EntryError> {
    util::parse_date(s.trim(), format).map_err(|_| EntryError::InvalidDate)
}

pub(crate) fn parse_amount(s: &str) -> Result<f64, EntryError> {
    let amount = s.trim().parse::<f64>().map_err(|_| EntryError::NotANumber)?;
    // "nan" and "inf" parse as f64 but are not amounts
    if !amount.is_finite() {
        return Err(EntryError::NotANumber);
    }
    if amount <= 0.0 {
        return Err(EntryError::NotPositive);
    }
    Ok(amount)
}

pub(crate) fn parse_category(s: &str) -> Result<Category, EntryError> {
    Category::from_shorthand(s.trim()).ok_or(EntryError::InvalidCategory)
}

/// Asks for transaction fields one at a time, repeating the question until the answer is valid.
/// Refusals are written to `out`; only a closed or interrupted input source ends a question early.
pub(crate) struct Prompter<'a, S: LineSource, W: Write> {
    source: &'a mut S,
    out: W,
    date_format: String,
    today: NaiveDate,
}

impl<'a, S: LineSource, W: Write> Prompter<'a, S, W> {
    pub(crate) fn new(source: &'a mut S, out: W, date_format: &str) -> Self {
        Prompter {
            source,
            out,
            date_format: date_format.to_string(),
            today: Local::now().date_naive(),
        }
    }

    /// Use a fixed date for the "press enter for today" default
    #[cfg(test)]
    pub(crate) fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn refuse(&mut self, err: &EntryError) {
        if let Err(e) = writeln!(self.out, "{err}") {
            warn!("Unable to print validation message: {e}");
        }
    }

    /// With `allow_default`, an empty answer means today
    pub(crate) fn get_date(&mut self, prompt: &str, allow_default: bool) -> Result<NaiveDate, ReadlineError> {
        loop {
            let line = self.source.read_line(prompt)?;
            if allow_default && line.trim().is_empty() {
                return Ok(self.today);
            }
            match parse_date(&line, &self.date_format) {
                Ok(date) => return Ok(date),
                Err(e) => self.refuse(&e),
            }
        }
    }

    pub(crate) fn get_amount(&mut self) -> Result<f64, ReadlineError> {
        loop {
            let line = self.source.read_line("Enter the amount: ")?;
            match parse_amount(&line) {
                Ok(amount) => return Ok(amount),
                Err(e) => self.refuse(&e),
            }
        }
    }

    pub(crate) fn get_category(&mut self) -> Result<Category, ReadlineError> {
        loop {
            let line = self.source.read_line("Enter the category ('I' for Income or 'E' for Expense): ")?;
            match parse_category(&line) {
                Ok(category) => return Ok(category),
                Err(e) => self.refuse(&e),
            }
        }
    }

    pub(crate) fn get_description(&mut self) -> Result<String, ReadlineError> {
        self.source.read_line("Enter a description (optional): ")
    }

    /// Ask for every field of a new transaction, in ledger order
    pub(crate) fn get_transaction(&mut self) -> Result<Transaction, ReadlineError> {
        let date = self.get_date(ENTRY_DATE_PROMPT, true)?;
        let amount = self.get_amount()?;
        let category = self.get_category()?;
        let description = self.get_description()?;
        Ok(Transaction::new(date, amount, category, &description))
    }

    /// Ask a yes/no question. Anything starting with `y` counts as yes.
    pub(crate) fn confirm(&mut self, prompt: &str) -> Result<bool, ReadlineError> {
        let line = self.source.read_line(prompt)?;
        Ok(line.trim().to_ascii_lowercase().starts_with('y'))
    }
}

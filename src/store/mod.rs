use std::{fmt, fs, io};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use chrono::NaiveDate;
use csv::StringRecord;
use log::{debug, info};
use serde::Deserialize;
use crate::config::{DEFAULT_DATE_FORMAT, DEFAULT_LEDGER_FILE};
use crate::transaction::{format_amount, Category, Transaction};
use crate::util::{format_date, parse_date};


/// A column of the ledger file. Rows are read back by header name and appended in the order of
/// the file's own header, so the configured order only matters when creating the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
    Date,
    Amount,
    Category,
    Description,
}

impl Column {
    pub(crate) const ALL: [Column; 4] = [Column::Date, Column::Amount, Column::Category, Column::Description];

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Amount => "amount",
            Column::Category => "category",
            Column::Description => "description",
        }
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL.into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown column '{s}'"))
    }
}

/// Where the ledger lives and how it is laid out
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoreConfig {
    pub(crate) file_path: PathBuf,
    pub(crate) columns: Vec<Column>,
    pub(crate) date_format: String,
}

impl StoreConfig {
    #[cfg(test)]
    pub(crate) fn with_file(file_path: &Path) -> StoreConfig {
        StoreConfig {
            file_path: file_path.to_path_buf(),
            ..StoreConfig::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            file_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            columns: Column::ALL.to_vec(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// The ledger file does not exist, `initialize` has not been run
    NotInitialized(PathBuf),
    InvalidHeader(String),
    InvalidAmount(f64),
    InvalidDate(String),
    /// A row in the ledger could not be parsed. `line` is 1-based and counts the header.
    MalformedRow { line: u64, reason: String },
    Io(io::Error),
    Csv(csv::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::NotInitialized(path) => write!(f, "ledger file {} does not exist", path.display()),
            StoreError::InvalidHeader(s) => write!(f, "ledger header is invalid: {s}"),
            StoreError::InvalidAmount(amount) => write!(f, "amount must be a positive value, got {amount}"),
            StoreError::InvalidDate(s) => write!(f, "invalid date '{s}'"),
            StoreError::MalformedRow { line, reason } => write!(f, "malformed row at line {line}: {reason}"),
            StoreError::Io(e) => write!(f, "ledger io error: {e}"),
            StoreError::Csv(e) => write!(f, "ledger csv error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Csv(e)
    }
}

/// Outcome of a date range query
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum QueryResult {
    NoTransactions,
    /// Matching rows in file order, with the inclusive range that was asked for
    Found { start: NaiveDate, end: NaiveDate, transactions: Vec<Transaction> },
}

impl QueryResult {
    pub(crate) fn transactions(&self) -> &[Transaction] {
        match self {
            QueryResult::NoTransactions => &[],
            QueryResult::Found { transactions, .. } => transactions,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.transactions().is_empty()
    }
}

/// A ledger row as it appears in the file
#[derive(Deserialize, Debug)]
struct CsvRow {
    date: String,
    amount: String,
    category: String,
    description: String,
}

/// CSV backed transaction store. Every call opens the file, does its work and closes it again,
/// nothing is cached between calls.
pub(crate) struct TransactionStore {
    config: StoreConfig,
}

impl TransactionStore {
    pub(crate) fn new(config: StoreConfig) -> TransactionStore {
        TransactionStore { config }
    }

    pub(crate) fn file_path(&self) -> &Path {
        &self.config.file_path
    }

    /// Make sure the ledger exists and starts with a header row. Existing rows are never touched.
    pub(crate) fn initialize(&self) -> Result<(), StoreError> {
        let path = self.file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            info!("Creating ledger {}", path.display());
            return self.write_header();
        }

        if fs::metadata(path)?.len() == 0 {
            info!("Ledger {} is empty, writing header", path.display());
            return self.write_header();
        }

        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        check_header(rdr.headers()?)
    }

    fn write_header(&self) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(self.file_path())?;
        writer.write_record(self.config.columns.iter().map(|c| c.name()))?;
        writer.flush()?;
        Ok(())
    }

    /// Append one transaction to the end of the ledger, fields in the order of the file's header
    pub(crate) fn add_entry(&self, t: &Transaction) -> Result<(), StoreError> {
        if !(t.amount.is_finite() && t.amount > 0.0) {
            return Err(StoreError::InvalidAmount(t.amount));
        }

        let path = self.file_path();
        let mut file = OpenOptions::new().read(true).append(true).open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotInitialized(path.to_path_buf()),
            _ => StoreError::Io(e),
        })?;
        let columns = self.file_columns()?;

        if !ends_with_newline(&mut file)? {
            debug!("Ledger {} does not end with a newline, adding one", path.display());
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(self.to_record(t, &columns))?;
        writer.flush()?;

        debug!("Entry added successfully");
        Ok(())
    }

    /// Column order of the existing ledger, taken from its header row
    fn file_columns(&self) -> Result<Vec<Column>, StoreError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(self.file_path())?;
        let headers = rdr.headers()?;
        check_header(headers)?;
        headers.iter()
            .map(|name| name.parse::<Column>().map_err(StoreError::InvalidHeader))
            .collect()
    }

    fn to_record(&self, t: &Transaction, columns: &[Column]) -> Vec<String> {
        columns.iter().map(|c| match c {
            Column::Date => format_date(t.date, &self.config.date_format),
            Column::Amount => format_amount(t.amount),
            Column::Category => t.category.label().to_string(),
            Column::Description => t.description.clone(),
        }).collect()
    }

    /// Return transactions dated within `[start, end]`, both inclusive, in file order
    pub(crate) fn get_transactions(&self, start: NaiveDate, end: NaiveDate) -> Result<QueryResult, StoreError> {
        if start > end {
            debug!("Start date {start} is after end date {end}");
            return Ok(QueryResult::NoTransactions);
        }

        let transactions: Vec<Transaction> = self.all_transactions()?
            .into_iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect();
        debug!("{} transactions between {start} and {end}", transactions.len());

        if transactions.is_empty() {
            Ok(QueryResult::NoTransactions)
        } else {
            Ok(QueryResult::Found { start, end, transactions })
        }
    }

    /// Same as `get_transactions`, with both bounds written in the ledger date format
    pub(crate) fn get_transactions_str(&self, start: &str, end: &str) -> Result<QueryResult, StoreError> {
        let format = &self.config.date_format;
        let start = parse_date(start, format).map_err(|_| StoreError::InvalidDate(start.to_string()))?;
        let end = parse_date(end, format).map_err(|_| StoreError::InvalidDate(end.to_string()))?;
        self.get_transactions(start, end)
    }

    /// Load every row of the ledger
    pub(crate) fn all_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        let path = self.file_path();
        if !path.exists() {
            return Err(StoreError::NotInitialized(path.to_path_buf()));
        }

        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let headers = rdr.headers()?.clone();
        check_header(&headers)?;

        let mut transactions = vec![];
        for result in rdr.records() {
            let record = result.map_err(|e| StoreError::MalformedRow {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            transactions.push(self.parse_record(&record, &headers)?);
        }

        debug!("Loaded {} transactions from {}", transactions.len(), path.display());
        Ok(transactions)
    }

    fn parse_record(&self, record: &StringRecord, headers: &StringRecord) -> Result<Transaction, StoreError> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let malformed = |reason: String| StoreError::MalformedRow { line, reason };

        let row: CsvRow = record.deserialize(Some(headers)).map_err(|e| malformed(e.to_string()))?;

        let date = parse_date(row.date.trim(), &self.config.date_format)
            .map_err(|e| malformed(format!("date '{}': {e}", row.date)))?;
        let amount = row.amount.trim().parse::<f64>()
            .map_err(|e| malformed(format!("amount '{}': {e}", row.amount)))?;
        let category = row.category.trim().parse::<Category>().map_err(malformed)?;

        Ok(Transaction {
            date,
            amount,
            category,
            description: row.description,
        })
    }
}

/// True when the file is empty or its last byte is a newline
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// The header must name the four ledger columns, in any order
fn check_header(headers: &StringRecord) -> Result<(), StoreError> {
    let mut names: Vec<&str> = headers.iter().collect();
    names.sort_unstable();
    let mut expected: Vec<&str> = Column::ALL.iter().map(|c| c.name()).collect();
    expected.sort_unstable();

    if names != expected {
        return Err(StoreError::InvalidHeader(format!(
            "expected columns {}, found {}", expected.join(","), headers.iter().collect::<Vec<&str>>().join(",")
        )));
    }
    Ok(())
}

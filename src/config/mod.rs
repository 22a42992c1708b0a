use std::{fmt, fs, io};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use chrono::NaiveDate;
use log::info;
use serde::Deserialize;
use crate::store::{Column, StoreConfig};

/// Ledger file used when neither the config file nor the command line names one
pub(crate) const DEFAULT_LEDGER_FILE: &str = "finance_data.csv";

pub(crate) const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Settings read from `config.toml`. Every key is optional.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    /// Path of the CSV ledger
    pub(crate) file: PathBuf,
    /// chrono format string used for dates, both in the file and at the prompt
    pub(crate) date_format: String,
    /// Column order used when creating the ledger. Rows are appended in the order of the existing header.
    pub(crate) columns: Vec<String>,
    /// Width in characters of the longest bar in the chart
    pub(crate) chart_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file: PathBuf::from(DEFAULT_LEDGER_FILE),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            columns: Column::ALL.iter().map(|c| c.name().to_string()).collect(),
            chart_width: 40,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(PathBuf, io::Error),
    Parse(PathBuf, toml::de::Error),
    InvalidColumns(String),
    InvalidDateFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Read(path, e) => write!(f, "unable to read config {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "invalid config {}: {}", path.display(), e),
            ConfigError::InvalidColumns(s) => write!(f, "invalid columns setting: {}", s),
            ConfigError::InvalidDateFormat(s) => write!(f, "invalid date_format setting: {}", s),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load config from a toml file. A missing file is not an error, defaults are used instead.
    pub(crate) fn load_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        if !file_path.is_file() {
            info!("No config file at {}, using defaults", file_path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(file_path)
            .map_err(|e| ConfigError::Read(file_path.to_path_buf(), e))?;
        toml::from_str::<Config>(&content)
            .map_err(|e| ConfigError::Parse(file_path.to_path_buf(), e))
    }

    /// `<config dir>/fintrack/config.toml`, e.g. `~/.config/fintrack/config.toml` on Linux
    pub(crate) fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("fintrack").join("config.toml"))
    }

    pub(crate) fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        let mut columns = vec![];
        for name in &self.columns {
            let column = name.parse::<Column>().map_err(ConfigError::InvalidColumns)?;
            if columns.contains(&column) {
                return Err(ConfigError::InvalidColumns(format!("'{name}' appears more than once")));
            }
            columns.push(column);
        }
        if columns.len() != Column::ALL.len() {
            return Err(ConfigError::InvalidColumns(format!(
                "expected all of {}", Column::ALL.map(|c| c.name()).join(", ")
            )));
        }

        check_date_format(&self.date_format)?;

        Ok(StoreConfig {
            file_path: self.file.clone(),
            columns,
            date_format: self.date_format.clone(),
        })
    }
}

/// A date format must print a date and read the same date back, otherwise nothing written to the
/// ledger could ever be queried again
fn check_date_format(format: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidDateFormat(format!("'{format}' cannot write and read back a date"));
    let Some(sample) = NaiveDate::from_ymd_opt(2024, 12, 25) else {
        return Err(invalid());
    };

    // Writing through fmt::Write reports unknown specifiers instead of panicking
    let mut formatted = String::new();
    write!(formatted, "{}", sample.format(format)).map_err(|_| invalid())?;
    match NaiveDate::parse_from_str(&formatted, format) {
        Ok(date) if date == sample => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.columns, vec!["date", "amount", "category", "description"]);
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "file = \"/tmp/ledger.csv\"").unwrap();
        writeln!(file, "chart_width = 20").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.file, PathBuf::from("/tmp/ledger.csv"));
        assert_eq!(config.chart_width, 20);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chart_width = \"wide\"").unwrap();

        let result = Config::load_from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_, _))));
    }

    #[test]
    fn test_store_config_columns() {
        let mut config = Config::default();
        config.columns = vec!["category".into(), "date".into(), "description".into(), "amount".into()];
        let store_config = config.store_config().unwrap();
        assert_eq!(store_config.columns, vec![Column::Category, Column::Date, Column::Description, Column::Amount]);

        config.columns = vec!["date".into(), "amount".into(), "category".into()];
        assert!(config.store_config().is_err());

        config.columns = vec!["date".into(), "date".into(), "category".into(), "amount".into()];
        assert!(config.store_config().is_err());

        config.columns = vec!["date".into(), "amount".into(), "category".into(), "memo".into()];
        assert!(config.store_config().is_err());
    }

    #[test]
    fn test_store_config_date_format() {
        let mut config = Config::default();
        for format in ["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y", "%d %b %Y"] {
            config.date_format = format.to_string();
            assert_eq!(config.store_config().unwrap().date_format, format);
        }

        for format in ["%d-%m-%Q", "%m-%Y", "%d-%m", "ledger"] {
            config.date_format = format.to_string();
            assert!(matches!(config.store_config(), Err(ConfigError::InvalidDateFormat(_))), "{format}");
        }
    }
}

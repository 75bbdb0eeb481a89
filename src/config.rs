//! Configuration handling for csvtab

use crate::error::{Result, TableError};

/// Environment variable that overrides the output delimiter
pub const DELIMITER_ENV_VAR: &str = "CSVTAB_DELIMITER";

/// Rendering for report-style commands (stats, describe)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    /// Input delimiter; `None` picks one from the file extension
    pub delimiter: Option<u8>,
    /// Delimiter for CSV output
    pub output_delimiter: u8,
    /// How reports are rendered
    pub report_format: ReportFormat,
    /// Debug logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: None,
            output_delimiter: b',',
            report_format: ReportFormat::default(),
            verbose: false,
        }
    }
}

impl Config {
    /// Defaults plus any overrides taken from the environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(DELIMITER_ENV_VAR) {
            if !value.is_empty() {
                config.output_delimiter = parse_delimiter(&value)?;
            }
        }
        Ok(config)
    }

    /// Set the input delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the output delimiter
    pub fn with_output_delimiter(mut self, delimiter: u8) -> Self {
        self.output_delimiter = delimiter;
        self
    }

    /// Set the report format
    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = format;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Parse a delimiter argument: one ASCII character, or `\t` / `tab`
pub fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(TableError::InvalidDelimiter(s.to_string())),
    }
}

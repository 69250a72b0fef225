//! Datalog CSV validation and parsing.
//!
//! A datalog is accepted when the raw text mentions both required channel
//! tokens. This is a cheap plausibility check on the whole document, not a
//! structural header check: a file whose header says `Engine RPM` passes the
//! gate but yields no rows, since row validity reads the exact `RPM` column.

use thiserror::Error;

use super::types::{channel, Datalog, DatalogRow};

/// Tokens that must appear somewhere in a datalog export
pub const REQUIRED_TOKENS: [&str; 2] = [channel::RPM, channel::MAP];

/// Message shown to users in place of a raw validation error
pub const USER_HINT: &str =
    "Invalid CSV. Ensure it is a valid Hondata datalog export with RPM and MAP columns.";

/// Errors that can occur while validating a datalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatalogError {
    /// Required channel tokens are missing from the text
    #[error("not a recognized datalog export (missing {})", missing.join(", "))]
    Format { missing: Vec<&'static str> },

    /// The CSV body could not be split into header-aligned records
    #[error("error parsing CSV{}: {message}", at_line(line))]
    Parse { line: Option<u64>, message: String },
}

impl DatalogError {
    /// Static hint naming the two required columns
    pub fn user_hint(&self) -> &'static str {
        USER_HINT
    }

    fn from_csv(err: &csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        let message = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => format!("expected {} fields but found {}", expected_len, len),
            csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {}", err),
            _ => err.to_string(),
        };
        DatalogError::Parse { line, message }
    }
}

fn at_line(line: &Option<u64>) -> String {
    match line {
        Some(line) => format!(" at line {}", line),
        None => String::new(),
    }
}

/// Return the required tokens absent from `text`
pub fn missing_tokens(text: &str) -> Vec<&'static str> {
    REQUIRED_TOKENS
        .into_iter()
        .filter(|token| !text.contains(token))
        .collect()
}

/// Coerce a cell to a number. Empty and non-numeric cells are absent.
fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl Datalog {
    /// Validate and parse datalog text.
    ///
    /// The token check runs first and short-circuits parsing entirely. Rows
    /// without a positive RPM are dropped silently; only tokenizer failures
    /// surface as errors.
    pub fn parse(text: &str) -> Result<Self, DatalogError> {
        let missing = missing_tokens(text);
        if !missing.is_empty() {
            tracing::warn!("Rejected datalog, missing tokens: {:?}", missing);
            return Err(DatalogError::Format { missing });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| DatalogError::from_csv(&e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        let mut dropped = 0;

        for result in reader.records() {
            let record = result.map_err(|e| DatalogError::from_csv(&e))?;

            let row = DatalogRow::from_channels(
                columns
                    .iter()
                    .zip(record.iter())
                    .map(|(name, cell)| (name.as_str(), parse_cell(cell))),
            );

            if row.is_valid() {
                rows.push(row);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            tracing::debug!("Dropped {} rows without a positive RPM", dropped);
        }
        tracing::info!(
            "Parsed datalog: {} columns, {} rows",
            columns.len(),
            rows.len()
        );

        Ok(Datalog {
            columns,
            rows,
            dropped,
        })
    }
}

/// Validate datalog text and return its running samples in file order
pub fn validate(text: &str) -> Result<Vec<DatalogRow>, DatalogError> {
    Datalog::parse(text).map(Datalog::into_rows)
}

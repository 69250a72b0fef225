use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// Header names of the channels the pipeline reads directly
pub mod channel {
    pub const TIME: &str = "Time";
    pub const RPM: &str = "RPM";
    pub const MAP: &str = "MAP";
    pub const AFR: &str = "AFR";
    pub const IGNITION_TOTAL: &str = "Ignition Total";
    pub const INJECTOR_DUTY: &str = "Injector Duty";
}

/// One logged sample.
///
/// Every column of the source file is kept, keyed by its header name. Cells
/// that were empty or non-numeric are stored as `None` rather than zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DatalogRow {
    channels: BTreeMap<String, Option<f64>>,
}

impl DatalogRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(name, value)` pairs
    pub fn from_channels<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<f64>)>,
        S: Into<String>,
    {
        Self {
            channels: channels
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Set a channel value, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: Option<f64>) {
        self.channels.insert(name.into(), value);
    }

    /// Value of any channel by exact header name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.channels.get(name).copied().flatten()
    }

    /// Whether the channel exists as a column on this row (even if absent)
    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.channels.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn time(&self) -> Option<f64> {
        self.get(channel::TIME)
    }

    pub fn rpm(&self) -> Option<f64> {
        self.get(channel::RPM)
    }

    pub fn map(&self) -> Option<f64> {
        self.get(channel::MAP)
    }

    pub fn afr(&self) -> Option<f64> {
        self.get(channel::AFR)
    }

    pub fn ignition_total(&self) -> Option<f64> {
        self.get(channel::IGNITION_TOTAL)
    }

    pub fn injector_duty(&self) -> Option<f64> {
        self.get(channel::INJECTOR_DUTY)
    }

    /// A row represents a running sample only if RPM is present and positive
    pub fn is_valid(&self) -> bool {
        self.rpm().is_some_and(|rpm| rpm > 0.0)
    }
}

/// A row paired with the header it came from, serialized as a flat
/// channel map in column order
#[derive(Clone, Copy, Debug)]
pub struct OrderedRow<'a> {
    columns: &'a [String],
    row: &'a DatalogRow,
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (i, name) in self.columns.iter().enumerate() {
            // Repeated header names map to one channel
            if self.columns[..i].contains(name) || !self.row.has_channel(name) {
                continue;
            }
            map.serialize_entry(name, &self.row.get(name))?;
        }
        map.end()
    }
}

/// Min/max/average of one channel across a datalog
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Last present value in the log
    pub last: f64,
    /// Number of rows carrying a value for this channel
    pub samples: usize,
}

/// Parsed and filtered datalog
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Datalog {
    /// Header names in file order
    pub(crate) columns: Vec<String>,
    /// Running samples, in file order
    pub(crate) rows: Vec<DatalogRow>,
    /// Number of data records discarded by the RPM filter
    pub(crate) dropped: usize,
}

impl Datalog {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[DatalogRow] {
        &self.rows
    }

    /// Rows for output, each keyed in header order
    pub fn ordered_rows(&self) -> Vec<OrderedRow<'_>> {
        self.rows
            .iter()
            .map(|row| OrderedRow {
                columns: &self.columns,
                row,
            })
            .collect()
    }

    pub fn into_rows(self) -> Vec<DatalogRow> {
        self.rows
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find column index by name
    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All present values of a channel, in row order
    pub fn channel_values(&self, name: &str) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row.get(name)).collect()
    }

    /// `(rpm, value)` pairs for plotting a channel against engine speed.
    /// Rows missing the channel are skipped.
    pub fn series_against_rpm(&self, name: &str) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|row| Some((row.rpm()?, row.get(name)?)))
            .collect()
    }

    /// Summary of a single channel, or `None` if it never carries a value
    pub fn summarize_channel(&self, name: &str) -> Option<ChannelSummary> {
        let values = self.channel_values(name);
        let last = *values.last()?;

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;

        Some(ChannelSummary {
            name: name.to_string(),
            min,
            max,
            avg,
            last,
            samples: values.len(),
        })
    }

    /// Summaries for every column that carries at least one value, in header order
    pub fn summarize(&self) -> Vec<ChannelSummary> {
        self.columns
            .iter()
            .filter_map(|name| self.summarize_channel(name))
            .collect()
    }
}

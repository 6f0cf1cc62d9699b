//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::dataset::{Dataset, Value};
use crate::error::{Result, TabforgeError};
use super::source::SourceMetadata;

/// Delimiters to try when auto-detecting, in tie-break order.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Records sampled per candidate delimiter.
const SNIFF_RECORDS: usize = 10;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses delimited text files into datasets.
///
/// Every cell becomes [`Value::Text`], or [`Value::Null`] for null tokens;
/// typing is left to `astype` rules.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| TabforgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| TabforgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents, self.config.quote)?,
        };
        let dataset = self.parse_bytes(&contents, delimiter)?;
        let source = SourceMetadata::describe(path, &contents, delimiter, &dataset);

        debug!(
            path = %path.display(),
            rows = source.row_count,
            columns = source.column_count,
            format = source.format(),
            "Parsed data file"
        );

        Ok((dataset, source))
    }

    /// Parse in-memory text, auto-detecting the delimiter unless configured.
    pub fn parse_str(&self, text: &str) -> Result<Dataset> {
        let bytes = text.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes, self.config.quote)?,
        };
        self.parse_bytes(bytes, delimiter)
    }

    /// Parse bytes directly.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.trim().to_string()).collect()
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            if headers.is_empty() && !self.config.has_header {
                headers = (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect();
            }

            // Padding and truncation happen in Dataset::from_rows.
            let row: Vec<Value> = record.iter().map(Value::from_raw).collect();
            rows.push(row);
        }

        if headers.is_empty() {
            return Err(TabforgeError::EmptyData("No columns found".to_string()));
        }
        if rows.is_empty() {
            return Err(TabforgeError::EmptyData("No data rows found".to_string()));
        }

        Dataset::from_rows(headers, rows)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Guess the delimiter by reading a sample with each candidate.
///
/// A candidate must split the first record into at least two fields. Among
/// those, one that gives every sampled record the same width wins, then the
/// wider split. Quoted fields are read by the csv reader itself, so quoted
/// delimiters and line breaks do not count.
fn detect_delimiter(bytes: &[u8], quote: u8) -> Result<u8> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(TabforgeError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best: Option<((bool, usize), u8)> = None;
    for &delimiter in DELIMITERS {
        let Some(widths) = sample_widths(bytes, delimiter, quote) else {
            continue;
        };
        let fields = widths[0];
        if fields < 2 {
            continue;
        }

        let score = (widths.iter().all(|&w| w == fields), fields);
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, delimiter));
        }
    }

    Ok(best.map_or(b',', |(_, delimiter)| delimiter))
}

/// Field counts of the sampled records, `None` if the sample is empty or unreadable.
fn sample_widths(bytes: &[u8], delimiter: u8, quote: u8) -> Option<Vec<usize>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(quote)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let widths = reader
        .byte_records()
        .take(SNIFF_RECORDS)
        .map(|record| record.map(|r| r.len()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .ok()?;
    (!widths.is_empty()).then_some(widths)
}

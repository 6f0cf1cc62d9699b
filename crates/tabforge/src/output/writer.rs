//! Writers that persist datasets as CSV, TSV or JSON.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::debug;

use crate::dataset::{Dataset, Value};
use crate::error::{Result, TabforgeError};

/// Output file format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }

    /// Determine the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serializes a dataset in one output format.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    format: OutputFormat,
}

impl Writer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write the dataset to a file, creating parent directories as needed.
    pub fn write_to_path(&self, data: &Dataset, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| TabforgeError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| TabforgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.write_to(data, BufWriter::new(file))?;

        debug!(
            path = %path.display(),
            format = %self.format,
            rows = data.row_count(),
            "Wrote dataset"
        );
        Ok(())
    }

    /// Write the dataset to any writer.
    pub fn write_to<W: Write>(&self, data: &Dataset, writer: W) -> Result<()> {
        match self.format {
            OutputFormat::Csv => write_delimited(data, writer, b','),
            OutputFormat::Tsv => write_delimited(data, writer, b'\t'),
            OutputFormat::Json => write_json(data, writer),
        }
    }

    /// Render the dataset to a string.
    pub fn render(&self, data: &Dataset) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(data, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| TabforgeError::UnsupportedFormat(format!("non UTF-8 output: {}", e)))
    }
}

fn write_delimited<W: Write>(data: &Dataset, writer: W, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    wtr.write_record(data.column_names())?;
    for row in data.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn write_json<W: Write>(data: &Dataset, mut writer: W) -> Result<()> {
    let names = data.column_names();
    let records: Vec<IndexMap<&str, &Value>> = data
        .rows()
        .map(|row| names.iter().copied().zip(row).collect())
        .collect();
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)?;
    Ok(())
}

//! Provenance of a loaded data file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::dataset::Dataset;

/// Where a dataset came from and what it looked like on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without directories.
    pub file: String,
    pub path: PathBuf,
    /// `sha256:` digest of the raw bytes, before any rule ran.
    pub hash: String,
    pub size_bytes: u64,
    /// Field separator the file was parsed with.
    pub delimiter: char,
    /// Data rows, header excluded.
    pub row_count: usize,
    pub column_count: usize,
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Describe `contents`, read from `path`, after they parsed into `data`.
    pub fn describe(path: &Path, contents: &[u8], delimiter: u8, data: &Dataset) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path: path.to_path_buf(),
            hash: format!("sha256:{:x}", Sha256::digest(contents)),
            size_bytes: contents.len() as u64,
            delimiter: char::from(delimiter),
            row_count: data.row_count(),
            column_count: data.column_count(),
            loaded_at: Utc::now(),
        }
    }

    /// Short name of the file's dialect.
    pub fn format(&self) -> &'static str {
        match self.delimiter {
            ',' => "csv",
            '\t' => "tsv",
            ';' => "csv-semicolon",
            '|' => "psv",
            _ => "delimited",
        }
    }
}

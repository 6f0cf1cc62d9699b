//! Main Tabforge struct and public API.

use std::path::Path;

use tracing::info;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::output::{OutputFormat, Writer};
use crate::rules::RuleSet;
use crate::transform::{EngineConfig, TransformEngine, TransformOutcome};

/// Configuration for a Tabforge pipeline.
#[derive(Debug, Clone, Default)]
pub struct TabforgeConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Transformation engine configuration.
    pub engine: EngineConfig,
}

/// Result of running a rules file over a data file.
#[derive(Debug, Clone)]
pub struct IngestResult {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    /// The rules that were applied.
    pub rules: RuleSet,
    /// Transformed dataset, change verdict and report.
    pub outcome: TransformOutcome,
}

/// Load → transform → export pipeline.
pub struct Tabforge {
    parser: Parser,
    engine: TransformEngine,
}

impl Tabforge {
    /// Create a new Tabforge instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(TabforgeConfig::default())
    }

    /// Create a Tabforge instance with custom configuration.
    pub fn with_config(config: TabforgeConfig) -> Self {
        Self {
            parser: Parser::with_config(config.parser),
            engine: TransformEngine::with_config(config.engine),
        }
    }

    /// The engine used for transformations.
    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    /// Load a delimited data file.
    pub fn load_dataset(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Load a rule document.
    pub fn load_rules(&self, path: impl AsRef<Path>) -> Result<RuleSet> {
        RuleSet::load(path)
    }

    /// Apply rules to an in-memory dataset.
    pub fn transform(&self, data: &Dataset, rules: &RuleSet) -> Result<TransformOutcome> {
        self.engine.apply(data, rules)
    }

    /// Load a data file and a rules file and transform the data.
    ///
    /// Rules are parsed before the data so a malformed document fails fast.
    pub fn ingest(
        &self,
        data_path: impl AsRef<Path>,
        rules_path: impl AsRef<Path>,
    ) -> Result<IngestResult> {
        let rules = self.load_rules(rules_path)?;
        let (data, source) = self.load_dataset(data_path)?;

        info!(
            file = %source.file,
            rows = source.row_count,
            columns = source.column_count,
            rule_columns = rules.len(),
            "Loaded data and rules"
        );

        let outcome = self.transform(&data, &rules)?;
        Ok(IngestResult {
            source,
            rules,
            outcome,
        })
    }

    /// Write a dataset to a file.
    pub fn export(
        &self,
        data: &Dataset,
        path: impl AsRef<Path>,
        format: OutputFormat,
    ) -> Result<()> {
        Writer::new(format).write_to_path(data, path)
    }
}

impl Default for Tabforge {
    fn default() -> Self {
        Self::new()
    }
}

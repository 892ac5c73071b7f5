use std::path::Path;

use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};

use crate::data::export::{Orientation, Output};
use crate::data::filter::Criteria;
use crate::data::model::Scalar;
use crate::data::preprocess::RawInput;
use crate::error::Result;
use crate::state::Registry;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Which reduction to apply after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    #[default]
    None,
    ColumnSums,
    RowSums,
    AccumulateSum,
}

/// Row restriction: keep rows whose `column` value is in `values`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    #[serde(default)]
    pub values: Vec<Scalar>,
}

/// Options for one pipeline run. Every field defaults to "no restriction".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub orientation: Orientation,
    pub metadata_filter: Criteria,
    pub row_filter: Option<RowFilter>,
    pub column_filter: Vec<String>,
    pub transform: Transform,
    /// Restore the working tables from the reference snapshot after export.
    pub reset_after: bool,
    /// Build the `"sum"` table right after preprocessing.
    pub accumulate_on_load: bool,
}

impl PipelineConfig {
    /// Read a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing config JSON")
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A registry plus the options that drive it.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub config: PipelineConfig,
    pub registry: Registry,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            registry: Registry::default(),
        }
    }

    /// Replace the registry with one built from `raw`.
    ///
    /// With `accumulate_on_load` the `"sum"` table is part of the reference
    /// snapshot, so a reset brings it back.
    pub fn load(&mut self, raw: Option<&RawInput>) {
        self.registry = Registry::preprocess(raw);
        if self.config.accumulate_on_load && self.registry.is_initialized() {
            self.registry.accumulate_sum();
            self.registry.snapshot();
        }
    }

    /// Apply the configured filters and transform to the current registry.
    pub fn apply(&mut self) -> Result<()> {
        let config = &self.config;
        let registry = &mut self.registry;

        if !config.metadata_filter.is_empty() {
            registry.filter_meta(&config.metadata_filter);
        }
        if let Some(rows) = &config.row_filter {
            registry.filter_rows(&rows.column, &rows.values)?;
        }
        registry.filter_cols(&config.column_filter);

        match config.transform {
            Transform::None => {}
            Transform::ColumnSums => registry.column_sums(),
            Transform::RowSums => registry.row_sums(),
            Transform::AccumulateSum => registry.accumulate_sum(),
        }
        Ok(())
    }

    /// Export with the configured orientation and reset policy.
    pub fn export(&mut self) -> Output {
        self.registry
            .export(self.config.orientation, self.config.reset_after)
            .clone()
    }

    /// Preprocess, filter, transform and export in one go.
    pub fn run(&mut self, raw: Option<&RawInput>) -> Result<Output> {
        info!("running pipeline ({:?})", self.config.transform);
        self.load(raw);
        self.apply()?;
        Ok(self.export())
    }
}

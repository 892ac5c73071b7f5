use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::data::export::{self, Orientation, Output};
use crate::data::filter::{self, Criteria};
use crate::data::model::{Frame, Metadata, Scalar, Table, Tables};
use crate::data::preprocess::{preprocess_table, RawInput};
use crate::data::transform::{self, SUM_TABLE};
use crate::error::{PipelineError, Result};

// ---------------------------------------------------------------------------
// Registry – the working state of one pipeline
// ---------------------------------------------------------------------------

/// Working tables, their metadata, the pristine snapshot and the last export.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Working tables (None until [`Registry::preprocess`] has run).
    tables: Option<Tables>,

    /// Metadata per table id. Always covers every key of `tables`.
    metadata: BTreeMap<String, Metadata>,

    /// Post-preprocessing copy used by [`Registry::reset`].
    reference: Tables,

    /// Result of the most recent [`Registry::export`].
    output: Output,
}

impl Registry {
    /// Build a registry from raw host input.
    ///
    /// With no input the registry stays uninitialized and a warning is logged.
    pub fn preprocess(raw: Option<&RawInput>) -> Self {
        let Some(raw) = raw else {
            warn!("{}", PipelineError::MissingInput);
            return Self::default();
        };

        let mut registry = Self::default();
        let mut tables = Tables::new();
        for (id, entry) in raw {
            let table = preprocess_table(&entry.table);
            debug!(
                "preprocessed '{id}': {} rows x {} columns",
                table.row_count(),
                table.column_count()
            );
            registry.reference.insert(id.clone(), table.clone());
            tables.insert(id.clone(), table);
            registry.metadata.insert(id.clone(), entry.meta.clone());
        }
        info!("registry initialized with {} tables", tables.len());
        registry.tables = Some(tables);
        registry
    }

    pub fn is_initialized(&self) -> bool {
        self.tables.is_some()
    }

    /// Working tables, if initialized.
    pub fn tables(&self) -> Option<&Tables> {
        self.tables.as_ref()
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.as_ref().and_then(|t| t.get(id))
    }

    /// A working table as a [`Frame`], invalid when absent.
    pub fn frame(&self, id: &str) -> Frame {
        self.table(id).cloned().into()
    }

    pub fn metadata(&self) -> &BTreeMap<String, Metadata> {
        &self.metadata
    }

    pub fn reference(&self) -> &Tables {
        &self.reference
    }

    /// The result of the last [`Registry::export`].
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Replace the working tables with `f(tables)`, or log and do nothing
    /// when uninitialized.
    fn update(&mut self, op: &str, f: impl FnOnce(Tables) -> Tables) {
        match self.tables.take() {
            Some(tables) => {
                debug!("{op} on {} tables", tables.len());
                self.tables = Some(f(tables));
            }
            None => warn!("{op} skipped: {}", PipelineError::UninitializedRegistry),
        }
    }

    /// Apply `f` to every working table.
    pub fn map_tables(&mut self, f: impl Fn(Table) -> Table) {
        self.update("map", |tables| {
            tables
                .into_iter()
                .filter_map(|(id, table)| Frame::Valid(table).map(&f).into_table().map(|t| (id, t)))
                .collect()
        });
    }

    pub fn filter_meta(&mut self, criteria: &Criteria) {
        let metadata = &self.metadata;
        match self.tables.take() {
            Some(tables) => self.tables = Some(filter::filter_meta(tables, metadata, criteria)),
            None => warn!("metadata filter skipped: {}", PipelineError::UninitializedRegistry),
        }
    }

    /// Row filter. On [`PipelineError::UnknownColumn`] the tables are left as
    /// they were and the error is returned.
    pub fn filter_rows(&mut self, column: &str, rows: &[Scalar]) -> Result<()> {
        let Some(tables) = self.tables.as_ref() else {
            warn!("row filter skipped: {}", PipelineError::UninitializedRegistry);
            return Ok(());
        };
        let filtered = filter::filter_rows(tables.clone(), column, rows)?;
        self.tables = Some(filtered);
        Ok(())
    }

    pub fn filter_cols(&mut self, columns: &[String]) {
        self.update("column filter", |tables| filter::filter_cols(tables, columns));
    }

    pub fn column_sums(&mut self) {
        self.update("column sums", |tables| transform::column_sums(&tables));
    }

    pub fn row_sums(&mut self) {
        self.update("row sums", |tables| transform::row_sums(&tables));
    }

    /// Add the running `"sum"` table and give it an empty metadata record.
    pub fn accumulate_sum(&mut self) {
        self.update("accumulate sum", transform::accumulate_sum);
        if self.tables.as_ref().is_some_and(|t| t.contains_key(SUM_TABLE)) {
            self.metadata.entry(SUM_TABLE.to_string()).or_default();
        }
    }

    /// Make the current working tables the new reference snapshot.
    pub fn snapshot(&mut self) {
        match &self.tables {
            Some(tables) => self.reference = tables.clone(),
            None => warn!("snapshot skipped: {}", PipelineError::UninitializedRegistry),
        }
    }

    /// Restore the working tables from the reference snapshot.
    pub fn reset(&mut self) {
        if self.tables.is_none() {
            warn!("reset skipped: {}", PipelineError::UninitializedRegistry);
            return;
        }
        self.tables = Some(self.reference.clone());
    }

    /// Rebuild the output from the working tables, then optionally reset.
    pub fn export(&mut self, orientation: Orientation, reset_after: bool) -> &Output {
        self.output = match &self.tables {
            Some(tables) => export::export(tables, &self.metadata, orientation),
            None => {
                warn!("export produced nothing: {}", PipelineError::UninitializedRegistry);
                Output::new()
            }
        };
        info!("exported {} tables as '{orientation}'", self.output.len());
        if reset_after {
            self.reset();
        }
        &self.output
    }
}

//! Named-table transformation pipeline.
//!
//! Raw grids come in keyed by id, get normalised into numeric [`Table`]s held
//! by a [`Registry`], are filtered and reduced, and are exported back as plain
//! JSON-shaped mappings.

pub mod data;
pub mod error;
pub mod pipeline;
pub mod state;

pub use data::export::{ExportEntry, Orientation, Output};
pub use data::model::{Frame, Metadata, Scalar, Table, Tables};
pub use data::preprocess::{RawEntry, RawInput};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineConfig, RowFilter, Transform};
pub use state::Registry;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("no raw input was provided")]
    MissingInput,

    #[error("registry has not been initialized; run preprocess first")]
    UninitializedRegistry,

    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    #[error("unknown orientation: {0}")]
    UnknownOrientation(String),

    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

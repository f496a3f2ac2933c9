use thiserror::Error;

/// Failures raised by table operations and the chart pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' holds no numeric values")]
    NotNumeric(String),

    #[error("regression needs at least {needed} complete row(s), found {found}")]
    NotEnoughRows { needed: usize, found: usize },

    #[error("normal equations are singular")]
    SingularSystem,
}

pub type PipelineResult<T> = Result<T, PipelineError>;

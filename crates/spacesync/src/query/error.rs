use thiserror::Error;

/// Errors produced by an expression evaluator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Failed to parse expression: {0}")]
    Parse(String),

    #[error("Expression evaluation failed: {0}")]
    Runtime(String),

    #[error("Expression produced no output")]
    NoOutput,

    #[error("Failed to convert data: {0}")]
    Conversion(String),
}

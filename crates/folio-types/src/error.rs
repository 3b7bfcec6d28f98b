use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid content reference: {0}")]
    InvalidContentRef(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

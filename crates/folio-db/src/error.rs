use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("invalid stored value in {column}: {message}")]
    InvalidRow {
        column: &'static str,
        message: String,
    },
}

pub type DbResult<T> = Result<T, DbError>;

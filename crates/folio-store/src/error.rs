/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The bytes are not one of the accepted image media types.
    #[error("unsupported media type: {detected}; accepted types are image/jpeg, image/png, image/webp")]
    UnsupportedMediaType { detected: String },

    /// A reference could not be mapped onto a stored file.
    #[error("invalid content reference: {0}")]
    InvalidReference(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

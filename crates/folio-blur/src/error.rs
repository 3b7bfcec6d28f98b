/// Errors from placeholder generation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode blurhash: {0}")]
    Encode(String),
}

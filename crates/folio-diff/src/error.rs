//! Error types for the diff crate.

use folio_types::ImageId;

/// Errors that can occur while planning a media reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A keep slot references an image that does not belong to the project.
    #[error("image {0} does not belong to this project")]
    UnknownImage(ImageId),

    /// The same existing image was requested at more than one position.
    #[error("image {0} is referenced by more than one slot")]
    DuplicateImage(ImageId),

    /// A pending upload was never assigned an image id.
    #[error("no image was created for slot {0}")]
    UnresolvedSlot(usize),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;

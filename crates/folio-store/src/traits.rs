use async_trait::async_trait;
use folio_types::ContentRef;

use crate::error::StoreResult;

/// Outcome of [`ContentStore::save`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedContent {
    pub reference: ContentRef,
    /// `false` when identical content was already stored and nothing was
    /// written.
    pub written: bool,
}

/// Content-addressed image store.
///
/// All implementations must satisfy these invariants:
/// - A file's name is derived from the digest of its bytes, so saving the
///   same bytes always yields the same reference.
/// - Saving content that is already present is a no-op.
/// - Content is validated before anything is written; rejected content
///   leaves the store untouched.
/// - Deleting a reference whose file is absent succeeds.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Validate and store image bytes, returning their public reference.
    async fn save(&self, data: &[u8]) -> StoreResult<SavedContent>;

    /// Read the bytes behind a reference.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    async fn read(&self, reference: &ContentRef) -> StoreResult<Option<Vec<u8>>>;

    /// Check whether the file behind a reference exists.
    async fn exists(&self, reference: &ContentRef) -> StoreResult<bool>;

    /// Remove the file behind a reference. Returns `true` if it existed.
    async fn delete(&self, reference: &ContentRef) -> StoreResult<bool>;
}

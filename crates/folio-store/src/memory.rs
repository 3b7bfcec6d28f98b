use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use folio_types::ContentRef;

use crate::error::{StoreError, StoreResult};
use crate::media::stored_file_name;
use crate::traits::{ContentStore, SavedContent};

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. Applies the same validation and naming
/// as [`crate::FsContentStore`], so references are interchangeable.
pub struct InMemoryContentStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Number of files currently stored.
    pub fn len(&self) -> usize {
        self.files.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.files.read().expect("lock poisoned").is_empty()
    }

    /// Synchronous existence check, convenient in assertions.
    pub fn contains(&self, reference: &ContentRef) -> bool {
        self.files
            .read()
            .expect("lock poisoned")
            .contains_key(reference.file_name())
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn save(&self, data: &[u8]) -> StoreResult<SavedContent> {
        let (_, file_name) = stored_file_name(data)?;
        let reference = ContentRef::from_file_name(&file_name)
            .map_err(|e| StoreError::InvalidReference(e.to_string()))?;
        let mut map = self.files.write().expect("lock poisoned");
        let written = match map.entry(file_name) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(data.to_vec());
                true
            }
        };
        Ok(SavedContent { reference, written })
    }

    async fn read(&self, reference: &ContentRef) -> StoreResult<Option<Vec<u8>>> {
        let map = self.files.read().expect("lock poisoned");
        Ok(map.get(reference.file_name()).cloned())
    }

    async fn exists(&self, reference: &ContentRef) -> StoreResult<bool> {
        Ok(self.contains(reference))
    }

    async fn delete(&self, reference: &ContentRef) -> StoreResult<bool> {
        let mut map = self.files.write().expect("lock poisoned");
        Ok(map.remove(reference.file_name()).is_some())
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("file_count", &self.len())
            .finish()
    }
}

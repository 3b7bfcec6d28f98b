use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_types::ContentRef;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::media::stored_file_name;
use crate::traits::{ContentStore, SavedContent};

/// Filesystem content store.
///
/// Files live flat in `<storage_root>/public/img/<digest>.<ext>`; that
/// directory is what the HTTP layer serves under
/// [`ContentRef::PUBLIC_PREFIX`].
#[derive(Clone, Debug)]
pub struct FsContentStore {
    image_dir: PathBuf,
}

impl FsContentStore {
    /// Create a store rooted at the configured storage location.
    pub fn new(storage_root: impl AsRef<Path>) -> Self {
        Self {
            image_dir: storage_root.as_ref().join("public").join("img"),
        }
    }

    /// Directory holding the stored files.
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Create the image directory if needed and check it is writable.
    pub async fn ensure_ready(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.image_dir).await?;
        let marker = self.image_dir.join(format!(".writable-{}", uuid::Uuid::now_v7()));
        fs::write(&marker, b"folio").await?;
        fs::remove_file(&marker).await?;
        Ok(())
    }

    fn path_for(&self, reference: &ContentRef) -> StoreResult<PathBuf> {
        // Re-parse so a reference built elsewhere cannot smuggle a path.
        let checked = ContentRef::parse(reference.as_str())
            .map_err(|e| StoreError::InvalidReference(e.to_string()))?;
        Ok(self.image_dir.join(checked.file_name()))
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> StoreResult<()> {
        fs::create_dir_all(&self.image_dir).await?;

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("content");
        let temp_path = self
            .image_dir
            .join(format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7()));

        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, path).await
        }
        .await;

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "content store: write failed");
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn save(&self, data: &[u8]) -> StoreResult<SavedContent> {
        let (media, file_name) = stored_file_name(data)?;
        let reference = ContentRef::from_file_name(&file_name)
            .map_err(|e| StoreError::InvalidReference(e.to_string()))?;
        let path = self.image_dir.join(&file_name);

        if fs::try_exists(&path).await? {
            debug!(reference = %reference, "content store: already present");
            return Ok(SavedContent { reference, written: false });
        }

        self.write_atomic(&path, data).await?;
        debug!(reference = %reference, media = media.mime(), size = data.len(), "content store: saved");
        Ok(SavedContent { reference, written: true })
    }

    async fn read(&self, reference: &ContentRef) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(reference)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, reference: &ContentRef) -> StoreResult<bool> {
        let path = self.path_for(reference)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, reference: &ContentRef) -> StoreResult<bool> {
        let path = self.path_for(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(reference = %reference, "content store: deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::fixtures::{JPEG, PNG, TEXT};

    fn store() -> (tempfile::TempDir, FsContentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContentStore::new(dir.path());
        (dir, store)
    }

    fn stored_files(store: &FsContentStore) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(store.image_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[tokio::test]
    async fn save_writes_under_public_img() {
        let (dir, store) = store();
        let r = store.save(PNG).await.unwrap().reference;

        let on_disk = dir.path().join("public").join("img").join(r.file_name());
        assert_eq!(std::fs::read(on_disk).unwrap(), PNG);
        assert!(r.as_str().starts_with("/storage/img/"));
    }

    #[tokio::test]
    async fn save_is_idempotent() {
        let (_dir, store) = store();
        let first = store.save(JPEG).await.unwrap();
        let second = store.save(JPEG).await.unwrap();
        assert_eq!(first.reference, second.reference);
        assert!(first.written);
        assert!(!second.written);
        assert_eq!(stored_files(&store).len(), 1);
    }

    #[tokio::test]
    async fn rejected_content_writes_nothing() {
        let (_dir, store) = store();
        let err = store.save(TEXT).await.unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedMediaType { .. }));
        assert!(stored_files(&store).is_empty());
    }

    #[tokio::test]
    async fn read_and_exists() {
        let (_dir, store) = store();
        let r = store.save(PNG).await.unwrap().reference;
        assert!(store.exists(&r).await.unwrap());
        assert_eq!(store.read(&r).await.unwrap().unwrap(), PNG);

        let missing = ContentRef::from_file_name("nothing.png").unwrap();
        assert!(!store.exists(&missing).await.unwrap());
        assert!(store.read(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = store();
        let r = store.save(PNG).await.unwrap().reference;
        assert!(store.delete(&r).await.unwrap());
        assert!(!store.delete(&r).await.unwrap());
        assert!(!store.exists(&r).await.unwrap());
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let (_dir, store) = store();
        store.save(PNG).await.unwrap();
        store.save(JPEG).await.unwrap();
        assert!(stored_files(&store).iter().all(|n| !n.ends_with(".tmp")));
        assert_eq!(stored_files(&store).len(), 2);
    }

    #[tokio::test]
    async fn ensure_ready_creates_directory() {
        let (_dir, store) = store();
        assert!(!store.image_dir().exists());
        store.ensure_ready().await.unwrap();
        assert!(store.image_dir().is_dir());
        assert!(stored_files(&store).is_empty());
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use folio_blur::PlaceholderGenerator;
use folio_db::{Database, MediaTransaction, NewImage};
use folio_diff::{plan_media, MediaPlan, PendingImage, ResolvedPlan};
use folio_store::ContentStore;
use folio_types::{
    ContentRef, ImageId, ProjectFields, ProjectId, ProjectImage, ProjectWithImages,
};

use crate::error::{MediaError, MediaResult};
use crate::request::{ContentCleanup, MediaRequest, ReconcileOutcome};

/// An upload that has been written to the content store but has no row yet.
#[derive(Debug)]
struct StagedImage {
    index: usize,
    name: String,
    url: ContentRef,
    placeholder: Option<String>,
    /// The content store wrote a new file for this upload.
    written: bool,
}

/// Uploads that left a new file behind.
fn fresh_writes(staged: &[StagedImage]) -> usize {
    staged.iter().filter(|image| image.written).count()
}

/// Applies desired image sets to projects.
///
/// Each operation runs in three phases:
///
/// 1. New content is written to the content store, outside any transaction.
/// 2. All row changes are applied in a single database transaction.
/// 3. After commit, content no longer referenced is deleted, best-effort.
///
/// A failure in phase 1 or 2 leaves the database untouched; files newly
/// written in phase 1 remain as unreferenced orphans. Nothing after the
/// commit turns into an error: failed deletions are reported in
/// [`ContentCleanup::failed`], and a failed read-back leaves
/// [`ReconcileOutcome::project`] empty.
pub struct MediaReconciler {
    db: Database,
    store: Arc<dyn ContentStore>,
    placeholders: Arc<dyn PlaceholderGenerator>,
}

impl MediaReconciler {
    pub fn new(
        db: Database,
        store: Arc<dyn ContentStore>,
        placeholders: Arc<dyn PlaceholderGenerator>,
    ) -> Self {
        Self {
            db,
            store,
            placeholders,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Move a project's scalar fields and image set to the requested state.
    pub async fn update_project_media(
        &self,
        id: ProjectId,
        request: MediaRequest,
    ) -> MediaResult<ReconcileOutcome> {
        let fields = request.fields.validated()?;
        if self.db.get_project(id).await?.is_none() {
            return Err(MediaError::ProjectNotFound(id));
        }

        let current = self.db.list_images(id).await?;
        let current_ids: Vec<ImageId> = current.iter().map(|image| image.id).collect();
        let plan = plan_media(&current_ids, &request.slots, request.highlight_index)?;
        debug!(
            project = %id,
            delete = plan.to_delete.len(),
            create = plan.to_create.len(),
            keep = plan.final_len() - plan.to_create.len(),
            "media plan computed"
        );

        let staged = self.stage_uploads(&plan.to_create).await?;
        let orphans = fresh_writes(&staged);

        // A negative index leaves the project flag alone.
        let highlighted = (request.highlight_index >= 0).then_some(plan.highlight.is_some());

        let mut tx = self.begin(orphans).await?;
        let applied = apply_update(&mut tx, id, &fields, highlighted, &plan, &staged).await;
        let resolved = finish(tx, applied, orphans).await?;
        info!(
            project = %id,
            created = staged.len(),
            deleted = plan.to_delete.len(),
            highlight = ?resolved.highlight,
            "project media reconciled"
        );

        let removed = current
            .into_iter()
            .filter(|image| plan.to_delete.contains(&image.id))
            .map(|image| image.url)
            .collect();
        let cleanup = self.remove_content(removed).await;

        let project = self.read_back(id, &resolved.order).await;
        Ok(ReconcileOutcome {
            id,
            project,
            cleanup,
        })
    }

    /// Create a project whose images are all new uploads.
    pub async fn create_project(&self, request: MediaRequest) -> MediaResult<ReconcileOutcome> {
        let fields = request.fields.validated()?;
        if request.slots.is_empty() {
            return Err(MediaError::Validation(
                "a project needs at least one image".into(),
            ));
        }
        if let Some(slot) = request.slots.iter().find(|slot| !slot.is_new()) {
            return Err(MediaError::Validation(format!(
                "slot {} refers to an existing image, but the project is new",
                slot.index
            )));
        }

        let plan = plan_media(&[], &request.slots, request.highlight_index)?;
        let staged = self.stage_uploads(&plan.to_create).await?;
        let orphans = fresh_writes(&staged);

        let mut tx = self.begin(orphans).await?;
        let applied = apply_create(&mut tx, &fields, plan.highlight.is_some(), &plan, &staged).await;
        let (id, resolved) = finish(tx, applied, orphans).await?;
        info!(
            project = %id,
            created = staged.len(),
            highlight = ?resolved.highlight,
            "project created"
        );

        let project = self.read_back(id, &resolved.order).await;
        Ok(ReconcileOutcome {
            id,
            project,
            cleanup: ContentCleanup::default(),
        })
    }

    /// Delete a project with its image rows, then its unshared content.
    pub async fn delete_project(&self, id: ProjectId) -> MediaResult<ContentCleanup> {
        if self.db.get_project(id).await?.is_none() {
            return Err(MediaError::ProjectNotFound(id));
        }

        let mut tx = self.begin(0).await?;
        let applied = delete_rows(&mut tx, id).await;
        let urls = finish(tx, applied, 0).await?;
        info!(project = %id, images = urls.len(), "project deleted");

        Ok(self.remove_content(urls).await)
    }

    async fn begin(&self, orphans: usize) -> MediaResult<MediaTransaction> {
        self.db.begin().await.map_err(|e| {
            warn!(error = %e, orphaned = orphans, "failed to open transaction");
            MediaError::from(e).with_orphans(orphans)
        })
    }

    /// Store every pending upload in ascending slot order. The first failure
    /// aborts; files written before it stay behind.
    async fn stage_uploads(&self, pending: &[PendingImage]) -> MediaResult<Vec<StagedImage>> {
        let mut staged = Vec::with_capacity(pending.len());
        for item in pending {
            let upload = &item.upload;
            let saved = self.store.save(&upload.data).await.map_err(|e| {
                let orphans = fresh_writes(&staged);
                if orphans > 0 {
                    warn!(orphaned = orphans, "aborting with stored uploads left behind");
                }
                MediaError::from_store(&upload.filename, e).with_orphans(orphans)
            })?;
            let url = saved.reference;
            debug!(
                index = item.index,
                %url,
                written = saved.written,
                size = upload.data.len(),
                "upload stored"
            );

            let placeholder = self.placeholder_for(&url).await;
            staged.push(StagedImage {
                index: item.index,
                name: display_name(&upload.filename, &url),
                url,
                placeholder,
                written: saved.written,
            });
        }
        Ok(staged)
    }

    /// Best-effort placeholder for stored content.
    async fn placeholder_for(&self, url: &ContentRef) -> Option<String> {
        let data = match self.store.read(url).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                warn!(%url, "stored image missing, skipping placeholder");
                return None;
            }
            Err(e) => {
                warn!(%url, error = %e, "failed to read stored image, skipping placeholder");
                return None;
            }
        };

        let generator = Arc::clone(&self.placeholders);
        match tokio::task::spawn_blocking(move || generator.generate(&data)).await {
            Ok(Ok(placeholder)) => Some(placeholder),
            Ok(Err(e)) => {
                warn!(%url, error = %e, "placeholder generation failed");
                None
            }
            Err(e) => {
                warn!(%url, error = %e, "placeholder task failed");
                None
            }
        }
    }

    /// Delete content whose rows are gone. Each distinct reference is tried
    /// once; references still used by any image row are kept.
    async fn remove_content(&self, urls: Vec<ContentRef>) -> ContentCleanup {
        let mut cleanup = ContentCleanup::default();
        let unique: BTreeSet<ContentRef> = urls.into_iter().collect();

        for url in unique {
            match self.db.count_images_with_url(&url).await {
                Ok(0) => {}
                Ok(references) => {
                    debug!(%url, references, "content still referenced, keeping file");
                    cleanup.retained.push(url);
                    continue;
                }
                Err(e) => {
                    warn!(%url, error = %e, "could not count references, keeping file");
                    cleanup.failed.push(url);
                    continue;
                }
            }

            match self.store.delete(&url).await {
                Ok(existed) => {
                    debug!(%url, existed, "content deleted");
                    cleanup.deleted.push(url);
                }
                Err(e) => {
                    warn!(%url, error = %e, "failed to delete content, file left behind");
                    cleanup.failed.push(url);
                }
            }
        }
        cleanup
    }

    /// Load the committed project. Failures are logged; the change itself
    /// already stands.
    async fn read_back(&self, id: ProjectId, order: &[ImageId]) -> Option<ProjectWithImages> {
        match self.db.get_project_with_images(id).await {
            Ok(Some(mut found)) => {
                found.images = arrange(found.images, order);
                Some(found)
            }
            Ok(None) => {
                warn!(project = %id, "committed project is gone before read-back");
                None
            }
            Err(e) => {
                warn!(project = %id, error = %e, "failed to read back committed project");
                None
            }
        }
    }
}

async fn apply_update(
    tx: &mut MediaTransaction,
    id: ProjectId,
    fields: &ProjectFields,
    highlighted: Option<bool>,
    plan: &MediaPlan,
    staged: &[StagedImage],
) -> MediaResult<ResolvedPlan> {
    if !tx.update_project(id, fields, highlighted).await? {
        return Err(MediaError::ProjectNotFound(id));
    }
    for image in &plan.to_delete {
        tx.delete_image(id, *image).await?;
    }
    let created = insert_staged(tx, id, staged).await?;
    let resolved = plan.resolve(&created)?;
    tx.apply_highlight(id, resolved.highlight).await?;
    Ok(resolved)
}

async fn apply_create(
    tx: &mut MediaTransaction,
    fields: &ProjectFields,
    highlighted: bool,
    plan: &MediaPlan,
    staged: &[StagedImage],
) -> MediaResult<(ProjectId, ResolvedPlan)> {
    let id = tx.insert_project(fields, highlighted).await?;
    let created = insert_staged(tx, id, staged).await?;
    let resolved = plan.resolve(&created)?;
    tx.apply_highlight(id, resolved.highlight).await?;
    Ok((id, resolved))
}

async fn delete_rows(tx: &mut MediaTransaction, id: ProjectId) -> MediaResult<Vec<ContentRef>> {
    let urls = tx.image_urls(id).await?;
    if !tx.delete_project(id).await? {
        return Err(MediaError::ProjectNotFound(id));
    }
    Ok(urls)
}

async fn insert_staged(
    tx: &mut MediaTransaction,
    project: ProjectId,
    staged: &[StagedImage],
) -> MediaResult<BTreeMap<usize, ImageId>> {
    let mut created = BTreeMap::new();
    for image in staged {
        let id = tx
            .insert_image(&NewImage {
                project_id: project,
                name: image.name.clone(),
                url: image.url.clone(),
                placeholder: image.placeholder.clone(),
            })
            .await?;
        created.insert(image.index, id);
    }
    Ok(created)
}

/// Commit on success, roll back on failure.
async fn finish<T>(tx: MediaTransaction, applied: MediaResult<T>, orphans: usize) -> MediaResult<T> {
    match applied {
        Ok(value) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(e) => {
                warn!(error = %e, orphaned = orphans, "commit failed");
                Err(MediaError::from(e).with_orphans(orphans))
            }
        },
        Err(err) => {
            if let Err(e) = tx.rollback().await {
                warn!(error = %e, "explicit rollback failed");
            }
            warn!(error = %err, orphaned = orphans, "transaction rolled back");
            Err(err.with_orphans(orphans))
        }
    }
}

/// Order images as listed in `order`; any others follow by ascending id.
fn arrange(images: Vec<ProjectImage>, order: &[ImageId]) -> Vec<ProjectImage> {
    let mut by_id: BTreeMap<ImageId, ProjectImage> =
        images.into_iter().map(|image| (image.id, image)).collect();
    let mut arranged: Vec<ProjectImage> = order.iter().filter_map(|id| by_id.remove(id)).collect();
    arranged.extend(by_id.into_values());
    arranged
}

fn display_name(filename: &str, url: &ContentRef) -> String {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        url.file_name().to_string()
    } else {
        trimmed.to_string()
    }
}

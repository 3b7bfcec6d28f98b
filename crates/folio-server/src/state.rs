use std::path::PathBuf;
use std::sync::Arc;

use folio_db::Database;
use folio_media::MediaReconciler;

use crate::auth::AuthProvider;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<MediaReconciler>,
    pub auth: Arc<dyn AuthProvider>,
    /// Directory served under `/storage/img`.
    pub image_dir: PathBuf,
    pub page_size: u32,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn db(&self) -> &Database {
        self.reconciler.database()
    }
}

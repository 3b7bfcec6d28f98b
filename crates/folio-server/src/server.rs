use std::sync::Arc;

use tokio::net::TcpListener;

use folio_blur::BlurHashGenerator;
use folio_db::Database;
use folio_media::MediaReconciler;
use folio_store::FsContentStore;

use crate::auth::StaticTokenAuth;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Folio HTTP server.
pub struct FolioServer {
    config: ServerConfig,
}

impl FolioServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Connect the database, apply the schema and prepare the image directory.
    pub async fn prepare(&self) -> ServerResult<AppState> {
        let db = Database::connect(&self.config.database_url).await?;
        db.migrate().await?;

        let store = FsContentStore::new(&self.config.storage_root);
        store.ensure_ready().await?;
        let image_dir = store.image_dir().to_path_buf();

        if self.config.admin_token.is_none() {
            tracing::warn!("no admin token configured; the admin API will reject every request");
        }

        let reconciler = MediaReconciler::new(
            db,
            Arc::new(store),
            Arc::new(BlurHashGenerator::default()),
        );
        Ok(AppState {
            reconciler: Arc::new(reconciler),
            auth: Arc::new(StaticTokenAuth::new(self.config.admin_token.clone())),
            image_dir,
            page_size: self.config.page_size,
            max_upload_bytes: self.config.max_upload_bytes,
        })
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let state = self.prepare().await?;
        let app = build_router(state);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            storage = %self.config.storage_root.display(),
            "Folio server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = FolioServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[tokio::test]
    async fn prepare_creates_schema_and_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            database_url: format!("sqlite://{}", dir.path().join("folio.db").display()),
            storage_root: dir.path().join("storage"),
            ..ServerConfig::default()
        };
        let state = FolioServer::new(config).prepare().await.unwrap();
        assert!(state.image_dir.ends_with("public/img"));
        assert!(state.image_dir.is_dir());
        assert_eq!(state.db().list_projects(1, 10).await.unwrap().total, 0);
    }
}

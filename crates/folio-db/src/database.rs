use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use folio_types::{
    ContentRef, ImageId, Page, Project, ProjectId, ProjectImage, ProjectWithImages,
};

use crate::error::DbResult;
use crate::rows::{image_from_row, project_from_row, IMAGE_COLUMNS, PROJECT_COLUMNS};
use crate::schema;
use crate::tx::MediaTransaction;

/// Handle to the project database. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `url`, e.g.
    /// `sqlite://folio.db`. Does not run migrations.
    pub async fn connect(url: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        tracing::debug!(%url, "database connected");
        Ok(Self { pool })
    }

    /// A private in-memory database with the schema applied.
    ///
    /// Backed by a single connection that is never recycled, so the data
    /// lives as long as the handle. Holding a [`MediaTransaction`] blocks
    /// every other query on it.
    pub async fn connect_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> DbResult<()> {
        schema::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin(&self) -> DbResult<MediaTransaction> {
        Ok(MediaTransaction::new(self.pool.begin().await?))
    }

    pub async fn get_project(&self, id: ProjectId) -> DbResult<Option<Project>> {
        let row = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(project_from_row).transpose()
    }

    /// Project plus its images in ascending id order.
    pub async fn get_project_with_images(
        &self,
        id: ProjectId,
    ) -> DbResult<Option<ProjectWithImages>> {
        let Some(project) = self.get_project(id).await? else {
            return Ok(None);
        };
        let images = self.list_images(id).await?;
        Ok(Some(ProjectWithImages { project, images }))
    }

    /// Images of `project` in ascending id order.
    pub async fn list_images(&self, project: ProjectId) -> DbResult<Vec<ProjectImage>> {
        let rows = sqlx::query(&format!(
            "SELECT {IMAGE_COLUMNS} FROM project_images WHERE project_id = ? ORDER BY id"
        ))
        .bind(project.get())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(image_from_row).collect()
    }

    pub async fn get_image(&self, id: ImageId) -> DbResult<Option<ProjectImage>> {
        let row = sqlx::query(&format!("SELECT {IMAGE_COLUMNS} FROM project_images WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(image_from_row).transpose()
    }

    /// One page of projects, newest first, each with its images.
    ///
    /// Pages are 1-based; `0` is treated as `1`.
    pub async fn list_projects(
        &self,
        page: u32,
        per_page: u32,
    ) -> DbResult<Page<ProjectWithImages>> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM projects")
            .fetch_one(&self.pool)
            .await?
            .try_get("total")?;

        let rows = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id DESC LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in &rows {
            let project = project_from_row(row)?;
            let images = self.list_images(project.id).await?;
            data.push(ProjectWithImages { project, images });
        }

        Ok(Page {
            data,
            page,
            per_page,
            total,
        })
    }

    /// Flip the project's `highlighted` flag. `None` if the project is absent.
    pub async fn toggle_highlight(&self, id: ProjectId) -> DbResult<Option<Project>> {
        let result = sqlx::query(
            "UPDATE projects SET highlighted = 1 - highlighted, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_project(id).await
    }

    /// Number of image rows, across all projects, referencing `url`.
    pub async fn count_images_with_url(&self, url: &ContentRef) -> DbResult<i64> {
        let count = sqlx::query("SELECT COUNT(*) AS n FROM project_images WHERE url = ?")
            .bind(url.as_str())
            .fetch_one(&self.pool)
            .await?
            .try_get("n")?;
        Ok(count)
    }
}

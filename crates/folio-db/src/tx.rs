use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};

use folio_types::{ContentRef, ImageId, ImageOrder, ProjectFields, ProjectId};

use crate::error::{DbError, DbResult};
use crate::rows::NewImage;

/// An open transaction scoped to one project mutation.
///
/// Dropping without [`MediaTransaction::commit`] rolls back.
pub struct MediaTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl MediaTransaction {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Insert a project with status `1` and return its id.
    pub async fn insert_project(
        &mut self,
        fields: &ProjectFields,
        highlighted: bool,
    ) -> DbResult<ProjectId> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO projects (status, name, category, client, "order", highlighted, created_at, updated_at)
               VALUES (1, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(&fields.client)
        .bind(fields.order)
        .bind(highlighted)
        .bind(now)
        .bind(now)
        .execute(&mut *self.tx)
        .await?;
        Ok(ProjectId::new(result.last_insert_rowid()))
    }

    /// Overwrite the scalar fields. `highlighted: None` leaves the flag as is.
    ///
    /// Returns `false` if the project does not exist.
    pub async fn update_project(
        &mut self,
        id: ProjectId,
        fields: &ProjectFields,
        highlighted: Option<bool>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"UPDATE projects
               SET name = ?, category = ?, client = ?, "order" = ?,
                   highlighted = COALESCE(?, highlighted), updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&fields.name)
        .bind(&fields.category)
        .bind(&fields.client)
        .bind(fields.order)
        .bind(highlighted)
        .bind(Utc::now())
        .bind(id.get())
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Delete one image row of `project`. Returns `false` if no row matched.
    pub async fn delete_image(&mut self, project: ProjectId, image: ImageId) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM project_images WHERE id = ? AND project_id = ?")
            .bind(image.get())
            .bind(project.get())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Insert an image row with order `0`.
    pub async fn insert_image(&mut self, image: &NewImage) -> DbResult<ImageId> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO project_images (project_id, name, url, "order", blur_hash, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(image.project_id.get())
        .bind(&image.name)
        .bind(image.url.as_str())
        .bind(ImageOrder::Regular.value())
        .bind(&image.placeholder)
        .bind(now)
        .bind(now)
        .execute(&mut *self.tx)
        .await?;
        Ok(ImageId::new(result.last_insert_rowid()))
    }

    /// Rewrite the highlight marker of every image of `project`: `1` for
    /// `highlight`, `0` for all others.
    ///
    /// Fails if `highlight` is not an image of `project`.
    pub async fn apply_highlight(
        &mut self,
        project: ProjectId,
        highlight: Option<ImageId>,
    ) -> DbResult<()> {
        let now = Utc::now();
        sqlx::query(
            r#"UPDATE project_images SET "order" = ?, updated_at = ?
               WHERE project_id = ? AND "order" <> ?"#,
        )
        .bind(ImageOrder::Regular.value())
        .bind(now)
        .bind(project.get())
        .bind(ImageOrder::Regular.value())
        .execute(&mut *self.tx)
        .await?;

        if let Some(image) = highlight {
            let result = sqlx::query(
                r#"UPDATE project_images SET "order" = ?, updated_at = ?
                   WHERE id = ? AND project_id = ?"#,
            )
            .bind(ImageOrder::Highlighted.value())
            .bind(now)
            .bind(image.get())
            .bind(project.get())
            .execute(&mut *self.tx)
            .await?;
            if result.rows_affected() != 1 {
                return Err(DbError::InvalidRow {
                    column: "project_images.id",
                    message: format!("highlight target {image} is not an image of project {project}"),
                });
            }
        }
        Ok(())
    }

    /// Content references of every image of `project`.
    pub async fn image_urls(&mut self, project: ProjectId) -> DbResult<Vec<ContentRef>> {
        let rows = sqlx::query("SELECT url FROM project_images WHERE project_id = ? ORDER BY id")
            .bind(project.get())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter()
            .map(|row| -> DbResult<ContentRef> {
                let url: String = row.try_get("url")?;
                ContentRef::parse(&url).map_err(|e| DbError::InvalidRow {
                    column: "project_images.url",
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Delete the project; its images go with it. Returns `false` if absent.
    pub async fn delete_project(&mut self, id: ProjectId) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id.get())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

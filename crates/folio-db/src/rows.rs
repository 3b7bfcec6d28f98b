//! Row mapping between SQLite rows and `folio-types` values.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use folio_types::{ContentRef, ImageId, Project, ProjectId, ProjectImage};

use crate::error::{DbError, DbResult};

pub(crate) const PROJECT_COLUMNS: &str =
    r#"id, status, name, category, client, "order", highlighted, created_at, updated_at"#;

pub(crate) const IMAGE_COLUMNS: &str =
    r#"id, project_id, name, url, "order", blur_hash, created_at, updated_at"#;

/// Values for an image row about to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewImage {
    pub project_id: ProjectId,
    pub name: String,
    pub url: ContentRef,
    pub placeholder: Option<String>,
}

pub(crate) fn project_from_row(row: &SqliteRow) -> DbResult<Project> {
    Ok(Project {
        id: ProjectId::new(row.try_get("id")?),
        status: row.try_get("status")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        client: row.try_get("client")?,
        order: row.try_get("order")?,
        highlighted: row.try_get("highlighted")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

pub(crate) fn image_from_row(row: &SqliteRow) -> DbResult<ProjectImage> {
    let url: String = row.try_get("url")?;
    let url = ContentRef::parse(&url).map_err(|e| DbError::InvalidRow {
        column: "project_images.url",
        message: e.to_string(),
    })?;
    Ok(ProjectImage {
        id: ImageId::new(row.try_get("id")?),
        project_id: ProjectId::new(row.try_get("project_id")?),
        name: row.try_get("name")?,
        url,
        order: row.try_get("order")?,
        placeholder: row.try_get("blur_hash")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

//! Schema bootstrap. Every statement is idempotent.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "projects table",
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            status INTEGER NOT NULL DEFAULT 1,
            name TEXT NOT NULL,
            category TEXT,
            client TEXT,
            "order" INTEGER NOT NULL DEFAULT 0,
            highlighted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "project_images table",
        r#"
        CREATE TABLE IF NOT EXISTS project_images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            "order" INTEGER NOT NULL DEFAULT 0,
            blur_hash TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "project_images project index",
        "CREATE INDEX IF NOT EXISTS idx_project_images_project ON project_images(project_id)",
    ),
    (
        "project_images url index",
        "CREATE INDEX IF NOT EXISTS idx_project_images_url ON project_images(url)",
    ),
];

/// Create all tables and indexes that do not exist yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    for (name, sql) in MIGRATIONS {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| DbError::Migration(format!("failed to create {name}: {e}")))?;
    }
    tracing::debug!(statements = MIGRATIONS.len(), "schema up to date");
    Ok(())
}

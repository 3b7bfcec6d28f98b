//! Project admin endpoints.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use folio_media::{ContentCleanup, MediaRequest, ReconcileOutcome};
use folio_types::{ImageId, Page, Project, ProjectId, ProjectImage, ProjectWithImages};

use crate::error::{ServerError, ServerResult};
use crate::multipart::read_form;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Kept as text so that junk values fall back to the first page.
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.clamp(1, i64::from(u32::MAX)) as u32)
            .unwrap_or(1)
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: ProjectId,
    pub deleted_content: usize,
    pub retained_content: usize,
    pub failed_content: usize,
}

impl DeleteResponse {
    fn new(id: ProjectId, cleanup: &ContentCleanup) -> Self {
        Self {
            id,
            deleted_content: cleanup.deleted.len(),
            retained_content: cleanup.retained.len(),
            failed_content: cleanup.failed.len(),
        }
    }
}

/// Saved changes whose project could not be reloaded.
#[derive(Debug, Serialize)]
pub struct CommittedResponse {
    pub id: ProjectId,
    pub message: &'static str,
}

/// Respond to a committed create or update.
fn committed(status: StatusCode, outcome: ReconcileOutcome) -> Response {
    match outcome.project {
        Some(project) => (status, Json(project)).into_response(),
        None => {
            let body = CommittedResponse {
                id: outcome.id,
                message: "changes saved, but the project could not be reloaded",
            };
            (status, Json(body)).into_response()
        }
    }
}

fn project_id(raw: &str) -> ServerResult<ProjectId> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid project id: {raw}")))
}

fn image_id(raw: &str) -> ServerResult<ImageId> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid image id: {raw}")))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ServerResult<Json<Page<ProjectWithImages>>> {
    let page = state.db().list_projects(query.page(), state.page_size).await?;
    Ok(Json(page))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<ProjectWithImages>> {
    let id = project_id(&id)?;
    state
        .db()
        .get_project_with_images(id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("project not found: {id}")))
}

pub async fn create_project(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ServerResult<Response> {
    let form = read_form(multipart).await?;
    let outcome = state
        .reconciler
        .create_project(MediaRequest::from_form(&form))
        .await?;
    Ok(committed(StatusCode::CREATED, outcome))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ServerResult<Response> {
    let id = project_id(&id)?;
    let form = read_form(multipart).await?;
    let outcome = state
        .reconciler
        .update_project_media(id, MediaRequest::from_form(&form))
        .await?;
    Ok(committed(StatusCode::OK, outcome))
}

pub async fn toggle_highlight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Project>> {
    let id = project_id(&id)?;
    state
        .db()
        .toggle_highlight(id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("project not found: {id}")))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<DeleteResponse>> {
    let id = project_id(&id)?;
    let cleanup = state.reconciler.delete_project(id).await?;
    Ok(Json(DeleteResponse::new(id, &cleanup)))
}

pub async fn get_project_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<ProjectImage>> {
    let id = image_id(&id)?;
    state
        .db()
        .get_image(id)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("image not found: {id}")))
}

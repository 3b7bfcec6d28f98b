use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handler, projects};

/// Build the axum router with all Folio endpoints.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/:id/highlight/toggle", put(projects::toggle_highlight))
        .route("/project-images/:id", get(projects::get_project_image))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    Router::new()
        .route("/ping", get(handler::ping_handler))
        .route("/v1/health", get(handler::health_handler))
        .nest("/api", api)
        .nest_service("/storage/img", ServeDir::new(&state.image_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

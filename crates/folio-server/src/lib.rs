//! HTTP server for Folio.
//!
//! Serves the project admin API under `/api`, stored images under
//! `/storage/img`, and liveness checks at `/ping` and `/v1/health`.
//! Every `/api` request requires a bearer admin token.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod multipart;
pub mod projects;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AuthProvider, Credentials, Identity, StaticTokenAuth};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::FolioServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use folio_blur::BlurHashGenerator;
    use folio_db::Database;
    use folio_media::MediaReconciler;
    use folio_store::FsContentStore;
    use image::{ImageFormat, Rgb, RgbImage};
    use serde_json::Value;
    use tower::util::ServiceExt;

    const TOKEN: &str = "test-token";
    const BOUNDARY: &str = "folio-test-boundary";

    async fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsContentStore::new(dir.path());
        store.ensure_ready().await.unwrap();
        let image_dir = store.image_dir().to_path_buf();
        let db = Database::connect_in_memory().await.unwrap();
        let reconciler =
            MediaReconciler::new(db, Arc::new(store), Arc::new(BlurHashGenerator::default()));
        let state = AppState {
            reconciler: Arc::new(reconciler),
            auth: Arc::new(StaticTokenAuth::new(Some(TOKEN.into()))),
            image_dir,
            page_size: 10,
            max_upload_bytes: 1024 * 1024,
        };
        (router::build_router(state), dir)
    }

    fn png(shade: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(5, 5, Rgb([shade, 10, 10]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, Vec<u8>),
    }

    fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(name, filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(&data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn form_request(method: &str, uri: &str, parts: Vec<Part<'_>>, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(multipart_body(parts))).unwrap()
    }

    fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn create_two(app: &Router) -> Value {
        let (status, body) = send(
            app,
            form_request(
                "POST",
                "/api/projects",
                vec![
                    Part::Text("name", "Harbour House"),
                    Part::Text("client", "Port Authority"),
                    Part::File("files[]", "front.png", png(1)),
                    Part::File("files[]", "back.png", png(2)),
                    Part::Text("highlightImageIndex", "0"),
                ],
                Some(TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    #[tokio::test]
    async fn liveness_endpoints() {
        let (app, _dir) = test_app().await;
        let (status, body) = send(&app, request("GET", "/ping", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "pong");

        let (status, body) = send(&app, request("GET", "/v1/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn api_requires_token() {
        let (app, _dir) = test_app().await;
        let parts = || vec![Part::Text("name", "X"), Part::File("files[0]", "a.png", png(1))];

        let (status, body) = send(&app, form_request("POST", "/api/projects", parts(), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].as_str().unwrap().contains("admin token"));

        let (status, _) =
            send(&app, form_request("POST", "/api/projects", parts(), Some("wrong"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, request("GET", "/api/projects", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, request("GET", "/api/projects", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn create_then_read() {
        let (app, _dir) = test_app().await;
        let created = create_two(&app).await;
        assert_eq!(created["name"], "Harbour House");
        assert_eq!(created["highlighted"], true);
        let images = created["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["order"], 1);
        assert_eq!(images[1]["order"], 0);
        assert!(images[0]["blur_hash"].as_str().unwrap().starts_with("data:text/plain;base64,"));

        let id = created["id"].as_i64().unwrap();
        let (status, body) = send(&app, request("GET", &format!("/api/projects/{id}"), Some(TOKEN))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["client"], "Port Authority");

        let image_id = images[1]["id"].as_i64().unwrap();
        let (status, body) =
            send(&app, request("GET", &format!("/api/project-images/{image_id}"), Some(TOKEN))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "back.png");

        let (status, body) = send(&app, request("GET", "/api/projects?page=0", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["per_page"], 10);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stored_images_are_served() {
        let (app, _dir) = test_app().await;
        let created = create_two(&app).await;
        let url = created["images"][0]["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/storage/img/"));

        let response = app.clone().oneshot(request("GET", &url, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), png(1).as_slice());
    }

    #[tokio::test]
    async fn update_replaces_and_highlights() {
        let (app, _dir) = test_app().await;
        let created = create_two(&app).await;
        let id = created["id"].as_i64().unwrap();
        let keep = created["images"][0]["id"].as_i64().unwrap().to_string();
        let removed_url = created["images"][1]["url"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            form_request(
                "PUT",
                &format!("/api/projects/{id}"),
                vec![
                    Part::Text("name", "Harbour House"),
                    Part::Text("files[0][id]", &keep),
                    Part::File("files[1]", "side.png", png(3)),
                    Part::Text("highlightImageIndex", "1"),
                ],
                Some(TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let images = body["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["id"].as_i64().unwrap().to_string(), keep);
        assert_eq!(images[0]["order"], 0);
        assert_eq!(images[1]["name"], "side.png");
        assert_eq!(images[1]["order"], 1);

        let response = app.clone().oneshot(request("GET", &removed_url, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unsupported_upload_is_bad_request() {
        let (app, _dir) = test_app().await;
        let created = create_two(&app).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            form_request(
                "PUT",
                &format!("/api/projects/{id}"),
                vec![
                    Part::Text("name", "Harbour House"),
                    Part::File("files[0]", "notes.txt", b"just text".to_vec()),
                ],
                Some(TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("notes.txt"));

        let (_, after) = send(&app, request("GET", &format!("/api/projects/{id}"), Some(TOKEN))).await;
        assert_eq!(after["images"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_and_malformed_ids() {
        let (app, _dir) = test_app().await;
        let (status, body) = send(&app, request("GET", "/api/projects/999", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, _) = send(&app, request("GET", "/api/projects/abc", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, request("GET", "/api/project-images/5", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, request("DELETE", "/api/projects/999", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            form_request("PUT", "/api/projects/999", vec![Part::Text("name", "x")], Some(TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_validation() {
        let (app, _dir) = test_app().await;
        let (status, body) = send(
            &app,
            form_request("POST", "/api/projects", vec![Part::Text("name", "No Images")], Some(TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("at least one image"));

        let (status, _) = send(
            &app,
            form_request(
                "POST",
                "/api/projects",
                vec![Part::File("files[0]", "a.png", png(1))],
                Some(TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn toggle_and_delete() {
        let (app, _dir) = test_app().await;
        let created = create_two(&app).await;
        let id = created["id"].as_i64().unwrap();
        let url = created["images"][0]["url"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            request("PUT", &format!("/api/projects/{id}/highlight/toggle"), Some(TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["highlighted"], false);

        let (status, body) =
            send(&app, request("DELETE", &format!("/api/projects/{id}"), Some(TOKEN))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted_content"], 2);

        let (status, _) = send(&app, request("GET", &format!("/api/projects/{id}"), Some(TOKEN))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let response = app.clone().oneshot(request("GET", &url, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

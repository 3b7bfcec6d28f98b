use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub is_admin: bool,
}

impl Identity {
    pub fn anonymous() -> Self { Self { name: "anonymous".into(), is_admin: false } }
    pub fn admin(name: impl Into<String>) -> Self { Self { name: name.into(), is_admin: true } }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Read an `Authorization: Bearer <token>` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| Self::Bearer(token.trim().to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

/// Decides who may use the admin API.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
    async fn authorize(&self, identity: &Identity) -> ServerResult<bool>;
}

/// Single shared admin token, required for every action.
pub struct StaticTokenAuth {
    token: Option<String>,
}

impl StaticTokenAuth {
    pub fn new(token: Option<String>) -> Self {
        Self { token: token.filter(|t| !t.is_empty()) }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Anonymous => Ok(Identity::anonymous()),
            Credentials::Bearer(presented) => match &self.token {
                Some(expected) if tokens_match(expected, presented) => Ok(Identity::admin("admin")),
                _ => Err(ServerError::AuthFailed("invalid token".into())),
            },
        }
    }

    async fn authorize(&self, identity: &Identity) -> ServerResult<bool> {
        Ok(identity.is_admin)
    }
}

fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len()
        && expected
            .bytes()
            .zip(presented.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Authenticate the caller and check it may use the admin API.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let credentials = Credentials::from_headers(request.headers());
    let identity = state.auth.authenticate(&credentials).await?;
    if !state.auth.authorize(&identity).await? {
        return Err(ServerError::AuthorizationDenied);
    }
    tracing::debug!(user = %identity.name, method = %request.method(), "request authorized");
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn credentials_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(Credentials::from_headers(&headers), Credentials::Anonymous);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(Credentials::from_headers(&headers), Credentials::Bearer("abc".into()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(Credentials::from_headers(&headers), Credentials::Anonymous);
    }

    #[tokio::test]
    async fn static_token() {
        let auth = StaticTokenAuth::new(Some("s3cret".into()));

        let admin = auth.authenticate(&Credentials::Bearer("s3cret".into())).await.unwrap();
        assert!(admin.is_admin);
        assert!(auth.authorize(&admin).await.unwrap());

        let anon = auth.authenticate(&Credentials::Anonymous).await.unwrap();
        assert!(!anon.is_admin);
        assert!(!auth.authorize(&anon).await.unwrap());

        assert!(auth.authenticate(&Credentials::Bearer("s3creT".into())).await.is_err());
        assert!(auth.authenticate(&Credentials::Bearer("short".into())).await.is_err());
    }

    #[tokio::test]
    async fn no_token_configured_rejects_bearers() {
        let auth = StaticTokenAuth::new(Some(String::new()));
        assert!(auth.authenticate(&Credentials::Bearer(String::new())).await.is_err());
    }
}

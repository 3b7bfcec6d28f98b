use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const ENV_BIND_ADDR: &str = "FOLIO_BIND_ADDR";
pub const ENV_DATABASE_URL: &str = "FOLIO_DATABASE_URL";
pub const ENV_STORAGE_ROOT: &str = "FOLIO_STORAGE_ROOT";
pub const ENV_ADMIN_TOKEN: &str = "FOLIO_ADMIN_TOKEN";

/// Server settings: defaults, then an optional TOML file, then environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Images are written under `<storage_root>/public/img`.
    pub storage_root: PathBuf,
    /// Bearer token required for every `/api` request. Without one, the
    /// admin API rejects all callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
    pub max_upload_bytes: usize,
    pub page_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_url: "sqlite://folio.db".into(),
            storage_root: PathBuf::from("./storage"),
            admin_token: None,
            max_upload_bytes: 32 * 1024 * 1024,
            page_size: 10,
        }
    }
}

impl ServerConfig {
    /// Resolve the effective configuration from an optional file and the
    /// process environment.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Parse TOML; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ServerResult<()> {
        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            self.bind_addr = addr
                .parse()
                .map_err(|e| ServerError::Config(format!("{ENV_BIND_ADDR}={addr}: {e}")))?;
        }
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.database_url = url;
        }
        if let Some(root) = lookup(ENV_STORAGE_ROOT) {
            self.storage_root = PathBuf::from(root);
        }
        if let Some(token) = lookup(ENV_ADMIN_TOKEN) {
            self.admin_token = Some(token).filter(|t| !t.is_empty());
        }
        Ok(())
    }

    /// Render as TOML with the admin token masked.
    pub fn to_redacted_toml(&self) -> ServerResult<String> {
        let mut shown = self.clone();
        if shown.admin_token.is_some() {
            shown.admin_token = Some("<redacted>".into());
        }
        toml::to_string_pretty(&shown).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.database_url, "sqlite://folio.db");
        assert_eq!(c.storage_root, PathBuf::from("./storage"));
        assert_eq!(c.max_upload_bytes, 32 * 1024 * 1024);
        assert_eq!(c.page_size, 10);
        assert!(c.admin_token.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            page_size = 25
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.page_size, 25);
        assert_eq!(c.database_url, "sqlite://folio.db");
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("page_size = \"many\"").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BIND_ADDR, "10.0.0.1:7000"),
            (ENV_DATABASE_URL, "sqlite::memory:"),
            (ENV_STORAGE_ROOT, "/srv/folio"),
            (ENV_ADMIN_TOKEN, "s3cret"),
        ]);
        let mut c = ServerConfig::default();
        c.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.bind_addr.port(), 7000);
        assert_eq!(c.database_url, "sqlite::memory:");
        assert_eq!(c.storage_root, PathBuf::from("/srv/folio"));
        assert_eq!(c.admin_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn invalid_env_addr_is_rejected() {
        let mut c = ServerConfig::default();
        let err = c
            .apply_env(|k| (k == ENV_BIND_ADDR).then(|| "nowhere".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_BIND_ADDR));
    }

    #[test]
    fn redacted_output_hides_token() {
        let c = ServerConfig {
            admin_token: Some("s3cret".into()),
            ..ServerConfig::default()
        };
        let text = c.to_redacted_toml().unwrap();
        assert!(text.contains("<redacted>"));
        assert!(!text.contains("s3cret"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "database_url = \"sqlite://other.db\"\n").unwrap();
        let c = ServerConfig::from_file(&path).unwrap();
        assert_eq!(c.database_url, "sqlite://other.db");
        assert!(ServerConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}

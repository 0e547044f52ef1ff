//! Server configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret-key-change-in-production";

/// Top-level quizdeck configuration.
///
/// Note: Custom Debug impl masks the JWT secret to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `sqlite://...`, `sqlite::memory:` or `memory:`.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// HS256 signing secret for access tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_jwt_expires")]
    pub jwt_expires_secs: u64,
    /// Origins allowed by CORS. `*` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Whether `/auth/register` accepts `role = "admin"`.
    #[serde(default = "default_true")]
    pub allow_admin_registration: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("database_url", &self.database_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"***")
            .field("jwt_expires_secs", &self.jwt_expires_secs)
            .field("cors_origins", &self.cors_origins)
            .field("allow_admin_registration", &self.allow_admin_registration)
            .finish()
    }
}

fn default_database_url() -> String {
    "sqlite://quiz_app.db".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}
fn default_jwt_expires() -> u64 {
    3600
}
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            host: default_host(),
            port: default_port(),
            jwt_secret: default_jwt_secret(),
            jwt_expires_secs: default_jwt_expires(),
            cors_origins: default_cors_origins(),
            allow_admin_registration: true,
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT: {port}"))?;
        }
        if let Some(secret) = lookup("JWT_SECRET_KEY") {
            self.jwt_secret = secret;
        }
        if let Some(expires) = lookup("JWT_ACCESS_TOKEN_EXPIRES") {
            self.jwt_expires_secs = expires
                .trim()
                .parse()
                .with_context(|| format!("invalid JWT_ACCESS_TOKEN_EXPIRES: {expires}"))?;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        Ok(())
    }

    fn resolve_env_vars(&mut self) {
        self.database_url = resolve_env_vars(&self.database_url);
        self.host = resolve_env_vars(&self.host);
        self.jwt_secret = resolve_env_vars(&self.jwt_secret);
        for origin in &mut self.cors_origins {
            *origin = resolve_env_vars(origin);
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizdeck.toml` in the current directory
/// 2. `~/.config/quizdeck/config.toml`
///
/// Environment variable overrides: `DATABASE_URL`, `PORT`, `JWT_SECRET_KEY`,
/// `JWT_ACCESS_TOKEN_EXPIRES`, `CORS_ORIGINS`.
pub fn load_config() -> Result<ServerConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ServerConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizdeck.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ServerConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ServerConfig::default(),
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.resolve_env_vars();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizdeck"))
}

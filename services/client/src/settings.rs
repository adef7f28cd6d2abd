//! Server configuration loaded from the environment

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// HTTP server settings
///
/// # Environment Variables
/// - `PORT`: listening port (default: 8000)
/// - `CORS_ORIGIN`: allowed origins, comma separated, `*` for any (default: `*`)
/// - `BODY_LIMIT`: maximum JSON / url-encoded body size in bytes (default: 16384)
/// - `UPLOAD_DIR`: directory for uploaded photos (default: `./public/temp`)
/// - `MAX_PHOTO_BYTES`: maximum photo size in bytes (default: 5 MiB)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origin: String,
    pub body_limit: usize,
    pub upload_dir: String,
    pub max_photo_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("port", 8000_i64)?
            .set_default("cors_origin", "*")?
            .set_default("body_limit", 16 * 1024_i64)?
            .set_default("upload_dir", "./public/temp")?
            .set_default("max_photo_bytes", 5 * 1024 * 1024_i64)?
            .add_source(Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Explicit origins, or `None` when any origin is allowed
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origin
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

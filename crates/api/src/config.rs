//! Server configuration loaded from environment variables.
//!
//! Configuration is plain data: it is loaded once at startup and passed
//! into handlers through `AppState`. There is no global mutable config
//! cache to invalidate.

use std::path::PathBuf;
use std::time::Duration;

use fotomat_comfyui::PollConfig;
use fotomat_core::watermark::{QrTag, TextLabel, WatermarkSpec, DEFAULT_MAX_DIM};

use crate::auth::jwt::JwtConfig;

/// One account provisioned at startup.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub username: String,
    /// `"admin"` or `"user"`.
    pub role: String,
    /// Argon2id PHC hash of the password.
    pub password_hash: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except `JWT_SECRET` and `FOTOMAT_USERS` have defaults
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `240`). Must exceed the
    /// generation timeout or every slow generation becomes a 408.
    pub request_timeout_secs: u64,
    /// Base URL of the ComfyUI instance (default: `http://127.0.0.1:8188`).
    pub comfyui_url: String,
    /// Directory for stored output images (default: `./uploads`).
    pub upload_dir: PathBuf,
    /// Directory for the settings/history files (default: `./data`).
    pub data_dir: PathBuf,
    /// Maximum wait for a generation result in seconds (default: `180`).
    pub generation_timeout_secs: u64,
    /// Pause between status checks in seconds (default: `1`).
    pub poll_interval_secs: u64,
    /// Maximum output dimension (default: `2560`).
    pub max_image_dim: u32,
    /// Text stamped onto outputs; omitted when unset.
    pub watermark_text: Option<String>,
    /// Font file used for the text stamp. Required when `watermark_text`
    /// is set.
    pub watermark_font_path: Option<PathBuf>,
    /// URL encoded into the QR stamp; omitted when unset.
    pub watermark_qr_url: Option<String>,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Accounts allowed to log in.
    pub users: Vec<UserAccount>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `240`                   |
    /// | `COMFYUI_URL`             | `http://127.0.0.1:8188` |
    /// | `UPLOAD_DIR`              | `./uploads`             |
    /// | `DATA_DIR`                | `./data`                |
    /// | `GENERATION_TIMEOUT_SECS` | `180`                   |
    /// | `POLL_INTERVAL_SECS`      | `1`                     |
    /// | `MAX_IMAGE_DIM`           | `2560`                  |
    /// | `WATERMARK_TEXT`          | unset                   |
    /// | `WATERMARK_FONT_PATH`     | unset                   |
    /// | `WATERMARK_QR_URL`        | unset                   |
    /// | `FOTOMAT_USERS`           | **required**            |
    ///
    /// # Panics
    ///
    /// Panics on malformed values; misconfiguration should fail fast at
    /// startup, not at request time.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "240".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let comfyui_url = std::env::var("COMFYUI_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8188".into())
            .trim_end_matches('/')
            .to_string();

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into()));
        let data_dir =
            PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()));

        let generation_timeout_secs: u64 = std::env::var("GENERATION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "180".into())
            .parse()
            .expect("GENERATION_TIMEOUT_SECS must be a valid u64");

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        let max_image_dim: u32 = std::env::var("MAX_IMAGE_DIM")
            .unwrap_or_else(|_| DEFAULT_MAX_DIM.to_string())
            .parse()
            .expect("MAX_IMAGE_DIM must be a valid u32");

        let watermark_text = std::env::var("WATERMARK_TEXT").ok().filter(|s| !s.is_empty());
        let watermark_font_path = std::env::var("WATERMARK_FONT_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        let watermark_qr_url = std::env::var("WATERMARK_QR_URL").ok().filter(|s| !s.is_empty());

        if watermark_text.is_some() {
            assert!(
                watermark_font_path.is_some(),
                "WATERMARK_FONT_PATH must be set when WATERMARK_TEXT is set"
            );
        }

        let users = parse_users(
            &std::env::var("FOTOMAT_USERS").expect("FOTOMAT_USERS must be set"),
        );
        assert!(!users.is_empty(), "FOTOMAT_USERS must define at least one account");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            comfyui_url,
            upload_dir,
            data_dir,
            generation_timeout_secs,
            poll_interval_secs,
            max_image_dim,
            watermark_text,
            watermark_font_path,
            watermark_qr_url,
            jwt: JwtConfig::from_env(),
            users,
        }
    }

    /// Polling parameters for the generation pipeline.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            max_wait: Duration::from_secs(self.generation_timeout_secs),
            interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    /// Watermark overlays derived from configuration. Empty when neither
    /// text nor QR URL is configured.
    pub fn watermark_spec(&self) -> WatermarkSpec {
        let text = match (&self.watermark_text, &self.watermark_font_path) {
            (Some(text), Some(font)) => Some(TextLabel::new(text.clone(), font.clone())),
            _ => None,
        };
        let qr = self.watermark_qr_url.as_ref().map(|url| QrTag::new(url.clone()));
        WatermarkSpec { text, qr }
    }

    /// Look up a provisioned account by username.
    pub fn find_user(&self, username: &str) -> Option<&UserAccount> {
        self.users.iter().find(|u| u.username == username)
    }
}

/// Parse `FOTOMAT_USERS`: semicolon-separated `username:role:phc-hash`
/// entries. The PHC hash itself contains `$` but never `:` or `;`.
///
/// # Panics
///
/// Panics on malformed entries.
fn parse_users(raw: &str) -> Vec<UserAccount> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(username), Some(role), Some(hash))
                    if !username.is_empty() && !role.is_empty() && !hash.is_empty() =>
                {
                    UserAccount {
                        username: username.to_string(),
                        role: role.to_string(),
                        password_hash: hash.to_string(),
                    }
                }
                _ => panic!("Malformed FOTOMAT_USERS entry '{entry}', expected username:role:hash"),
            }
        })
        .collect()
}

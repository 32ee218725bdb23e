//! Environment-backed configuration.
//!
//! Loaded once at startup (after `dotenvy` has populated the process
//! environment) into an immutable `AppConfig` that is injected into the
//! router state, the lifecycle rules and the upload validator. Nothing in
//! the crate reads configuration ambiently after boot.

use std::env;

/// Outbound mail provider settings. Absent when the provider is not
/// configured, in which case notifications are skipped (and logged).
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: String,
    pub upload_dir: String,
    pub public_base_url: String,
    pub log_dir: String,
    pub jwt_secret: String,
    pub jwt_expiry_secs: u64,
    pub max_file_size: u64,
    pub allowed_file_types: Vec<String>,
    pub mail: Option<MailConfig>,
    pub default_admin_email: String,
    pub default_admin_password: String,
}

const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024; // 5MB

fn default_allowed_types() -> Vec<String> {
    ["image/jpeg", "image/png", "image/jpg", "application/pdf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn parse_allowed_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using development secret");
                "dev_secret_change_me".to_string()
            }
        };

        let jwt_expiry_secs = env::var("JWT_EXPIRE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7 * 24 * 3600); // 7d, matching token lifetime of the portal

        let max_file_size = env::var("MAX_FILE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE);

        let allowed_file_types = env::var("ALLOWED_FILE_TYPES")
            .map(|raw| parse_allowed_types(&raw))
            .unwrap_or_else(|_| default_allowed_types());

        // Mail is optional; without a provider the portal runs but skips
        // notifications.
        let mail = match (env::var("MAIL_API_URL"), env::var("MAIL_API_KEY")) {
            (Ok(api_url), Ok(api_key)) if !api_url.is_empty() => Some(MailConfig {
                api_url,
                api_key,
                from: env_or("MAIL_FROM", "admissions@college.edu"),
            }),
            _ => None,
        };

        AppConfig {
            bind_addr: env_or("PORTAL_BIND", "0.0.0.0:5000"),
            data_dir: env_or("PORTAL_DATA_DIR", "portal_data"),
            upload_dir: env_or("UPLOAD_DIR", "uploads"),
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:5000"),
            log_dir: env_or("LOG_DIR", "logs"),
            jwt_secret,
            jwt_expiry_secs,
            max_file_size,
            allowed_file_types,
            mail,
            default_admin_email: env_or("DEFAULT_ADMIN_EMAIL", "admin@college.edu"),
            default_admin_password: env_or("DEFAULT_ADMIN_PASSWORD", "Admin@123"),
        }
    }

    /// MIME allow-list check for uploads (case-insensitive).
    pub fn is_allowed_type(&self, mime: &str) -> bool {
        let mime = mime.to_ascii_lowercase();
        self.allowed_file_types.iter().any(|t| t == &mime)
    }
}

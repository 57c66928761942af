use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::http::HeaderName;
use serde::Deserialize;
use tokengate_core::error::{Result, TokenGateError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TokenGateError::UnsupportedVersion);
        }

        self.auth.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Backing token list (JSON array).
    #[serde(default = "default_token_list_file")]
    pub token_list_file: PathBuf,

    /// Directory to watch; defaults to the parent of `token_list_file`.
    #[serde(default)]
    pub watch_dir: Option<PathBuf>,

    /// Change bursts inside this window collapse into one reload.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How often the directory is scanned for changes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Request header carrying the credential.
    #[serde(default = "default_token_header")]
    pub token_header: String,

    /// Response header carrying the verdict ("1" / "0").
    #[serde(default = "default_token_valid_header")]
    pub token_valid_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_list_file: default_token_list_file(),
            watch_dir: None,
            debounce_ms: default_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            token_header: default_token_header(),
            token_valid_header: default_token_valid_header(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.token_list_file.as_os_str().is_empty() {
            return Err(TokenGateError::BadRequest(
                "auth.token_list_file must not be empty".into(),
            ));
        }
        if !(100..=60000).contains(&self.debounce_ms) {
            return Err(TokenGateError::BadRequest(
                "auth.debounce_ms must be between 100 and 60000".into(),
            ));
        }
        if self.poll_interval_ms < 50 || self.poll_interval_ms > self.debounce_ms {
            return Err(TokenGateError::BadRequest(
                "auth.poll_interval_ms must be between 50 and debounce_ms".into(),
            ));
        }
        for (key, name) in [
            ("auth.token_header", &self.token_header),
            ("auth.token_valid_header", &self.token_valid_header),
        ] {
            HeaderName::try_from(name.as_str()).map_err(|_| {
                TokenGateError::BadRequest(format!("{key} is not a valid header name: {name}"))
            })?;
        }
        Ok(())
    }

    /// Directory whose changes trigger a reload.
    pub fn watch_dir(&self) -> PathBuf {
        if let Some(dir) = &self.watch_dir {
            return dir.clone();
        }
        match self.token_list_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8076".into()
}
fn default_token_list_file() -> PathBuf {
    PathBuf::from("./data/tokens.json")
}
fn default_debounce_ms() -> u64 {
    3000
}
fn default_poll_interval_ms() -> u64 {
    500
}
fn default_token_header() -> String {
    "authorization".into()
}
fn default_token_valid_header() -> String {
    "token-valid".into()
}

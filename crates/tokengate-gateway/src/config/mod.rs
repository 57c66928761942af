//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use tokengate_core::error::{Result, TokenGateError};

pub use schema::{AuthConfig, GatewayConfig, GatewaySection};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TOKENGATE_CONFIG";
/// Config file used when `TOKENGATE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "tokengate.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TokenGateError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| TokenGateError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config path from the environment.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::permission::{role, RolePolicy};

/// Environment variable holding the bearer token
pub const TOKEN_ENV: &str = "DOCFLOW_TOKEN";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
    /// Role classes
    #[serde(default)]
    pub roles: RoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Backend base URL (e.g., "http://localhost:8080/api")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Page size for list requests
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Bearer token (overridden by DOCFLOW_TOKEN)
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleConfig {
    /// Role tags that see every department
    #[serde(default = "default_full_access_roles")]
    pub full_access: Vec<String>,
    /// Role tags that see their department subtree
    #[serde(default = "default_department_head_roles")]
    pub department_head: Vec<String>,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            full_access: default_full_access_roles(),
            department_head: default_department_head_roles(),
        }
    }
}

impl RoleConfig {
    pub fn policy(&self) -> RolePolicy {
        RolePolicy::new(&self.full_access, &self.department_head)
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_full_access_roles() -> Vec<String> {
    role::FULL_ACCESS.iter().map(|r| r.to_string()).collect()
}

fn default_department_head_roles() -> Vec<String> {
    role::DEPARTMENT_HEAD.iter().map(|r| r.to_string()).collect()
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(format!("{}: {}", path, e)))
    }

    /// Apply environment overrides
    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.api.token = Some(token.trim().to_string());
            }
        }
        self
    }
}

//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{self, Context, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the lead service REST API
    pub lead_api_url: String,

    /// Bearer token for the lead service (falls back to the session token)
    pub lead_api_token: Option<String>,

    /// Saved login session (auth response JSON)
    pub session_file: Option<PathBuf>,

    /// Overrides the session user for "assign to current user"
    pub current_user_id: Option<i64>,

    pub request_timeout: Duration,

    pub logs_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; blank values count as unset
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let lead_api_url = var("LEAD_API_URL")
            .unwrap_or_else(|| "http://localhost:8082/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let lead_api_token = var("LEAD_API_TOKEN");

        let session_file = var("SESSION_FILE").map(PathBuf::from);

        let current_user_id = var("CURRENT_USER_ID")
            .map(|v| v.trim().parse::<i64>())
            .transpose()
            .context("CURRENT_USER_ID must be a numeric user id")?;

        let timeout_secs = var("REQUEST_TIMEOUT_SECS")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?
            .unwrap_or(30);

        if timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        let logs_dir = var("LOGS_DIR").unwrap_or_else(|| "logs".to_string());

        Ok(Self {
            lead_api_url,
            lead_api_token,
            session_file,
            current_user_id,
            request_timeout: Duration::from_secs(timeout_secs),
            logs_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.lead_api_url, "http://localhost:8082/api");
        assert!(config.lead_api_token.is_none());
        assert!(config.session_file.is_none());
        assert!(config.current_user_id.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.logs_dir, "logs");
    }

    #[test]
    fn test_config_reads_overrides() {
        let config = config_from(&[
            ("LEAD_API_URL", "https://crm.example.com/api/"),
            ("LEAD_API_TOKEN", "secret"),
            ("SESSION_FILE", "/tmp/session.json"),
            ("CURRENT_USER_ID", " 42 "),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.lead_api_url, "https://crm.example.com/api");
        assert_eq!(config.lead_api_token.as_deref(), Some("secret"));
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/session.json")));
        assert_eq!(config.current_user_id, Some(42));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_blank_token_is_unset() {
        let config = config_from(&[("LEAD_API_TOKEN", "  ")]).unwrap();
        assert!(config.lead_api_token.is_none());
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        assert!(config_from(&[("REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_config_rejects_non_numeric_user_id() {
        let err = config_from(&[("CURRENT_USER_ID", "admin")]).unwrap_err();
        assert!(err.to_string().contains("CURRENT_USER_ID"));
    }
}

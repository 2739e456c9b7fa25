//! Process configuration: app id, admin account and the secret key consumed
//! by the signer.

use std::env;
use std::fmt;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://console.tim.qq.com";

/// 180 days, the platform's customary usersig lifetime.
pub const DEFAULT_SIG_EXPIRE_SECS: u64 = 180 * 24 * 60 * 60;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct TimConfig {
    pub app_id: u64,
    pub admin_account: String,
    pub secret_key: String,
    pub base_url: String,
    pub sig_expire_secs: u64,
    pub timeout_secs: u64,
}

impl TimConfig {
    pub fn new(app_id: u64, admin_account: &str, secret_key: &str) -> Self {
        Self {
            app_id,
            admin_account: admin_account.to_string(),
            secret_key: secret_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            sig_expire_secs: DEFAULT_SIG_EXPIRE_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Read configuration from `TIM_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any `TIM_*` key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ApiError::Configuration(format!("{key} is not set")))
        };
        let app_id: u64 = required("TIM_APP_ID")?
            .trim()
            .parse()
            .map_err(|_| ApiError::Configuration("TIM_APP_ID is not an integer".to_string()))?;
        let mut config = Self::new(
            app_id,
            &required("TIM_ADMIN_ACCOUNT")?,
            &required("TIM_SECRET_KEY")?,
        );
        if let Some(base_url) = lookup("TIM_BASE_URL") {
            config = config.with_base_url(&base_url);
        }
        config.sig_expire_secs = lookup("TIM_SIG_EXPIRE_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SIG_EXPIRE_SECS);
        config.timeout_secs = lookup("TIM_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.app_id == 0 {
            return Err(ApiError::Configuration("app id is missing".to_string()));
        }
        if self.admin_account.trim().is_empty() {
            return Err(ApiError::Configuration("admin account is missing".to_string()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| ApiError::Configuration(format!("invalid base url {}: {e}", self.base_url)))?;
        Ok(())
    }
}

impl fmt::Debug for TimConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimConfig")
            .field("app_id", &self.app_id)
            .field("admin_account", &self.admin_account)
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("sig_expire_secs", &self.sig_expire_secs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

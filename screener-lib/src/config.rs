use serde::Serialize;
use std::fmt;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "AI_MODEL";
pub const API_BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///./local.db";

/// Capability the ranking engine needs from its configuration.
pub trait CredentialProvider {
    /// API credential, `None` (or blank) when expert ranking is not possible
    fn api_key(&self) -> Option<String>;

    /// Model identifier sent with every completion request
    fn model(&self) -> String;
}

impl<T: CredentialProvider + ?Sized> CredentialProvider for &T {
    fn api_key(&self) -> Option<String> {
        (**self).api_key()
    }

    fn model(&self) -> String {
        (**self).model()
    }
}

/// First non-blank credential in priority order: environment, secrets store,
/// value entered during the session.
pub fn resolve_credential(
    env: Option<&str>,
    secrets: Option<&str>,
    session: Option<&str>,
) -> Option<String> {
    [env, secrets, session]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
}

/// Settings injected once into the pipeline and the ranking engine.
#[derive(Clone)]
pub struct ScreenerConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub top_n: usize,
    pub log_level: String,
    pub database_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigStatus {
    pub expert_available: bool,
    pub model: String,
    pub database_configured: bool,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        ScreenerConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            top_n: DEFAULT_TOP_N,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl ScreenerConfig {
    /// Build the configuration from an environment lookup plus the optional
    /// secrets-store and session credentials.
    pub fn from_sources<F>(env_lookup: F, secrets: Option<&str>, session: Option<&str>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| env_lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = ScreenerConfig::default();

        ScreenerConfig {
            api_key: resolve_credential(env_lookup(API_KEY_VAR).as_deref(), secrets, session),
            model: non_blank(MODEL_VAR).unwrap_or(defaults.model),
            api_base_url: non_blank(API_BASE_URL_VAR)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            top_n: defaults.top_n,
            log_level: non_blank(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            database_url: non_blank(DATABASE_URL_VAR).unwrap_or(defaults.database_url),
        }
    }

    /// [`ScreenerConfig::from_sources`] over the process environment.
    pub fn from_env(secrets: Option<&str>, session: Option<&str>) -> Self {
        Self::from_sources(|name| std::env::var(name).ok(), secrets, session)
    }

    pub fn status(&self) -> ConfigStatus {
        ConfigStatus {
            expert_available: self.api_key().is_some(),
            model: self.model.clone(),
            database_configured: !self.database_url.trim().is_empty(),
        }
    }
}

impl CredentialProvider for ScreenerConfig {
    fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    fn model(&self) -> String {
        self.model.clone()
    }
}

// The credential never reaches logs.
impl fmt::Debug for ScreenerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("top_n", &self.top_n)
            .field("log_level", &self.log_level)
            .field("database_url", &self.database_url)
            .finish()
    }
}

use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use url::Url;

pub const ENV_TRANSLATOR_KEY: &str = "AZURE_AI_TRANSLATION_KEY";
pub const ENV_TRANSLATOR_ENDPOINT: &str = "AZURE_AI_TRANSLATION_ENDPOINT";
pub const ENV_TRANSLATOR_REGION: &str = "AZURE_AI_TRANSLATION_REGION";
pub const DEFAULT_ENV_FILE: &str = "azure.env";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_DETECT_DELAY_MS: u64 = 500;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::MissingCredentials {
                missing: vec![ENV_TRANSLATOR_KEY],
            });
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Base URL of the translator resource, stored without trailing slashes so
/// that `{endpoint}{path}` never produces `//`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        let trimmed = v.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidEndpoint {
            value: v.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                value: v.clone(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}{}", self.0, path))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region(String);

impl Region {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::MissingCredentials {
                missing: vec![ENV_TRANSLATOR_REGION],
            });
        }
        Ok(Self(v.trim().to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: ApiKey,
    pub endpoint: Endpoint,
    pub region: Region,
}

impl Credentials {
    /// Resolves all three secrets, CLI values first, then the environment.
    /// Every absent or blank value is reported in one error.
    pub fn resolve(
        cli_key: Option<String>,
        cli_endpoint: Option<String>,
        cli_region: Option<String>,
        env: &impl Env,
    ) -> Result<Self, ConfigError> {
        let key = resolve_optional_string(cli_key, ENV_TRANSLATOR_KEY, env);
        let endpoint = resolve_optional_string(cli_endpoint, ENV_TRANSLATOR_ENDPOINT, env);
        let region = resolve_optional_string(cli_region, ENV_TRANSLATOR_REGION, env);

        let missing: Vec<&'static str> = [
            (ENV_TRANSLATOR_KEY, key.is_none()),
            (ENV_TRANSLATOR_ENDPOINT, endpoint.is_none()),
            (ENV_TRANSLATOR_REGION, region.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (key, endpoint, region) {
            (Some(key), Some(endpoint), Some(region)) => Ok(Self {
                api_key: ApiKey::new(key)?,
                endpoint: Endpoint::new(endpoint)?,
                region: Region::new(region)?,
            }),
            _ => Err(ConfigError::MissingCredentials { missing }),
        }
    }
}

/// Whether the source language is picked by the user or may be left to the
/// provider to infer.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DetectMode {
    #[default]
    Auto,
    Manual,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub detect_mode: DetectMode,
    pub detect_delay: Duration,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            detect_mode: DetectMode::default(),
            detect_delay: Duration::from_millis(DEFAULT_DETECT_DELAY_MS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn with_http_timeout_secs(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.http_timeout = Duration::from_secs(secs);
        Ok(self)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Azure Translator API credentials are missing ({}). Please check azure.env file.",
        .missing.join(", ")
    )]
    MissingCredentials { missing: Vec<&'static str> },
    #[error("invalid translator endpoint `{value}`: {reason}")]
    InvalidEndpoint { value: String, reason: String },
    #[error("http timeout must be > 0 s")]
    ZeroTimeout,
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Blank values count as absent on both sides.
pub fn resolve_optional_string(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Option<String> {
    cli_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env.var(env_key).filter(|v| !v.trim().is_empty()))
}

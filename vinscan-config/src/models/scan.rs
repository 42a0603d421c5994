use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use vinscan_core::{
    lookup::HttpLookupConfig, pipeline::PipelineSettings, retry::RetryPolicy,
};

use crate::{credential::ApiKey, error::ConfigError};

/// Settings for the operator-facing scanner (`vinscan scan|check|enroll`).
///
/// Every field has a default so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub api: ApiConfig,
    pub retry: RetryConfig,
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
}

/// Remote record store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme is optional; `http://` is assumed when missing.
    pub base_url: String,
    pub api_key: ApiKey,
    /// Per-request deadline.
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            api_key: ApiKey::default(),
            request_timeout_ms: 5_000,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn require_key(&self) -> Result<&ApiKey, ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(&self.api_key)
    }

    /// Client settings for [`HttpLookupClient`](vinscan_core::lookup::HttpLookupClient).
    pub fn lookup_config(&self) -> Result<HttpLookupConfig, ConfigError> {
        Ok(HttpLookupConfig {
            base_url: self.base_url.clone(),
            api_key: self.require_key()?.expose().to_string(),
            timeout: self.request_timeout(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            backoff_base_ms: policy.backoff_base.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Window during which a just-resolved VIN is ignored if scanned again.
    pub cooldown_ms: u64,
    /// How long a result stays on screen before scanning resumes.
    pub display_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let settings = PipelineSettings::default();
        Self {
            cooldown_ms: settings.cooldown.as_millis() as u64,
            display_delay_ms: settings.display_delay.as_millis() as u64,
        }
    }
}

impl PipelineConfig {
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            cooldown: Duration::from_millis(self.cooldown_ms),
            display_delay: Duration::from_millis(self.display_delay_ms),
        }
    }
}

/// Where frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Handheld scanner typing one code per line.
    #[default]
    Stdin,
    /// Directory of camera frames.
    Dir,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdin" => Ok(SourceKind::Stdin),
            "dir" => Ok(SourceKind::Dir),
            other => Err(format!("unknown source {other:?} (expected stdin or dir)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Required when `kind = "dir"`.
    pub frame_dir: Option<PathBuf>,
    pub poll_interval_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Stdin,
            frame_dir: None,
            poll_interval_ms: 250,
        }
    }
}

impl SourceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn frame_dir(&self) -> Option<&Path> {
        self.frame_dir.as_deref()
    }
}

/// Non-fatal configuration smells, reported once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

impl ScanConfig {
    /// Apply `API_URL`, `API_KEY` and the `VINSCAN_*` overrides from the
    /// process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Same as [`apply_env`](Self::apply_env) with an injectable lookup.
    /// Unset and blank variables are ignored.
    pub fn apply_env_with(
        &mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |var: &str| get(var).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("API_URL") {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(key) = get("API_KEY") {
            self.api.api_key = ApiKey::new(key.trim());
        }
        if let Some(raw) = get("VINSCAN_REQUEST_TIMEOUT_MS") {
            self.api.request_timeout_ms = parse_env("VINSCAN_REQUEST_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = get("VINSCAN_MAX_ATTEMPTS") {
            self.retry.max_attempts = parse_env("VINSCAN_MAX_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = get("VINSCAN_BACKOFF_BASE_MS") {
            self.retry.backoff_base_ms = parse_env("VINSCAN_BACKOFF_BASE_MS", &raw)?;
        }
        if let Some(raw) = get("VINSCAN_COOLDOWN_MS") {
            self.pipeline.cooldown_ms = parse_env("VINSCAN_COOLDOWN_MS", &raw)?;
        }
        if let Some(raw) = get("VINSCAN_DISPLAY_DELAY_MS") {
            self.pipeline.display_delay_ms = parse_env("VINSCAN_DISPLAY_DELAY_MS", &raw)?;
        }
        if let Some(raw) = get("VINSCAN_SOURCE") {
            self.source.kind = parse_env("VINSCAN_SOURCE", &raw)?;
        }
        if let Some(dir) = get("VINSCAN_FRAME_DIR") {
            self.source.frame_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(raw) = get("VINSCAN_POLL_INTERVAL_MS") {
            self.source.poll_interval_ms = parse_env("VINSCAN_POLL_INTERVAL_MS", &raw)?;
        }
        Ok(())
    }

    /// Reject settings the scanner cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".into()));
        }
        if self.api.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "api.request_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.source.kind == SourceKind::Dir {
            if self.source.frame_dir.is_none() {
                return Err(ConfigError::Invalid(
                    "source.frame_dir is required when source.kind = \"dir\"".into(),
                ));
            }
            if self.source.poll_interval_ms == 0 {
                return Err(ConfigError::Invalid(
                    "source.poll_interval_ms must be greater than zero".into(),
                ));
            }
        }
        Ok(())
    }

    /// `remote` is false when lookups go to a local store and the API
    /// settings are unused.
    pub fn warnings(&self, remote: bool) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if remote && self.api.api_key.is_empty() {
            warnings.push(ConfigWarning {
                message: "no API key configured".into(),
                hint: Some("remote lookups will be rejected; set API_KEY".into()),
            });
        }

        let url = self.api.base_url.trim();
        let local = ["127.0.0.1", "localhost", "[::1]"]
            .iter()
            .any(|host| url.trim_start_matches("http://").starts_with(host));
        if remote && url.starts_with("http://") && !local {
            warnings.push(ConfigWarning {
                message: format!("record store {url} is not using TLS"),
                hint: Some("the API key is sent in cleartext; prefer https://".into()),
            });
        }

        let settings = self.pipeline.settings();
        if settings.cooldown < settings.display_delay {
            warnings.push(ConfigWarning {
                message: "pipeline.cooldown_ms is shorter than display_delay_ms".into(),
                hint: Some("a sticker held in view will be looked up on every cycle".into()),
            });
        }

        warnings
    }
}

fn parse_env<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    raw.trim().parse().map_err(|err: T::Err| ConfigError::Env {
        var,
        value: raw.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_match_the_pipeline_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.retry.policy(), RetryPolicy::default());
        assert_eq!(config.pipeline.settings(), PipelineSettings::default());
        assert_eq!(config.api.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.source.kind, SourceKind::Stdin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ScanConfig::default();
        config
            .apply_env_with(env(&[
                ("API_URL", "https://vins.example.com"),
                ("API_KEY", " s3cret "),
                ("VINSCAN_COOLDOWN_MS", "750"),
                ("VINSCAN_MAX_ATTEMPTS", "5"),
                ("VINSCAN_SOURCE", "dir"),
                ("VINSCAN_FRAME_DIR", "/tmp/frames"),
                ("VINSCAN_DISPLAY_DELAY_MS", ""),
            ]))
            .unwrap();

        assert_eq!(config.api.base_url, "https://vins.example.com");
        assert_eq!(config.api.api_key.expose(), "s3cret");
        assert_eq!(config.pipeline.cooldown_ms, 750);
        assert_eq!(config.pipeline.display_delay_ms, 1_000);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.source.kind, SourceKind::Dir);
        assert_eq!(config.source.frame_dir(), Some(Path::new("/tmp/frames")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_env_number_names_the_variable() {
        let mut config = ScanConfig::default();
        let err = config
            .apply_env_with(env(&[("VINSCAN_COOLDOWN_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env {
                var: "VINSCAN_COOLDOWN_MS",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        let mut config = ScanConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ScanConfig::default();
        config.api.request_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ScanConfig::default();
        config.api.base_url = "  ".into();
        assert!(config.validate().is_err());

        let mut config = ScanConfig::default();
        config.source.kind = SourceKind::Dir;
        assert!(config.validate().is_err());
    }

    #[test]
    fn lookup_config_requires_a_key() {
        let mut config = ScanConfig::default();
        assert!(matches!(
            config.api.lookup_config(),
            Err(ConfigError::MissingApiKey)
        ));

        config.api.api_key = ApiKey::from("k");
        let lookup = config.api.lookup_config().unwrap();
        assert_eq!(lookup.api_key, "k");
        assert_eq!(lookup.timeout, Duration::from_secs(5));
    }

    #[test]
    fn warns_about_cleartext_remote_store() {
        let mut config = ScanConfig::default();
        config.api.api_key = ApiKey::from("k");
        assert!(config.warnings(true).is_empty());

        config.api.base_url = "http://vins.example.com".into();
        let warnings = config.warnings(true);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("not using TLS"));
        assert!(config.warnings(false).is_empty());
    }
}

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    error::ConfigError,
    models::ScanConfig,
};

/// Where the file layer of a [`ScanConfig`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    /// `$VINSCAN_CONFIG_PATH`.
    EnvPath(PathBuf),
    /// One of the well-known file names in the working directory.
    File(PathBuf),
}

/// Result of a full layered load.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ScanConfig,
    pub source: ConfigSource,
    pub env_file_loaded: bool,
}

/// Builds a [`ScanConfig`] from defaults, an optional file, `.env` and the
/// process environment, in that order of precedence (later wins).
///
/// The result is not validated: callers layer CLI flags on top and then run
/// [`ScanConfig::validate`] and [`ScanConfig::warnings`] themselves.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    skip_env_file: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this file instead of `$VINSCAN_CONFIG_PATH` and the default names.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    pub fn skip_env_file(mut self) -> Self {
        self.skip_env_file = true;
        self
    }

    pub fn load(self) -> Result<ConfigLoad, ConfigError> {
        // `.env` only fills variables that are not already set.
        let env_file_loaded = !self.skip_env_file && dotenvy::dotenv().is_ok();

        let (mut config, source) = match self.explicit_path {
            Some(path) => (load_from_file(&path)?, ConfigSource::File(path)),
            None => load_file_layer()?,
        };
        config.apply_env()?;

        Ok(ConfigLoad {
            config,
            source,
            env_file_loaded,
        })
    }
}

fn load_file_layer() -> Result<(ScanConfig, ConfigSource), ConfigError> {
    if let Ok(path_str) = env::var("VINSCAN_CONFIG_PATH")
        && !path_str.trim().is_empty()
    {
        let path = PathBuf::from(path_str.trim());
        let config = load_from_file(&path)?;
        return Ok((config, ConfigSource::EnvPath(path)));
    }

    if let Some(path) = find_default_file() {
        let config = load_from_file(&path)?;
        return Ok((config, ConfigSource::File(path)));
    }

    Ok((ScanConfig::default(), ConfigSource::Default))
}

/// Read a TOML or JSON file, picking the format from the extension.
pub fn load_from_file(path: &Path) -> Result<ScanConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let origin = path.display().to_string();

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|err| {
            ConfigError::Parse {
                origin,
                detail: err.to_string(),
            }
        }),
        Some("toml") => toml::from_str(&contents).map_err(|err| ConfigError::Parse {
            origin,
            detail: err.to_string(),
        }),
        _ => parse_from_str(&contents, &origin),
    }
}

/// TOML first, then JSON.
pub fn parse_from_str(contents: &str, origin: &str) -> Result<ScanConfig, ConfigError> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| ConfigError::Parse {
            origin: origin.to_string(),
            detail: format!("toml error: {toml_err}; json error: {json_err}"),
        })
    })
}

fn find_default_file() -> Option<PathBuf> {
    const CANDIDATES: &[&str] = &[
        "vinscan.toml",
        "vinscan.json",
        "config/vinscan.toml",
        "config/vinscan.json",
    ];

    CANDIDATES
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .map(Path::to_path_buf)
}

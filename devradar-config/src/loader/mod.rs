pub mod error;

use crate::constants::{
    DEFAULT_CONFIG_FILES, ENV_CONFIG_JSON, ENV_CONFIG_PATH, ENV_SERVER_URL,
};
use crate::models::ClientConfig;
use crate::validation::{ConfigWarnings, apply_guard_rails};

use anyhow::anyhow;
use error::ConfigLoadError;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Source that produced the client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// A validated configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ClientConfig,
    pub source: ConfigSource,
    pub warnings: ConfigWarnings,
}

impl ClientConfig {
    /// Load configuration using process environment variables.
    /// Evaluation order:
    /// 1) `$DEVRADAR_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$DEVRADAR_CONFIG_JSON` (inline JSON),
    /// 3) the first existing file in [`DEFAULT_CONFIG_FILES`],
    /// 4) defaults.
    ///
    /// `$DEVRADAR_SERVER_URL` then overrides `server.base_url`.
    pub fn load_from_env() -> Result<ConfigLoad, ConfigLoadError> {
        Self::load_with(|key| env::var(key).ok(), Path::new("."))
    }

    /// Same as [`ClientConfig::load_from_env`] with an explicit variable lookup
    /// and directory for the default file probe.
    pub fn load_with<F>(lookup: F, root: &Path) -> Result<ConfigLoad, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, source) = Self::resolve(&lookup, root)?;
        config.apply_env_overrides(&lookup);

        let warnings = apply_guard_rails(&config)?;
        for warning in &warnings.items {
            match &warning.hint {
                Some(hint) => log::warn!("{} ({})", warning.message, hint),
                None => log::warn!("{}", warning.message),
            }
        }

        log::debug!("Loaded client configuration from {:?}", source);
        Ok(ConfigLoad {
            config,
            source,
            warnings,
        })
    }

    fn resolve<F>(
        lookup: &F,
        root: &Path,
    ) -> Result<(Self, ConfigSource), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path_str) = non_blank(lookup(ENV_CONFIG_PATH)) {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = non_blank(lookup(ENV_CONFIG_JSON)) {
            let config =
                Self::parse_json(&raw).map_err(|err| ConfigLoadError::Parse {
                    origin: ENV_CONFIG_JSON.to_string(),
                    message: err.to_string(),
                })?;
            return Ok((config, ConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file(root) {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let parsed = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents),
            Some("toml") | Some("tml") => toml::from_str(&contents)
                .map_err(|err| anyhow!("invalid toml: {err}")),
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        };

        parsed.map_err(|err| ConfigLoadError::Parse {
            origin: path.display().to_string(),
            message: err.to_string(),
        })
    }

    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        // Try TOML first, then JSON for convenience.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse client config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid client config json: {err}"))
    }

    fn apply_env_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_blank(lookup(ENV_SERVER_URL)) {
            log::debug!("{} overrides server.base_url", ENV_SERVER_URL);
            self.server.base_url = url.trim().trim_end_matches('/').to_string();
        }
    }

    fn find_default_file(root: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.exists())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscoveryPolicy;

    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup_from(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let load = ClientConfig::load_with(lookup_from(&[]), dir.path()).unwrap();
        assert_eq!(load.source, ConfigSource::Default);
        assert_eq!(load.config, ClientConfig::default());
    }

    #[test]
    fn inline_json_accepts_human_durations() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{
            "query": {"timeout": "2s", "retry": {"max_retries": 4, "initial_backoff": "250ms"}},
            "discovery": {"policy": "merge_by_id"}
        }"#;
        let load = ClientConfig::load_with(
            lookup_from(&[(ENV_CONFIG_JSON, raw)]),
            dir.path(),
        )
        .unwrap();
        assert_eq!(load.source, ConfigSource::EnvInline);
        assert_eq!(load.config.query.timeout, Duration::from_secs(2));
        assert_eq!(load.config.query.retry.max_retries, 4);
        assert_eq!(
            load.config.query.retry.initial_backoff,
            Duration::from_millis(250)
        );
        assert_eq!(load.config.discovery.policy, DiscoveryPolicy::MergeById);
    }

    #[test]
    fn explicit_path_wins_over_inline_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "[server]\nbase_url = \"http://127.0.0.1:9000\"\n\n[location]\nlatitude_span = 0.1\n",
        )
        .unwrap();

        let load = ClientConfig::load_with(
            lookup_from(&[
                (ENV_CONFIG_PATH, path.to_str().unwrap()),
                (ENV_CONFIG_JSON, "{not json"),
            ]),
            dir.path(),
        )
        .unwrap();

        assert_eq!(load.source, ConfigSource::EnvPath(path));
        assert_eq!(load.config.server.base_url, "http://127.0.0.1:9000");
        assert_eq!(load.config.server.search_path, "/search");
        assert_eq!(load.config.location.latitude_span, 0.1);
        assert_eq!(load.config.location.longitude_span, 0.04);
    }

    #[test]
    fn probes_default_files_under_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        let path = dir.path().join("config/devradar.json");
        fs::write(&path, r#"{"stream": {"retry": {"max_retries": 1}}}"#).unwrap();

        let load = ClientConfig::load_with(lookup_from(&[]), dir.path()).unwrap();
        assert_eq!(load.source, ConfigSource::File(path));
        assert_eq!(load.config.stream.retry.max_retries, 1);
    }

    #[test]
    fn server_url_override_is_normalised() {
        let dir = tempfile::tempdir().unwrap();
        let load = ClientConfig::load_with(
            lookup_from(&[(ENV_SERVER_URL, " http://10.0.0.2:3333/ ")]),
            dir.path(),
        )
        .unwrap();
        assert_eq!(load.config.server.base_url, "http://10.0.0.2:3333");
    }

    #[test]
    fn unreadable_path_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ClientConfig::load_with(
            lookup_from(&[(ENV_CONFIG_PATH, missing.to_str().unwrap())]),
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigLoadError::Read { path, .. } if path == missing));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = ClientConfig::parse_from_str("=== nope", "inline").unwrap_err();
        assert!(err.to_string().contains("toml error"));
        assert!(err.to_string().contains("json error"));
    }
}

use thiserror::Error;
use url::Url;

use super::models::{ClientConfig, LocationDefaults, QueryConfig};
use super::models::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("server.base_url '{url}' is not a valid URL")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("server.base_url '{url}' must use http or https")]
    UnsupportedScheme { url: String },
    #[error("{field} must start with '/' (got '{value}')")]
    RelativeRoute { field: &'static str, value: String },
    #[error("location span must be positive and finite (got {latitude} x {longitude})")]
    InvalidSpan { latitude: f64, longitude: f64 },
    #[error("query.timeout must be greater than zero")]
    ZeroQueryTimeout,
    #[error("{field}: initial_backoff exceeds max_backoff")]
    InvertedBackoff { field: &'static str },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn apply_guard_rails(
    config: &ClientConfig,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    validate_server(config, &mut warnings)?;
    validate_location(&config.location)?;
    validate_query(&config.query)?;
    validate_retry("stream.retry", &config.stream.retry)?;

    if config.stream.retry.max_retries == 0 {
        warnings.push_with_hint(
            "stream.retry.max_retries is 0; a dropped subscription will not reconnect",
            "Run another search to re-open it",
        );
    }

    Ok(warnings)
}

fn validate_server(
    config: &ClientConfig,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    let raw = &config.server.base_url;
    let url = Url::parse(raw).map_err(|source| ConfigGuardRailError::InvalidBaseUrl {
        url: raw.clone(),
        source,
    })?;

    match url.scheme() {
        "https" => {}
        "http" => {
            let local = matches!(
                url.host_str(),
                Some("localhost") | Some("127.0.0.1") | Some("[::1]")
            );
            if !local {
                warnings.push_with_hint(
                    format!("server.base_url '{raw}' uses plain http"),
                    "Positions and filters are sent unencrypted; prefer https",
                );
            }
        }
        _ => {
            return Err(ConfigGuardRailError::UnsupportedScheme { url: raw.clone() });
        }
    }

    for (field, value) in [
        ("server.search_path", &config.server.search_path),
        ("server.events_path", &config.server.events_path),
    ] {
        if !value.starts_with('/') {
            return Err(ConfigGuardRailError::RelativeRoute {
                field,
                value: value.clone(),
            });
        }
    }

    Ok(())
}

fn validate_location(location: &LocationDefaults) -> Result<(), ConfigGuardRailError> {
    let valid = |span: f64| span.is_finite() && span > 0.0;
    if !valid(location.latitude_span) || !valid(location.longitude_span) {
        return Err(ConfigGuardRailError::InvalidSpan {
            latitude: location.latitude_span,
            longitude: location.longitude_span,
        });
    }
    Ok(())
}

fn validate_query(query: &QueryConfig) -> Result<(), ConfigGuardRailError> {
    if query.timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroQueryTimeout);
    }
    validate_retry("query.retry", &query.retry)
}

fn validate_retry(
    field: &'static str,
    retry: &RetryPolicy,
) -> Result<(), ConfigGuardRailError> {
    if retry.initial_backoff > retry.max_backoff {
        return Err(ConfigGuardRailError::InvertedBackoff { field });
    }
    Ok(())
}

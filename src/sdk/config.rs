use std::{env, num::NonZeroU32};
use thiserror::Error;

use super::routing::provider::remote::{DEFAULT_PROFILE, ORS_BASE_URL};
use super::util::rate_limit::DEFAULT_REQUESTS_PER_MINUTE;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Which road-distance backend is available.
#[derive(Debug, Clone, PartialEq)]
pub enum OrsBackend {
    Remote { api_key: String, base_url: String },
    Local { base_url: String },
    /// No service configured; only Haversine distances.
    Offline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrsConfig {
    pub backend: OrsBackend,
    pub profile: String,
    pub requests_per_minute: NonZeroU32,
}

impl OrsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = if let Some(base_url) = get("ORS_LOCAL_URL") {
            OrsBackend::Local { base_url }
        } else if let Some(api_key) = get("ORS_API_KEY") {
            OrsBackend::Remote {
                api_key,
                base_url: get("ORS_BASE_URL").unwrap_or_else(|| ORS_BASE_URL.to_string()),
            }
        } else {
            OrsBackend::Offline
        };

        let requests_per_minute = match get("ORS_RATE_PER_MINUTE") {
            Some(value) => value
                .trim()
                .parse::<NonZeroU32>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "ORS_RATE_PER_MINUTE",
                    value,
                })?,
            None => NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE)
                .unwrap_or(NonZeroU32::MIN),
        };

        Ok(Self {
            backend,
            profile: get("ORS_PROFILE").unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            requests_per_minute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<OrsConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        OrsConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_to_offline() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.backend, OrsBackend::Offline);
        assert_eq!(cfg.profile, "driving-car");
        assert_eq!(cfg.requests_per_minute.get(), 40);
    }

    #[test]
    fn test_remote_with_key() {
        let cfg = config(&[("ORS_API_KEY", "secret"), ("ORS_PROFILE", "foot-walking")]).unwrap();
        assert_eq!(
            cfg.backend,
            OrsBackend::Remote {
                api_key: "secret".to_string(),
                base_url: "https://api.openrouteservice.org".to_string(),
            }
        );
        assert_eq!(cfg.profile, "foot-walking");
    }

    #[test]
    fn test_local_takes_precedence() {
        let cfg = config(&[
            ("ORS_API_KEY", "secret"),
            ("ORS_LOCAL_URL", "http://localhost:8080/ors"),
        ])
        .unwrap();
        assert_eq!(
            cfg.backend,
            OrsBackend::Local {
                base_url: "http://localhost:8080/ors".to_string()
            }
        );
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let cfg = config(&[("ORS_API_KEY", "  ")]).unwrap();
        assert_eq!(cfg.backend, OrsBackend::Offline);
    }

    #[test]
    fn test_invalid_rate() {
        assert_eq!(
            config(&[("ORS_RATE_PER_MINUTE", "0")]),
            Err(ConfigError::InvalidNumber {
                name: "ORS_RATE_PER_MINUTE",
                value: "0".to_string()
            })
        );
        assert_eq!(
            config(&[("ORS_RATE_PER_MINUTE", "120")])
                .unwrap()
                .requests_per_minute
                .get(),
            120
        );
    }
}

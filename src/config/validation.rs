use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("api.base_url must not be empty")]
    EmptyBaseUrl,

    #[error("api.base_url must start with http:// or https:// (got '{0}')")]
    InvalidBaseUrl(String),

    #[error("api.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("broker.namespace must be a single topic segment (got '{0}')")]
    InvalidNamespace(String),
}

pub fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.api.base_url.is_empty() {
        return Err(ValidationError::EmptyBaseUrl);
    }
    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://") {
        return Err(ValidationError::InvalidBaseUrl(config.api.base_url.clone()));
    }
    if config.api.timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout);
    }
    if config.broker.namespace.is_empty() || config.broker.namespace.contains('/') {
        return Err(ValidationError::InvalidNamespace(config.broker.namespace.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::Config;

    #[test]
    fn test_defaults_validate() {
        let config = Config {
            api: Default::default(),
            broker: Default::default(),
            output: Default::default(),
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = Config {
            api: Default::default(),
            broker: Default::default(),
            output: Default::default(),
        };
        config.api.base_url = "localhost:7145".to_string();
        assert!(matches!(validate(&config), Err(ValidationError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_rejects_multi_segment_namespace() {
        let mut config = Config {
            api: Default::default(),
            broker: Default::default(),
            output: Default::default(),
        };
        config.broker.namespace = "control/tower".to_string();
        assert!(matches!(validate(&config), Err(ValidationError::InvalidNamespace(_))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config {
            api: Default::default(),
            broker: Default::default(),
            output: Default::default(),
        };
        config.api.timeout_secs = 0;
        assert!(matches!(validate(&config), Err(ValidationError::ZeroTimeout)));
    }
}

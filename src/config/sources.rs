use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "REPORTFORGE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/reportforge.toml";
const ENV_PREFIX: &str = "REPORTFORGE";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load secrets from environment variables into config
/// Secrets are never stored in TOML files, only in environment
fn load_secrets(config: &mut Config) {
    if let Ok(password) = env::var("API_AUTH_PASSWORD") {
        config.api.auth_password = Some(password);
    }
    if let Ok(password) = env::var("BROKER_PASSWORD") {
        config.broker.password = Some(password);
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    // Start with defaults (handled by struct Default implementations)
    // Add TOML file if it exists (optional)
    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // Add environment variable overrides
    // REPORTFORGE__BROKER__NAMESPACE -> broker.namespace
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut config: Config = config.try_deserialize()?;

    // Load secrets from environment variables
    load_secrets(&mut config);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.api.base_url, "https://localhost:7145");
        assert_eq!(config.broker.namespace, "controltower");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[api]
base_url = "https://reports.example.com"
timeout_secs = 15

[broker]
host = "broker.example.com"
namespace = "plantfloor"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.api.base_url, "https://reports.example.com");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.broker.host, "broker.example.com");
        assert_eq!(config.broker.namespace, "plantfloor");
        // Untouched sections keep their defaults.
        assert_eq!(config.broker.port, 1883);
    }

    #[test]
    fn test_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[api]
base_url = "https://localhost:7145"
timeout_secs = 60
auth_email = "service@example.com"

[broker]
host = "localhost"
port = 1883
namespace = "controltower"
client_id = "reportforge-1"
username = "reports"

[output]
document_dir = "out/documents"
image_base_path = "/srv/report_images"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.api.auth_email, "service@example.com");
        assert_eq!(config.broker.client_id, "reportforge-1");
        assert_eq!(config.broker.username.as_deref(), Some("reports"));
        // Secrets never come from the file.
        assert!(config.api.auth_password.is_none());
        assert!(config.broker.password.is_none());
        assert_eq!(config.output.image_base_path.to_str(), Some("/srv/report_images"));
    }
}

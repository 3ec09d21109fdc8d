use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Upstream report API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout applied to every outbound HTTP call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_auth_email")]
    pub auth_email: String,
    /// Signin password (loaded from environment, not from config file)
    #[serde(skip)]
    pub auth_password: Option<String>,
    /// Accept self-signed certificates, for dev deployments of the API
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            auth_email: default_auth_email(),
            auth_password: None,
            accept_invalid_certs: false,
        }
    }
}

fn default_base_url() -> String {
    "https://localhost:7145".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_auth_email() -> String {
    "system@gmail.com".to_string()
}

/// Pub/sub channel configuration
///
/// The transport itself is an external collaborator; these settings cover the
/// topic namespace and the connection details a transport adapter needs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerConfig {
    #[serde(default = "default_broker_host")]
    pub host: String,
    #[serde(default = "default_broker_port")]
    pub port: u16,
    /// First topic segment on both the request and status channels
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    pub username: Option<String>,
    /// Broker password (loaded from environment, not from config file)
    #[serde(skip)]
    pub password: Option<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: default_broker_host(),
            port: default_broker_port(),
            namespace: default_namespace(),
            client_id: default_client_id(),
            username: None,
            password: None,
        }
    }
}

fn default_broker_host() -> String {
    "localhost".to_string()
}

fn default_broker_port() -> u16 {
    1883
}

fn default_namespace() -> String {
    "controltower".to_string()
}

fn default_client_id() -> String {
    "reportforge".to_string()
}

/// Artifact output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory generated documents are written into
    #[serde(default = "default_document_dir")]
    pub document_dir: PathBuf,
    /// Base directory relative image references resolve against
    #[serde(default = "default_image_base_path")]
    pub image_base_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            document_dir: default_document_dir(),
            image_base_path: default_image_base_path(),
        }
    }
}

fn default_document_dir() -> PathBuf {
    PathBuf::from("generated_reports")
}

fn default_image_base_path() -> PathBuf {
    PathBuf::from("report_images")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config {
            api: ApiConfig::default(),
            broker: BrokerConfig::default(),
            output: OutputConfig::default(),
        };

        assert_eq!(config.api.base_url, "https://localhost:7145");
        assert_eq!(config.api.timeout_secs, 60);
        assert_eq!(config.broker.namespace, "controltower");
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.output.document_dir, PathBuf::from("generated_reports"));
    }
}

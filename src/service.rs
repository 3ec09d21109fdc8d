//! Service assembly and run loop.
//!
//! Wires the pipeline together from configuration: one shared HTTP client,
//! the credential manager, the report gateway, the composer, the document
//! sink, and the status publisher feeding the dispatcher. Runs until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::auth::CredentialManager;
use crate::broker::MemoryBroker;
use crate::compose::{Composer, JsonSink};
use crate::config::Config;
use crate::gateway::ReportClient;
use crate::job::{Dispatcher, StatusPublisher};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the dispatcher from configuration and an outbound publisher.
pub fn build_dispatcher(
    config: &Config,
    publisher: Arc<dyn crate::broker::MessagePublisher>,
) -> Result<Dispatcher, AnyError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .danger_accept_invalid_certs(config.api.accept_invalid_certs)
        .build()?;

    let password = config
        .api
        .auth_password
        .clone()
        .ok_or("API_AUTH_PASSWORD is not set")?;

    let auth = Arc::new(CredentialManager::new(
        http.clone(),
        &config.api.base_url,
        config.api.auth_email.clone(),
        password,
    ));
    let gateway = ReportClient::new(http, auth, &config.api.base_url);
    let composer = Composer::new(&config.output.image_base_path);
    let sink = Box::new(JsonSink::new(&config.output.document_dir));
    let status = StatusPublisher::new(publisher, config.broker.namespace.clone());

    Ok(Dispatcher::new(gateway, composer, sink, status))
}

/// Run the service until interrupted.
pub async fn run(config: Config) -> Result<(), AnyError> {
    let (broker, source) = MemoryBroker::new(256);
    let publisher = Arc::new(broker.publisher());

    let dispatcher = Arc::new(build_dispatcher(&config, publisher)?);

    info!(
        namespace = %config.broker.namespace,
        api = %config.api.base_url,
        "Report service starting"
    );

    tokio::select! {
        _ = dispatcher.run(source) => {},
        _ = shutdown_signal() => {},
    }

    Ok(())
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

//! Job dispatch.
//!
//! The dispatcher owns the intake loop: it pulls trigger messages off the
//! broker, resolves the report type from the topic, and spawns one task per
//! job so a slow report never blocks intake. Each job walks the pipeline
//! (fetch, normalize, compose, write) and reports its progress on the status
//! channel.

mod status;

pub use status::{JobStatus, StatusMessage, StatusPublisher};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::broker::{InboundMessage, MessageSource};
use crate::compose::{Composer, DocumentSink, SinkError};
use crate::gateway::{FetchError, ReportClient};
use crate::normalize;
use crate::report::ReportType;

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to write document: {0}")]
    Render(#[from] SinkError),
}

/// Trigger message body. Both fields are optional on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRequest {
    #[serde(default = "default_requested_by")]
    pub requested_by: String,
    #[serde(default = "Utc::now", rename = "timestamp")]
    pub requested_at: DateTime<Utc>,
}

fn default_requested_by() -> String {
    "Unknown".to_string()
}

impl Default for JobRequest {
    fn default() -> Self {
        Self {
            requested_by: default_requested_by(),
            requested_at: Utc::now(),
        }
    }
}

/// Split `{namespace}/{key}/{job_id}` into its key and job id.
///
/// Only the last two segments matter; anything before them is namespace and
/// is ignored, so deeper topic prefixes still parse.
pub fn parse_topic(topic: &str) -> Option<(&str, &str)> {
    let mut segments = topic.rsplit('/');
    let job_id = segments.next()?;
    let key = segments.next()?;
    // At least one namespace segment must precede the key.
    segments.next()?;
    if key.is_empty() || job_id.is_empty() {
        return None;
    }
    Some((key, job_id))
}

pub struct Dispatcher {
    gateway: ReportClient,
    composer: Composer,
    sink: Box<dyn DocumentSink>,
    status: StatusPublisher,
}

impl Dispatcher {
    pub fn new(
        gateway: ReportClient,
        composer: Composer,
        sink: Box<dyn DocumentSink>,
        status: StatusPublisher,
    ) -> Self {
        Self {
            gateway,
            composer,
            sink,
            status,
        }
    }

    /// Intake loop: runs until the message source closes.
    pub async fn run(self: Arc<Self>, mut source: impl MessageSource) {
        tracing::info!("Dispatcher started, waiting for job triggers");
        while let Some(message) = source.next().await {
            let dispatcher = Arc::clone(&self);
            tokio::spawn(async move {
                dispatcher.dispatch(message).await;
            });
        }
        tracing::info!("Message source closed, dispatcher stopping");
    }

    /// Handle one trigger message.
    async fn dispatch(&self, message: InboundMessage) {
        let Some((key, job_id)) = parse_topic(&message.topic) else {
            tracing::warn!(topic = %message.topic, "Dropping message with malformed topic");
            return;
        };
        let key = key.to_string();
        let job_id = job_id.to_string();

        let request = if message.payload.is_empty() {
            JobRequest::default()
        } else {
            match serde_json::from_slice(&message.payload) {
                Ok(request) => request,
                Err(err) => {
                    tracing::warn!(topic = %message.topic, %err, "Dropping message with malformed body");
                    return;
                }
            }
        };

        let Some(report_type) = ReportType::from_key(&key) else {
            tracing::warn!(%key, %job_id, "Unknown report type requested");
            self.status
                .publish(
                    &key,
                    &job_id,
                    JobStatus::Failed,
                    format!("Unknown report type: {key}"),
                    None,
                )
                .await;
            return;
        };

        self.run_job(report_type, &key, &job_id, request).await;
    }

    async fn run_job(&self, report_type: ReportType, key: &str, job_id: &str, request: JobRequest) {
        tracing::info!(%key, %job_id, "Starting report job");
        self.status
            .publish(
                key,
                job_id,
                JobStatus::Processing,
                "Report generation started",
                None,
            )
            .await;

        match self.execute(report_type, job_id, &request).await {
            Ok(file_name) => {
                tracing::info!(%key, %job_id, %file_name, "Report job completed");
                self.status
                    .publish(
                        key,
                        job_id,
                        JobStatus::Completed,
                        "Report generated successfully",
                        Some(file_name),
                    )
                    .await;
            }
            Err(err) => {
                tracing::error!(%key, %job_id, %err, "Report job failed");
                self.status
                    .publish(
                        key,
                        job_id,
                        JobStatus::Failed,
                        format!("Report generation failed: {err}"),
                        None,
                    )
                    .await;
            }
        }
    }

    async fn execute(
        &self,
        report_type: ReportType,
        job_id: &str,
        request: &JobRequest,
    ) -> Result<String, JobError> {
        let payload = self.gateway.fetch(report_type, job_id).await?;
        let record = normalize::normalize(report_type, &payload);
        let document = self.composer.compose(&record, request);

        let job_no = record.job_no.as_deref().unwrap_or(job_id);
        let stem = format!(
            "{}_Report_{}_{}",
            report_type.file_prefix(),
            job_no,
            Utc::now().format("%Y%m%d_%H%M%S")
        );

        let file_name = self.sink.write(&document, &stem)?;
        Ok(file_name)
    }
}

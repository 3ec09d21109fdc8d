//! Job status publishing.
//!
//! Status updates are fire-and-forget at-least-once notifications on the
//! `{namespace}/{key}_status/{job_id}` topic. A failed publish is logged and
//! swallowed; status delivery must never fail a job that otherwise succeeded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::broker::MessagePublisher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub report_id: String,
    pub status: JobStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Clone)]
pub struct StatusPublisher {
    publisher: Arc<dyn MessagePublisher>,
    namespace: String,
}

impl StatusPublisher {
    pub fn new(publisher: Arc<dyn MessagePublisher>, namespace: impl Into<String>) -> Self {
        Self {
            publisher,
            namespace: namespace.into(),
        }
    }

    /// Publish one status update for a job.
    ///
    /// The topic key is taken verbatim from the request topic so that jobs
    /// with unrecognised report types can still report failure on the channel
    /// the requester is watching.
    pub async fn publish(
        &self,
        key: &str,
        job_id: &str,
        status: JobStatus,
        message: impl Into<String>,
        file_name: Option<String>,
    ) {
        let topic = format!("{}/{key}_status/{job_id}", self.namespace);
        let body = StatusMessage {
            report_id: job_id.to_string(),
            status,
            message: message.into(),
            timestamp: Utc::now(),
            file_name,
        };

        let payload = match serde_json::to_vec(&body) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(%err, "Failed to serialize status message");
                return;
            }
        };

        if let Err(err) = self.publisher.publish(&topic, payload).await {
            tracing::warn!(%topic, %err, "Failed to publish status update");
        } else {
            tracing::debug!(%topic, status = ?status, "Published status update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBroker;

    #[tokio::test]
    async fn test_status_topic_and_body() {
        let (broker, _source) = MemoryBroker::new(8);
        let mut sub = broker.subscribe();
        let publisher = StatusPublisher::new(Arc::new(broker.publisher()), "controltower");

        publisher
            .publish(
                "server_pm",
                "42",
                JobStatus::Completed,
                "Report generated",
                Some("Server_PM_Report_J1.pdf".to_string()),
            )
            .await;

        let msg = sub.recv().await.unwrap();
        assert_eq!(msg.topic, "controltower/server_pm_status/42");

        let body: StatusMessage = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(body.report_id, "42");
        assert_eq!(body.status, JobStatus::Completed);
        assert_eq!(body.file_name.as_deref(), Some("Server_PM_Report_J1.pdf"));
    }

    #[tokio::test]
    async fn test_file_name_omitted_when_absent() {
        let (broker, _source) = MemoryBroker::new(8);
        let mut sub = broker.subscribe();
        let publisher = StatusPublisher::new(Arc::new(broker.publisher()), "controltower");

        publisher
            .publish("cm", "7", JobStatus::Processing, "Working", None)
            .await;

        let msg = sub.recv().await.unwrap();
        let raw: serde_json::Value = serde_json::from_slice(&msg.payload).unwrap();
        assert!(raw.get("file_name").is_none());
        assert_eq!(raw["status"], "processing");
    }

    #[tokio::test]
    async fn test_publish_failure_is_swallowed() {
        let (broker, _source) = MemoryBroker::new(8);
        // No subscribers, so the publish fails internally.
        let publisher = StatusPublisher::new(Arc::new(broker.publisher()), "controltower");
        publisher
            .publish("cm", "7", JobStatus::Failed, "boom", None)
            .await;
    }
}

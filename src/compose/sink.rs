//! Document output sinks.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::document::Document;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for composed documents.
///
/// The sink owns the file extension: it is handed the bare file stem and
/// returns the file name it actually wrote.
pub trait DocumentSink: Send + Sync {
    fn write(&self, document: &Document, file_stem: &str) -> Result<String, SinkError>;
}

/// Writes documents as pretty-printed JSON, one file per report.
pub struct JsonSink {
    output_dir: PathBuf,
}

impl JsonSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl DocumentSink for JsonSink {
    fn write(&self, document: &Document, file_stem: &str) -> Result<String, SinkError> {
        fs::create_dir_all(&self.output_dir)?;

        let file_name = format!("{file_stem}.json");
        let path = self.output_dir.join(&file_name);
        let body = serde_json::to_vec_pretty(document)?;
        fs::write(&path, body)?;

        tracing::info!(path = %path.display(), "Wrote composed document");
        Ok(file_name)
    }
}

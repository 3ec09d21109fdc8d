//! Canonical record types produced by normalization.
//!
//! Normalization turns the casing-inconsistent raw API payload into one of
//! these per-report shapes. Everything downstream (composition, sinks) works
//! on canonical records only.

use std::path::{Path, PathBuf};

use crate::report::ReportType;

/// Placeholder shown for values absent from the payload.
pub const UNSPECIFIED: &str = "N/A";

/// One normalized report, ready for document composition.
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    pub report_type: ReportType,
    pub title: String,
    pub job_no: Option<String>,
    /// Label/value pairs for the cover page.
    pub header: Vec<Field>,
    /// Label/value pairs for the sign-off page.
    pub sign_off: Vec<Field>,
    pub sections: Vec<Section>,
    /// Signature images, present only for signature report types.
    pub signatures: Vec<SignatureRef>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Semantic classification of a status-like cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Positive,
    Negative,
    Warning,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct CellValue {
    pub text: String,
    /// Set only for columns carrying status semantics.
    pub outcome: Option<Outcome>,
}

impl CellValue {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub body: SectionBody,
    /// Section-level remarks hoisted out of the row data, if any.
    pub remarks: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SectionBody {
    /// A uniform table of rows under fixed column headings.
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    },
    /// Repeated groups of label/value pairs, one group per physical unit
    /// (cabinet, DVR set, ...).
    Groups {
        entry_label: String,
        groups: Vec<Vec<Field>>,
    },
    /// A photo gallery.
    Gallery { images: Vec<ImageRef> },
    /// Free-form labelled text blocks.
    Text { boxes: Vec<Field> },
}

/// Reference to an uploaded image, as stored by the upstream system.
#[derive(Debug, Clone)]
pub struct ImageRef {
    pub directory: String,
    pub name: String,
}

impl ImageRef {
    /// Resolve against the configured image base path. Absolute stored
    /// directories are used as-is.
    pub fn resolve(&self, base: &Path) -> PathBuf {
        let dir = Path::new(&self.directory);
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            base.join(dir)
        };
        dir.join(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct SignatureRef {
    pub label: String,
    pub name: String,
    pub image: Option<ImageRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_resolve_relative() {
        let img = ImageRef {
            directory: "2024/07".to_string(),
            name: "photo.jpg".to_string(),
        };
        let resolved = img.resolve(Path::new("/srv/report_images"));
        assert_eq!(resolved, PathBuf::from("/srv/report_images/2024/07/photo.jpg"));
    }

    #[test]
    fn test_image_ref_resolve_absolute() {
        let img = ImageRef {
            directory: "/data/uploads".to_string(),
            name: "photo.jpg".to_string(),
        };
        let resolved = img.resolve(Path::new("/srv/report_images"));
        assert_eq!(resolved, PathBuf::from("/data/uploads/photo.jpg"));
    }
}

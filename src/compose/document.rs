//! Typeset-ready document primitives.
//!
//! A [`Document`] is the composer's output: a fixed page sequence of layout
//! blocks with all data binding and image placement already resolved. Sinks
//! serialize it; an external typesetting step turns it into the final PDF.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { text: String },
    Subheading { text: String },
    /// Placeholder callout shown where a section has no data.
    Notice { text: String },
    KeyValues { rows: Vec<KeyValue> },
    DataTable { columns: Vec<String>, rows: Vec<Vec<Cell>> },
    TextBox { label: String, text: String },
    ImageGrid { cells: Vec<GalleryCell> },
    SignatureRow { blocks: Vec<SignatureBlock> },
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
}

/// Visual status badge applied to classified cells. Unclassified status text
/// renders as plain text with no badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Positive,
    Negative,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GalleryCell {
    Image(PlacedImage),
    /// The image was referenced by the payload but could not be read.
    Unavailable { name: String },
    /// Grid padding so every row has a full complement of cells.
    Blank,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedImage {
    pub path: String,
    pub caption: String,
    /// Scaled dimensions in points, aspect ratio preserved.
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureBlock {
    pub label: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

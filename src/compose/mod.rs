//! Document composition.
//!
//! Turns a canonical record into a typeset-ready [`Document`] with a fixed
//! page sequence: cover page, sign-off page, then one page per section in
//! record order. Signature report types get a final signature row appended
//! to the sign-off page.

mod document;
mod gallery;
mod sink;

pub use document::{
    Badge, Block, Cell, Document, GalleryCell, KeyValue, Page, PlacedImage, SignatureBlock,
};
pub use gallery::{fit, pack, CARDS_PER_ROW, MAX_CARD_HEIGHT, MAX_CARD_WIDTH};
pub use sink::{DocumentSink, JsonSink, SinkError};

use std::path::PathBuf;

use crate::job::JobRequest;
use crate::normalize::{CanonicalRecord, Field, Outcome, Section, SectionBody};

const NO_DATA_NOTICE: &str = "No data available for this section.";
const NO_IMAGES_NOTICE: &str = "No images uploaded for this section.";

pub struct Composer {
    image_base: PathBuf,
}

impl Composer {
    pub fn new(image_base: impl Into<PathBuf>) -> Self {
        Self {
            image_base: image_base.into(),
        }
    }

    /// Compose the full document for one report.
    pub fn compose(&self, record: &CanonicalRecord, request: &JobRequest) -> Document {
        let mut pages = vec![self.cover_page(record, request), self.sign_off_page(record)];
        pages.extend(record.sections.iter().map(|s| self.section_page(s)));
        if !record.signatures.is_empty() {
            pages.push(self.signature_page(record));
        }

        Document {
            title: record.title.clone(),
            pages,
        }
    }

    fn cover_page(&self, record: &CanonicalRecord, request: &JobRequest) -> Page {
        let mut rows: Vec<KeyValue> = record.header.iter().map(key_value).collect();
        rows.push(KeyValue {
            label: "Generated By".to_string(),
            value: request.requested_by.clone(),
        });
        rows.push(KeyValue {
            label: "Generated At".to_string(),
            value: request.requested_at.format("%Y-%m-%d %H:%M").to_string(),
        });

        Page {
            blocks: vec![
                Block::Heading {
                    text: record.title.clone(),
                },
                Block::KeyValues { rows },
            ],
        }
    }

    fn sign_off_page(&self, record: &CanonicalRecord) -> Page {
        Page {
            blocks: vec![
                Block::Subheading {
                    text: "Sign-off Information".to_string(),
                },
                Block::KeyValues {
                    rows: record.sign_off.iter().map(key_value).collect(),
                },
            ],
        }
    }

    fn signature_page(&self, record: &CanonicalRecord) -> Page {
        Page {
            blocks: vec![
                Block::Subheading {
                    text: "Signatures".to_string(),
                },
                Block::SignatureRow {
                    blocks: record
                        .signatures
                        .iter()
                        .map(|sig| SignatureBlock {
                            label: sig.label.clone(),
                            name: sig.name.clone(),
                            image: sig
                                .image
                                .as_ref()
                                .map(|i| i.resolve(&self.image_base).display().to_string()),
                        })
                        .collect(),
                },
            ],
        }
    }

    fn section_page(&self, section: &Section) -> Page {
        let mut blocks = vec![Block::Subheading {
            text: section.title.clone(),
        }];

        match &section.body {
            SectionBody::Table { columns, rows } => {
                if rows.is_empty() {
                    blocks.push(notice(NO_DATA_NOTICE));
                } else {
                    blocks.push(Block::DataTable {
                        columns: columns.clone(),
                        rows: rows
                            .iter()
                            .map(|row| row.iter().map(cell).collect())
                            .collect(),
                    });
                }
            }
            SectionBody::Groups {
                entry_label,
                groups,
            } => {
                if groups.is_empty() {
                    blocks.push(notice(NO_DATA_NOTICE));
                } else {
                    for (i, group) in groups.iter().enumerate() {
                        blocks.push(Block::Subheading {
                            text: format!("{entry_label} #{}", i + 1),
                        });
                        blocks.push(Block::KeyValues {
                            rows: group.iter().map(key_value).collect(),
                        });
                    }
                }
            }
            SectionBody::Gallery { images } => {
                if images.is_empty() {
                    blocks.push(notice(NO_IMAGES_NOTICE));
                } else {
                    blocks.push(Block::ImageGrid {
                        cells: pack(images, &self.image_base),
                    });
                }
            }
            SectionBody::Text { boxes } => {
                for field in boxes {
                    blocks.push(Block::TextBox {
                        label: field.label.clone(),
                        text: field.value.clone(),
                    });
                }
            }
        }

        if let Some(remarks) = &section.remarks {
            blocks.push(Block::TextBox {
                label: "Remarks".to_string(),
                text: remarks.clone(),
            });
        }

        Page { blocks }
    }
}

fn key_value(field: &Field) -> KeyValue {
    KeyValue {
        label: field.label.clone(),
        value: field.value.clone(),
    }
}

fn cell(value: &crate::normalize::CellValue) -> Cell {
    Cell {
        text: value.text.clone(),
        badge: value.outcome.and_then(|o| match o {
            Outcome::Positive => Some(Badge::Positive),
            Outcome::Negative => Some(Badge::Negative),
            Outcome::Warning => Some(Badge::Warning),
            Outcome::Unknown => None,
        }),
    }
}

fn notice(text: &str) -> Block {
    Block::Notice {
        text: text.to_string(),
    }
}

//! Image gallery packing.
//!
//! Galleries render as a two-column card grid. Each image is scaled down to
//! fit its card while preserving aspect ratio (never scaled up), and the
//! final row is padded with blank cells so the grid is always rectangular.

use std::path::Path;

use crate::normalize::ImageRef;

use super::document::{GalleryCell, PlacedImage};

pub const CARDS_PER_ROW: usize = 2;

/// Card interior in points (2.6in x 1.7in).
pub const MAX_CARD_WIDTH: f32 = 187.2;
pub const MAX_CARD_HEIGHT: f32 = 122.4;

/// Scale dimensions to fit a bounding box, preserving aspect ratio and never
/// enlarging.
pub fn fit(width: f32, height: f32, max_width: f32, max_height: f32) -> (f32, f32) {
    let scale = (max_width / width).min(max_height / height).min(1.0);
    (width * scale, height * scale)
}

/// Pack image references into a rectangular gallery grid.
///
/// Images that cannot be read from disk become `Unavailable` cells rather
/// than dropping out, so the reader can see which photos are missing. An
/// empty input produces an empty grid with no padding.
pub fn pack(images: &[ImageRef], base: &Path) -> Vec<GalleryCell> {
    let mut cells: Vec<GalleryCell> = images
        .iter()
        .map(|image| {
            let path = image.resolve(base);
            match image::image_dimensions(&path) {
                Ok((w, h)) => {
                    let (width, height) =
                        fit(w as f32, h as f32, MAX_CARD_WIDTH, MAX_CARD_HEIGHT);
                    GalleryCell::Image(PlacedImage {
                        path: path.display().to_string(),
                        caption: image.name.clone(),
                        width,
                        height,
                    })
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "Gallery image unreadable");
                    GalleryCell::Unavailable {
                        name: image.name.clone(),
                    }
                }
            }
        })
        .collect();

    while !cells.is_empty() && cells.len() % CARDS_PER_ROW != 0 {
        cells.push(GalleryCell::Blank);
    }

    cells
}

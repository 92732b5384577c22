//! Per-slide image archive export.

use crate::artifact::{sanitize_base, Artifact, DEFAULT_BASE_NAME};
use slidefix_core::{Error, Result, SlideDocument};
use slidefix_render::{raster, Compositor};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const EXPORTER: &str = "Image archive";

/// Writes every slide's current raster as a PNG entry of one ZIP archive.
#[derive(Debug, Clone)]
pub struct ArchiveExporter {
    base_name: String,
}

impl Default for ArchiveExporter {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_NAME)
    }
}

impl ArchiveExporter {
    pub fn new(base_name: &str) -> Self {
        Self {
            base_name: sanitize_base(base_name),
        }
    }

    /// Entry name for the 1-based slide `number`.
    pub fn entry_name(&self, number: usize) -> String {
        format!("{}_slide_{:02}.png", self.base_name, number)
    }

    pub fn export(&self, compositor: &Compositor, doc: &SlideDocument) -> Result<Artifact> {
        if doc.is_empty() {
            return Err(Error::EmptyDocument);
        }
        log::info!("Exporting {} slides as an image archive", doc.len());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        // PNG data is already compressed.
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default());

        for (idx, slide) in doc.slides().iter().enumerate() {
            let name = self.entry_name(idx + 1);
            let png = compositor
                .current_raster(slide)
                .and_then(|image| raster::encode_png(&image))
                .map_err(|e| export_error(format!("slide {}: {}", idx + 1, e)))?;

            zip.start_file(name.as_str(), options)
                .map_err(|e| export_error(format!("Failed to add '{}': {}", name, e)))?;
            zip.write_all(&png)?;
            log::debug!("Added {} ({} bytes)", name, png.len());
        }

        let bytes = zip
            .finish()
            .map_err(|e| export_error(format!("Failed to finish archive: {}", e)))?
            .into_inner();

        Ok(Artifact::new(
            bytes,
            format!("{}_images.zip", self.base_name),
            "application/zip",
        ))
    }
}

fn export_error(message: String) -> Error {
    Error::Export {
        exporter: EXPORTER,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_names_are_zero_padded() {
        let exporter = ArchiveExporter::new("deck");
        assert_eq!(exporter.entry_name(1), "deck_slide_01.png");
        assert_eq!(exporter.entry_name(12), "deck_slide_12.png");
        assert_eq!(exporter.entry_name(105), "deck_slide_105.png");
    }

    #[test]
    fn test_blank_base_name_falls_back() {
        assert_eq!(ArchiveExporter::new("  ").entry_name(3), "output_slide_03.png");
    }

    #[test]
    fn test_empty_document_refused() {
        let err = ArchiveExporter::default()
            .export(&Compositor::default(), &SlideDocument::default())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyDocument));
    }
}

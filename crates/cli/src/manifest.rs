//! Session manifest: the slides to load and what the analysis service said
//! about each of them.

use anyhow::{Context, Result};
use serde::Deserialize;
use slidefix_core::analysis::classify_failure;
use slidefix_core::{
    parse_analysis_response, AnalysisResult, ElementDescriptor, RasterHandle, RasterizedPage,
    SlideDocument, SlideDocumentBuilder,
};
use slidefix_render::raster;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Original file the slides were rendered from; names the artifacts.
    #[serde(default)]
    pub source: Option<String>,

    /// Fill for elements without their own background color.
    #[serde(default)]
    pub default_background: Option<String>,

    pub slides: Vec<SlideEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideEntry {
    /// Rendered page image, relative to the manifest.
    pub image: PathBuf,

    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,

    /// Per-slide override of the default background.
    #[serde(default)]
    pub background: Option<String>,

    /// Already parsed element descriptors.
    #[serde(default)]
    pub elements: Option<Vec<ElementDescriptor>>,

    /// Raw analysis service response text.
    #[serde(default)]
    pub analysis: Option<String>,

    /// Raw analysis service error message.
    #[serde(default)]
    pub error: Option<String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }

    /// Load every slide image and build the document in page order.
    pub fn into_document(self, base_dir: &Path) -> Result<SlideDocument> {
        let mut builder = SlideDocumentBuilder::new(self.slides.len());
        if let Some(color) = &self.default_background {
            builder = builder.with_default_background(color.clone());
        }

        let mut overrides = Vec::new();
        for (idx, entry) in self.slides.into_iter().enumerate() {
            let page = load_page(base_dir, idx + 1, &entry)?;
            overrides.push(entry.background);

            if let Some(raw) = entry.error {
                let message = classify_failure(&raw).user_message(&raw);
                builder.push_failed(page, message)?;
                continue;
            }
            let result = match (entry.elements, entry.analysis) {
                (Some(elements), _) => AnalysisResult {
                    elements,
                    warning: None,
                },
                (None, Some(text)) => parse_analysis_response(&text),
                (None, None) => AnalysisResult::default(),
            };
            builder.push_analyzed(page, result);
        }

        let mut slides = builder.finish().into_slides();
        for (slide, background) in slides.iter_mut().zip(overrides) {
            if background.is_some() {
                slide.background_color = background;
            }
        }
        Ok(SlideDocument::new(slides))
    }
}

fn load_page(base_dir: &Path, page_number: usize, entry: &SlideEntry) -> Result<RasterizedPage> {
    let path = base_dir.join(&entry.image);
    let bytes =
        fs::read(&path).with_context(|| format!("Failed to read slide image {}", path.display()))?;
    let raster = RasterHandle::from_encoded(bytes);

    let (width, height) = match (entry.width, entry.height) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            let image = raster::decode(&raster)
                .with_context(|| format!("Failed to decode slide image {}", path.display()))?;
            image.dimensions()
        }
    };
    log::debug!("Loaded page {} ({}x{}) from {}", page_number, width, height, path.display());

    Ok(RasterizedPage {
        page_number,
        raster,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_shape() {
        let manifest: Manifest = serde_json::from_str(
            r##"{
                "source": "deck.pdf",
                "defaultBackground": "#ffffff",
                "slides": [
                    {"image": "p1.png", "width": 1920, "height": 1080,
                     "elements": [{"type": "title", "content": "Hi", "x": 10, "y": 10, "w": 50, "h": 10}]},
                    {"image": "p2.png", "analysis": "```json\n{\"elements\": []}\n```"},
                    {"image": "p3.png", "error": "429 RESOURCE_EXHAUSTED", "background": "#000"}
                ]
            }"##,
        )
        .unwrap();

        assert_eq!(manifest.source.as_deref(), Some("deck.pdf"));
        assert_eq!(manifest.slides.len(), 3);
        assert_eq!(manifest.slides[0].width, Some(1920));
        assert_eq!(manifest.slides[0].elements.as_ref().unwrap()[0].content.as_deref(), Some("Hi"));
        assert!(manifest.slides[1].analysis.is_some());
        assert_eq!(manifest.slides[2].background.as_deref(), Some("#000"));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let manifest: Manifest =
            serde_json::from_str(r#"{"slides": [{"image": "does-not-exist.png", "width": 1, "height": 1}]}"#)
                .unwrap();
        let err = manifest.into_document(Path::new("/nonexistent-dir")).unwrap_err();
        assert!(err.to_string().contains("does-not-exist.png"));
    }
}

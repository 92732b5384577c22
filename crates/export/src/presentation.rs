//! Presentation (.pptx) export.

use crate::artifact::{sanitize_base, Artifact, DEFAULT_BASE_NAME};
use serde::{Deserialize, Serialize};
use slidefix_core::{Element, Error, Result, Slide, SlideDocument};
use slidefix_pptx::deck::{SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU};
use slidefix_pptx::{DeckOptions, DeckSlide, Picture, PictureFormat, PptxWriter, TextBox};
use slidefix_render::{raster, Compositor};

const EXPORTER: &str = "Presentation";

pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// How slide content is carried into the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    /// Source raster as background with live text boxes and notes.
    #[default]
    Editable,
    /// Flattened raster only.
    Image,
}

/// Builds a widescreen deck with one output slide per document slide.
#[derive(Debug, Clone)]
pub struct PresentationExporter {
    mode: PresentationMode,
    options: DeckOptions,
    base_name: String,
}

impl Default for PresentationExporter {
    fn default() -> Self {
        Self::new(PresentationMode::default())
    }
}

impl PresentationExporter {
    pub fn new(mode: PresentationMode) -> Self {
        Self {
            mode,
            options: DeckOptions::default(),
            base_name: DEFAULT_BASE_NAME.to_string(),
        }
    }

    pub fn with_options(mut self, options: DeckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_base_name(mut self, base: &str) -> Self {
        self.base_name = sanitize_base(base);
        self
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    pub fn export(&self, compositor: &Compositor, doc: &SlideDocument) -> Result<Artifact> {
        if doc.is_empty() {
            return Err(Error::EmptyDocument);
        }
        log::info!(
            "Exporting {} slides as {:?} presentation",
            doc.len(),
            self.mode
        );

        let slides = doc
            .slides()
            .iter()
            .enumerate()
            .map(|(idx, slide)| {
                self.deck_slide(compositor, slide).map_err(|e| Error::Export {
                    exporter: EXPORTER,
                    message: format!("slide {}: {}", idx + 1, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let bytes = PptxWriter::new()
            .with_options(self.options.clone())
            .to_bytes(&slides)
            .map_err(|e| Error::Export {
                exporter: EXPORTER,
                message: e.to_string(),
            })?;

        Ok(Artifact::new(
            bytes,
            format!("{}.pptx", self.base_name),
            PPTX_MIME,
        ))
    }

    fn deck_slide(&self, compositor: &Compositor, slide: &Slide) -> Result<DeckSlide> {
        match self.mode {
            PresentationMode::Editable => {
                let mut deck_slide = DeckSlide::new(source_picture(slide)?);
                deck_slide.text_boxes = slide.elements.iter().map(text_box).collect();
                let transcript = slide.transcript();
                if !transcript.is_empty() {
                    deck_slide.notes = Some(transcript);
                }
                Ok(deck_slide)
            }
            PresentationMode::Image if slide.has_elements() => {
                let png = compositor.flatten_png(slide)?;
                Ok(DeckSlide::new(Picture::new(png, PictureFormat::Png)))
            }
            PresentationMode::Image => Ok(DeckSlide::new(source_picture(slide)?)),
        }
    }
}

/// The source raster as an embeddable picture. PNG and JPEG pass through
/// untouched; anything else is decoded and re-encoded as PNG.
fn source_picture(slide: &Slide) -> Result<Picture> {
    if let Some(picture) = Picture::sniff(slide.raster.bytes().to_vec()) {
        return Ok(picture);
    }
    log::debug!(
        "Re-encoding page {} raster for embedding",
        slide.page_number
    );
    let image = raster::decode(&slide.raster)?;
    Ok(Picture::new(raster::encode_png(&image)?, PictureFormat::Png))
}

/// Place an element on the widescreen canvas.
fn text_box(element: &Element) -> TextBox {
    let rect = element
        .geometry
        .to_absolute(SLIDE_WIDTH_EMU as f64, SLIDE_HEIGHT_EMU as f64);
    TextBox {
        x: rect.x.round() as i64,
        y: rect.y.round() as i64,
        cx: rect.width.round() as i64,
        cy: rect.height.round() as i64,
        text: element.content.clone(),
        font_size_pt: element.style.font_size,
        color: element.style.text_color().to_rgb_hex(),
        bold: element.style.bold,
        alignment: element.style.alignment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidefix_core::{Alignment, Category, Geometry, Style};

    #[test]
    fn test_text_box_converts_percent_to_emu() {
        let element = Element::new(Category::Title, "Hello", Geometry::new(10.0, 20.0, 50.0, 10.0))
            .with_style(Style {
                font_size: 32.0,
                color: "#ff8800".to_string(),
                background_color: None,
                bold: true,
                alignment: Alignment::Right,
            });
        let tb = text_box(&element);
        assert_eq!(tb.x, 1_219_200);
        assert_eq!(tb.y, 1_371_600);
        assert_eq!(tb.cx, 6_096_000);
        assert_eq!(tb.cy, 685_800);
        assert_eq!(tb.font_size_pt, 32.0);
        assert_eq!(tb.color, "FF8800");
        assert!(tb.bold);
        assert_eq!(tb.alignment, Alignment::Right);
    }

    #[test]
    fn test_text_box_bad_color_uses_default() {
        let element = Element::new(Category::Text, "x", Geometry::new(0.0, 0.0, 100.0, 100.0))
            .with_style(Style {
                color: "nope".to_string(),
                ..Style::default()
            });
        let tb = text_box(&element);
        assert_eq!(tb.color, "333333");
        assert_eq!((tb.cx, tb.cy), (SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU));
    }

    #[test]
    fn test_empty_document_refused() {
        let err = PresentationExporter::default()
            .export(&Compositor::default(), &SlideDocument::default())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyDocument));
    }
}

//! Single tall image export: every slide stacked top to bottom.

use crate::artifact::{sanitize_base, Artifact, DEFAULT_BASE_NAME};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use slidefix_core::{Error, Result, SlideDocument};
use slidefix_render::{raster, Compositor};

const EXPORTER: &str = "Long image";

/// Stacks slides vertically at the widest slide's width.
#[derive(Debug, Clone)]
pub struct LongImageExporter {
    base_name: String,
}

impl Default for LongImageExporter {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_NAME)
    }
}

impl LongImageExporter {
    pub fn new(base_name: &str) -> Self {
        Self {
            base_name: sanitize_base(base_name),
        }
    }

    pub fn export(&self, compositor: &Compositor, doc: &SlideDocument) -> Result<Artifact> {
        if doc.is_empty() {
            return Err(Error::EmptyDocument);
        }
        log::info!("Exporting {} slides as a long image", doc.len());

        let rasters = doc
            .slides()
            .iter()
            .enumerate()
            .map(|(idx, slide)| {
                compositor
                    .current_raster(slide)
                    .map_err(|e| export_error(format!("slide {}: {}", idx + 1, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let image = stack(rasters)?;
        let bytes = raster::encode_png(&image).map_err(|e| export_error(e.to_string()))?;

        Ok(Artifact::new(
            bytes,
            format!("{}_long.png", self.base_name),
            "image/png",
        ))
    }
}

/// Scale each image to the widest width, keeping its aspect ratio, and stack
/// them in order.
pub fn stack(images: Vec<RgbaImage>) -> Result<RgbaImage> {
    let width = images.iter().map(|i| i.width()).max().unwrap_or(0);
    if width == 0 {
        return Err(export_error("slides have no width".to_string()));
    }

    let scaled: Vec<RgbaImage> = images
        .into_iter()
        .filter(|i| i.width() > 0 && i.height() > 0)
        .map(|image| scale_to_width(image, width))
        .collect();

    let height: u64 = scaled.iter().map(|i| u64::from(i.height())).sum();
    let height = u32::try_from(height)
        .map_err(|_| export_error(format!("combined height {} is too large", height)))?;

    let mut canvas = RgbaImage::new(width, height);
    let mut y: i64 = 0;
    for image in &scaled {
        imageops::replace(&mut canvas, image, 0, y);
        y += i64::from(image.height());
    }
    Ok(canvas)
}

fn scale_to_width(image: RgbaImage, width: u32) -> RgbaImage {
    if image.width() == width {
        return image;
    }
    let height = (f64::from(image.height()) * f64::from(width) / f64::from(image.width()))
        .round()
        .max(1.0) as u32;
    imageops::resize(&image, width, height, FilterType::Triangle)
}

fn export_error(message: String) -> Error {
    Error::Export {
        exporter: EXPORTER,
        message,
    }
}

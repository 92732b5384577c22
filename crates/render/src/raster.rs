//! Conversions between encoded rasters, RGBA buffers and drawing surfaces.

use image::{ImageFormat, RgbaImage};
use slidefix_core::{Error, RasterHandle, Result};
use std::io::Cursor;
use tiny_skia::{ColorU8, IntSize, Pixmap};

/// Decode a slide's source raster.
pub fn decode(handle: &RasterHandle) -> Result<RgbaImage> {
    if handle.is_empty() {
        return Err(Error::Decode("slide has no image data".into()));
    }
    image::load_from_memory(handle.bytes())
        .map(|img| img.to_rgba8())
        .map_err(|e| Error::Decode(e.to_string()))
}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| Error::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Copy an RGBA buffer into a premultiplied drawing surface.
pub fn to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or_else(|| {
        Error::Composite(format!(
            "invalid surface size {}x{}",
            image.width(),
            image.height()
        ))
    })?;

    let mut data = Vec::with_capacity(image.as_raw().len());
    for px in image.pixels() {
        let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    Pixmap::from_vec(data, size)
        .ok_or_else(|| Error::Composite("surface buffer has the wrong length".into()))
}

/// Copy a drawing surface back into a straight-alpha RGBA buffer.
pub fn from_pixmap(pixmap: &Pixmap) -> Result<RgbaImage> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| Error::Composite("surface buffer has the wrong length".into()))
}

//! Flattening of a slide's elements into its raster.

use crate::config::RenderConfig;
use crate::font::{FontBook, ScaledFont};
use crate::raster;
use crate::wrap::{line_width, wrap_text};
use image::RgbaImage;
use slidefix_core::{Alignment, Color, Element, Error, Result, Slide};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Stroke width, relative to the font size, used to embolden a regular face.
const SYNTHETIC_BOLD_STROKE: f32 = 1.0 / 24.0;

/// Bakes elements onto slide rasters.
///
/// Output depends only on the slide and the compositor's fonts and config:
/// flattening the same slide twice yields identical pixels.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: RenderConfig,
    fonts: FontBook,
}

impl Compositor {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            config: RenderConfig::default(),
            fonts,
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The slide as it currently looks: flattened when it has elements,
    /// otherwise the decoded source raster.
    pub fn current_raster(&self, slide: &Slide) -> Result<RgbaImage> {
        if slide.has_elements() {
            raster::from_pixmap(&self.flatten(slide)?)
        } else {
            raster::decode(&slide.raster)
        }
    }

    /// Flatten and encode as PNG.
    pub fn flatten_png(&self, slide: &Slide) -> Result<Vec<u8>> {
        self.flatten(slide)?
            .encode_png()
            .map_err(|e| Error::Encode(e.to_string()))
    }

    /// Draw the source raster at native size, then every element in order.
    pub fn flatten(&self, slide: &Slide) -> Result<Pixmap> {
        let background = raster::decode(&slide.raster).map_err(|e| match e {
            Error::Decode(msg) => {
                Error::Composite(format!("slide {}: {}", slide.page_number, msg))
            }
            other => other,
        })?;
        if background.dimensions() != (slide.width, slide.height) {
            log::debug!(
                "Slide {} raster is {}x{}, expected {}x{}",
                slide.page_number,
                background.width(),
                background.height(),
                slide.width,
                slide.height
            );
        }

        let mut surface = raster::to_pixmap(&background)?;
        for element in &slide.elements {
            self.paint_element(&mut surface, slide, element);
        }
        Ok(surface)
    }

    fn paint_element(&self, surface: &mut Pixmap, slide: &Slide, element: &Element) {
        let (width, height) = (surface.width(), surface.height());
        let rect = element.geometry.to_absolute(f64::from(width), f64::from(height));
        let (x, y, w, h) = (
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        );

        // Opaque sticker over the source text.
        if let Some(r) = Rect::from_xywh(x, y, w, h) {
            let fill = paint_for(slide.effective_background(element), false);
            surface.fill_rect(r, &fill, Transform::identity(), None);
        }

        let px = self.config.font_px(element.style.font_size, width);
        let (face, synthetic_bold) = self.fonts.face(element.style.bold);
        let font = ScaledFont::new(face, px);

        let mut outlines = PathBuilder::new();
        let mut drawable = false;
        for line in self.layout_lines(element, (x, y, w, h), &font) {
            let baseline = line.top + font.ascent();
            drawable |= font.outline_line(&line.text, line.x, baseline, &mut outlines);
        }

        if !drawable {
            return;
        }
        let Some(path) = outlines.finish() else {
            return;
        };
        let paint = paint_for(element.style.text_color(), true);
        surface.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        if synthetic_bold {
            let stroke = Stroke {
                width: px * SYNTHETIC_BOLD_STROKE,
                ..Stroke::default()
            };
            surface.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Wrap `element`'s text inside its box (x, y, w, h in surface pixels),
    /// align each line and drop the lines that would cross the bottom edge.
    pub(crate) fn layout_lines(
        &self,
        element: &Element,
        (x, y, w, h): (f32, f32, f32, f32),
        font: &ScaledFont<'_>,
    ) -> Vec<PlacedLine> {
        let px = font.px();
        let padding = self.config.padding();
        let line_advance = px * self.config.line_height();

        let mut placed = Vec::new();
        for (i, text) in wrap_text(&element.content, w - padding * 2.0, |c| font.advance(c))
            .into_iter()
            .enumerate()
        {
            let top = y + padding + i as f32 * line_advance;
            if top + px > y + h {
                break;
            }
            let x = match element.style.alignment {
                Alignment::Left => x + padding,
                Alignment::Center => x + w / 2.0 - line_width(&text, |c| font.advance(c)) / 2.0,
                Alignment::Right => x + w - padding - line_width(&text, |c| font.advance(c)),
            };
            placed.push(PlacedLine { text, x, top });
        }
        placed
    }
}

/// A wrapped line positioned on the surface.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedLine {
    pub(crate) text: String,
    /// Pen start.
    pub(crate) x: f32,
    /// Top of the line box.
    pub(crate) top: f32,
}

fn paint_for(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = anti_alias;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use slidefix_core::{Category, Geometry, RasterHandle, RasterizedPage, Style};

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        raster::encode_png(&RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
    }

    fn slide(width: u32, height: u32) -> Slide {
        Slide::new(RasterizedPage {
            page_number: 1,
            raster: RasterHandle::from_encoded(png(width, height, [200, 10, 10, 255])),
            width,
            height,
        })
    }

    fn sticker(bg: Option<&str>) -> Element {
        Element::new(Category::Text, "안녕하세요", Geometry::new(25.0, 25.0, 50.0, 50.0)).with_style(
            Style {
                background_color: bg.map(str::to_string),
                ..Style::default()
            },
        )
    }

    #[test]
    fn test_sticker_occludes_source() {
        let mut s = slide(100, 40);
        s.elements.push(sticker(Some("#00ff00")));
        let out = raster::from_pixmap(&Compositor::default().flatten(&s).unwrap()).unwrap();

        assert_eq!(out.dimensions(), (100, 40));
        assert_eq!(out.get_pixel(50, 20), &Rgba([0, 255, 0, 255]));
        assert_eq!(out.get_pixel(5, 5), &Rgba([200, 10, 10, 255]));
        assert_eq!(out.get_pixel(95, 35), &Rgba([200, 10, 10, 255]));
    }

    #[test]
    fn test_background_fallbacks() {
        let mut s = slide(100, 40);
        s.elements.push(sticker(None));
        let out = raster::from_pixmap(&Compositor::default().flatten(&s).unwrap()).unwrap();
        assert_eq!(out.get_pixel(50, 20), &Rgba([255, 255, 255, 255]));

        s.background_color = Some("#000080".into());
        let out = raster::from_pixmap(&Compositor::default().flatten(&s).unwrap()).unwrap();
        assert_eq!(out.get_pixel(50, 20), &Rgba([0, 0, 128, 255]));
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let mut s = slide(64, 36);
        s.elements.push(sticker(Some("#ffffff")));
        s.elements.push(Element::new(
            Category::Title,
            "repeat",
            Geometry::new(0.0, 0.0, 40.0, 20.0),
        ));
        let compositor = Compositor::default();
        let a = compositor.flatten_png(&s).unwrap();
        let b = compositor.flatten_png(&s).unwrap();
        assert_eq!(a, b);
    }

    fn text(content: &str, alignment: Alignment) -> Element {
        Element::new(Category::Text, content, Geometry::new(0.0, 0.0, 50.0, 50.0)).with_style(
            Style {
                font_size: 20.0,
                alignment,
                ..Style::default()
            },
        )
    }

    fn assert_near(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 1e-3, "{} != {}", actual, expected);
    }

    #[test]
    fn test_layout_stops_at_box_bottom() {
        // 20px text advances 26px per line; the box ends at y = 110.
        let font = ScaledFont::new(None, 20.0);
        let lines = Compositor::default().layout_lines(
            &text("a\nb\nc\nd", Alignment::Left),
            (100.0, 50.0, 200.0, 60.0),
            &font,
        );
        let tops: Vec<f32> = lines.iter().map(|l| l.top).collect();
        assert_eq!(lines.len(), 2);
        assert_near(tops[0], 54.0);
        assert_near(tops[1], 80.0);
        assert_eq!(lines[1].text, "b");
    }

    #[test]
    fn test_layout_alignment() {
        // Four ASCII characters at fallback metrics are 44px wide.
        let font = ScaledFont::new(None, 20.0);
        let compositor = Compositor::default();
        let x_for = |alignment| {
            let lines =
                compositor.layout_lines(&text("abcd", alignment), (100.0, 50.0, 200.0, 60.0), &font);
            assert_eq!(lines.len(), 1);
            lines[0].x
        };
        assert_near(x_for(Alignment::Left), 104.0);
        assert_near(x_for(Alignment::Center), 178.0);
        assert_near(x_for(Alignment::Right), 252.0);
    }

    #[test]
    fn test_layout_wraps_text_without_spaces() {
        // 52px of usable width fits two 20px wide characters.
        let font = ScaledFont::new(None, 20.0);
        let lines = Compositor::default().layout_lines(
            &text("가나다라마바", Alignment::Left),
            (0.0, 0.0, 60.0, 100.0),
            &font,
        );
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["가나", "다라", "마바"]);
    }

    #[test]
    fn test_layout_empty_box_places_nothing() {
        let font = ScaledFont::new(None, 20.0);
        let lines = Compositor::default().layout_lines(
            &text("abc", Alignment::Left),
            (0.0, 0.0, 0.0, 0.0),
            &font,
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn test_flatten_with_glyphs_is_deterministic() {
        let fonts = FontBook::system();
        if fonts.is_empty() {
            log::warn!("No system font available; glyph drawing not exercised");
            return;
        }
        let mut s = slide(200, 100);
        let style = Style {
            font_size: 48.0,
            color: "#000000".to_string(),
            background_color: Some("#ffffff".to_string()),
            bold: true,
            alignment: Alignment::Center,
        };
        s.elements.push(
            Element::new(Category::Title, "Hello 안녕", Geometry::new(0.0, 0.0, 100.0, 100.0))
                .with_style(style),
        );
        let compositor = Compositor::new(fonts);
        let a = compositor.flatten_png(&s).unwrap();
        let b = compositor.flatten_png(&s).unwrap();
        assert_eq!(a, b);

        // Some ink lands on the white sticker.
        let out = raster::from_pixmap(&compositor.flatten(&s).unwrap()).unwrap();
        assert!(out.pixels().any(|p| p.0[0] < 128));
    }

    #[test]
    fn test_current_raster_without_elements_is_source() {
        let s = slide(8, 8);
        let out = Compositor::default().current_raster(&s).unwrap();
        assert_eq!(out.get_pixel(3, 3), &Rgba([200, 10, 10, 255]));
    }

    #[test]
    fn test_undecodable_raster_is_composite_error() {
        let mut s = slide(8, 8);
        s.raster = RasterHandle::from_encoded(vec![0u8; 8]);
        s.elements.push(sticker(None));
        let err = Compositor::default().flatten(&s).unwrap_err();
        assert!(matches!(err, Error::Composite(_)));
    }

    #[test]
    fn test_zero_sized_element_is_skipped() {
        let mut s = slide(20, 20);
        s.elements.push(Element::new(
            Category::Text,
            "x",
            Geometry::new(50.0, 50.0, 0.0, 0.0),
        ));
        let out = raster::from_pixmap(&Compositor::default().flatten(&s).unwrap()).unwrap();
        assert_eq!(out.get_pixel(10, 10), &Rgba([200, 10, 10, 255]));
    }
}

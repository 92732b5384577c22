//! Domain types for slides and the text regions placed on them.

use crate::color::{Color, NEUTRAL_BACKGROUND};
use crate::geometry::Geometry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Smallest font size, in points, a property edit may set.
pub const MIN_FONT_SIZE: f64 = 6.0;

/// Largest font size, in points, a property edit may set.
pub const MAX_FONT_SIZE: f64 = 120.0;

/// What kind of text an element holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Title,
    Subtitle,
    #[default]
    Text,
    Caption,
}

/// Horizontal text alignment inside an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Visual styling of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Font size in points, relative to a 960-unit wide slide.
    pub font_size: f64,

    /// Text color as a hex string.
    pub color: String,

    /// Fill behind the text. Falls back to the slide default when absent.
    pub background_color: Option<String>,

    pub bold: bool,

    pub alignment: Alignment,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            color: "#333333".to_string(),
            background_color: None,
            bold: false,
            alignment: Alignment::Left,
        }
    }
}

impl Style {
    /// Parsed text color.
    pub fn text_color(&self) -> Color {
        Color::parse_or(&self.color, crate::color::DEFAULT_TEXT)
    }
}

/// A positioned, styled text region on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub category: Category,

    /// Text content. May contain explicit `\n` line breaks.
    pub content: String,

    pub geometry: Geometry,

    pub style: Style,
}

impl Element {
    pub fn new(category: Category, content: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            category,
            content: content.into(),
            geometry: geometry.clamped(),
            style: Style::default(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// The element inserted by "add text" in the editor.
    pub fn placeholder() -> Self {
        Self::new(Category::Text, "Enter text", Geometry::new(35.0, 45.0, 30.0, 10.0)).with_style(
            Style {
                font_size: 18.0,
                ..Style::default()
            },
        )
    }

    /// Apply a partial update. Geometry is clamped and font size bounded.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(x) = patch.x {
            self.geometry.x = x;
        }
        if let Some(y) = patch.y {
            self.geometry.y = y;
        }
        if let Some(w) = patch.w {
            self.geometry.w = w;
        }
        if let Some(h) = patch.h {
            self.geometry.h = h;
        }
        self.geometry = self.geometry.clamped();

        if let Some(size) = patch.font_size {
            self.style.font_size = if size.is_finite() {
                size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
            } else {
                Style::default().font_size
            };
        }
        if let Some(color) = &patch.color {
            self.style.color = color.clone();
        }
        if let Some(background) = &patch.background_color {
            self.style.background_color = background.clone();
        }
        if let Some(bold) = patch.bold {
            self.style.bold = bold;
        }
        if let Some(alignment) = patch.alignment {
            self.style.alignment = alignment;
        }
    }
}

/// A partial update to an element. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
    /// `Some(None)` clears the element's own background.
    pub background_color: Option<Option<String>>,
    pub bold: Option<bool>,
    pub alignment: Option<Alignment>,
}

impl ElementPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            w: Some(geometry.w),
            h: Some(geometry.h),
            ..Self::default()
        }
    }
}

/// Encoded bytes of a slide's source raster.
///
/// The document never decodes these; only the compositor and exporters do.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterHandle(Arc<[u8]>);

impl RasterHandle {
    pub fn from_encoded(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RasterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RasterHandle({} bytes)", self.0.len())
    }
}

/// A rendered source page as handed over by the rasterizer.
#[derive(Debug, Clone)]
pub struct RasterizedPage {
    /// 1-based page number in the source file.
    pub page_number: usize,
    pub raster: RasterHandle,
    pub width: u32,
    pub height: u32,
}

/// One page-equivalent unit: a background raster plus its text regions.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based page number in the source file.
    pub page_number: usize,

    pub raster: RasterHandle,

    /// Raster size in pixels.
    pub width: u32,
    pub height: u32,

    /// Fill for elements without their own background color.
    pub background_color: Option<String>,

    /// Elements in z-order (first is bottom-most).
    pub elements: Vec<Element>,

    /// Analysis failed for this slide.
    pub error: Option<String>,

    /// Analysis succeeded with a caveat.
    pub warning: Option<String>,
}

impl Slide {
    pub fn new(page: RasterizedPage) -> Self {
        Self {
            page_number: page.page_number,
            raster: page.raster,
            width: page.width,
            height: page.height,
            background_color: None,
            elements: Vec::new(),
            error: None,
            warning: None,
        }
    }

    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// The fill painted behind an element: its own color, else the slide
    /// default, else white.
    pub fn effective_background(&self, element: &Element) -> Color {
        element
            .style
            .background_color
            .as_deref()
            .and_then(parse_logged)
            .or_else(|| self.background_color.as_deref().and_then(parse_logged))
            .unwrap_or(NEUTRAL_BACKGROUND)
    }

    /// Non-empty element contents, one per line.
    pub fn transcript(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.content.as_str())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_elements(&self) -> bool {
        !self.elements.is_empty()
    }
}

fn parse_logged(input: &str) -> Option<Color> {
    let color = Color::parse_hex(input);
    if color.is_none() {
        log::warn!("Ignoring unrecognized background color {:?}", input);
    }
    color
}

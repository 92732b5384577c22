//! Compositor settings.

/// Slide width, in units, that analysis font sizes are expressed against.
pub const REFERENCE_WIDTH: f32 = 960.0;

/// Layout constants used when painting element text.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Width the analysis font sizes are relative to.
    reference_width: f32,

    /// Inset between an element's edge and its text, in pixels.
    padding: f32,

    /// Smallest font size painted, in pixels.
    min_font_px: f32,

    /// Line advance as a multiple of the font size.
    line_height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            reference_width: REFERENCE_WIDTH,
            padding: 4.0,
            min_font_px: 8.0,
            line_height: 1.3,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_width(mut self, width: f32) -> Self {
        self.reference_width = width.max(1.0);
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    pub fn with_min_font_px(mut self, px: f32) -> Self {
        self.min_font_px = px.max(1.0);
        self
    }

    pub fn with_line_height(mut self, factor: f32) -> Self {
        self.line_height = factor.max(0.1);
        self
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Font size in pixels for a surface `surface_width` pixels wide.
    pub fn font_px(&self, font_size_pt: f64, surface_width: u32) -> f32 {
        let scaled = font_size_pt as f32 * surface_width as f32 / self.reference_width;
        scaled.max(self.min_font_px)
    }
}

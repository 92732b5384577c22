//! Deck content handed to the writer.

use slidefix_core::Alignment;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Widescreen slide width: 13.333 in.
pub const SLIDE_WIDTH_EMU: i64 = 12_192_000;

/// Widescreen slide height: 7.5 in.
pub const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

/// Encoding of an embedded picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureFormat {
    Png,
    Jpeg,
}

impl PictureFormat {
    /// Detect format from magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        None
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// An encoded picture to embed.
#[derive(Debug, Clone)]
pub struct Picture {
    pub data: Vec<u8>,
    pub format: PictureFormat,
}

impl Picture {
    pub fn new(data: Vec<u8>, format: PictureFormat) -> Self {
        Self { data, format }
    }

    /// Wrap encoded bytes, detecting the format. `None` for unsupported data.
    pub fn sniff(data: Vec<u8>) -> Option<Self> {
        PictureFormat::from_magic(&data).map(|format| Self { data, format })
    }
}

/// An editable text region, in EMU.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    /// Text content; each `\n`-separated line becomes a paragraph.
    pub text: String,
    pub font_size_pt: f64,
    /// `RRGGBB`, no leading `#`.
    pub color: String,
    pub bold: bool,
    pub alignment: Alignment,
}

/// One output slide: a full-bleed picture, optional text boxes on top and
/// optional speaker notes.
#[derive(Debug, Clone)]
pub struct DeckSlide {
    pub background: Picture,
    pub text_boxes: Vec<TextBox>,
    pub notes: Option<String>,
}

impl DeckSlide {
    pub fn new(background: Picture) -> Self {
        Self {
            background,
            text_boxes: Vec::new(),
            notes: None,
        }
    }
}

/// Text settings applied to every text box.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckOptions {
    /// Typeface for Latin and East Asian runs.
    pub font_face: String,
    /// Language tag on text runs.
    pub language: String,
    /// Let the viewer shrink text that overflows its box.
    pub shrink_text: bool,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            font_face: "Pretendard".to_string(),
            language: "ko-KR".to_string(),
            shrink_text: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_magic() {
        assert_eq!(
            PictureFormat::from_magic(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(PictureFormat::Png)
        );
        assert_eq!(PictureFormat::from_magic(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(PictureFormat::Jpeg));
        assert_eq!(PictureFormat::from_magic(b"GIF89a"), None);
        assert_eq!(PictureFormat::from_magic(&[]), None);
    }

    #[test]
    fn test_widescreen_size() {
        let inches = SLIDE_WIDTH_EMU as f64 / EMU_PER_INCH;
        assert!((inches - 13.333).abs() < 0.001);
        assert_eq!(SLIDE_HEIGHT_EMU as f64 / EMU_PER_INCH, 7.5);
    }
}

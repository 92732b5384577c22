//! Font loading and glyph metrics for the compositor.

use slidefix_core::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tiny_skia::PathBuilder;

/// Advance of a narrow character, as a fraction of the font size, when no
/// font supplies one.
const FALLBACK_NARROW_ADVANCE: f32 = 0.55;

/// Advance of a wide (non-ASCII) character when no font supplies one.
const FALLBACK_WIDE_ADVANCE: f32 = 1.0;

/// Weight from which a face counts as bold.
const BOLD_WEIGHT: u16 = 600;

/// Raw font file bytes plus the face index inside the file.
#[derive(Clone)]
struct FaceData {
    data: Arc<Vec<u8>>,
    index: u32,
}

impl FaceData {
    fn parse(&self) -> Option<ttf_parser::Face<'_>> {
        match ttf_parser::Face::parse(&self.data, self.index) {
            Ok(face) => Some(face),
            Err(e) => {
                log::warn!("Failed to parse font face: {}", e);
                None
            }
        }
    }
}

/// The regular and bold faces the compositor paints with.
///
/// An empty book still lays text out, using fixed fallback advances, but
/// paints no glyphs.
#[derive(Clone, Default)]
pub struct FontBook {
    regular: Option<FaceData>,
    bold: Option<FaceData>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("regular", &self.regular.is_some())
            .field("bold", &self.bold.is_some())
            .finish()
    }
}

impl FontBook {
    /// A book without fonts.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pick a sans-serif regular and bold face from the installed fonts.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let book = Self::from_database(&db);
        if book.regular.is_none() {
            log::warn!("No system sans-serif font found; text will not be painted");
        }
        book
    }

    /// Load faces from a font file. A bold face in the same file is used for
    /// bold text when present.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_font_file(path)?;
        if db.is_empty() {
            return Err(Error::Composite(format!(
                "No usable font face in {}",
                path.display()
            )));
        }
        Ok(Self::from_database(&db))
    }

    /// Load faces from in-memory font data.
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_font_data(data);
        if db.is_empty() {
            return Err(Error::Composite("No usable font face in font data".into()));
        }
        Ok(Self::from_database(&db))
    }

    fn from_database(db: &fontdb::Database) -> Self {
        let lookup = |weight: fontdb::Weight| {
            let query = fontdb::Query {
                families: &[fontdb::Family::SansSerif],
                weight,
                ..fontdb::Query::default()
            };
            db.query(&query)
                .or_else(|| db.faces().next().map(|info| info.id))
                .and_then(|id| face_data(db, id))
        };

        let regular = lookup(fontdb::Weight::NORMAL);
        let bold = db
            .faces()
            .find(|info| info.weight.0 >= BOLD_WEIGHT)
            .and_then(|_| lookup(fontdb::Weight::BOLD));
        Self { regular, bold }
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none()
    }

    /// Parsed face for the requested weight.
    ///
    /// The boolean is true when bold was requested but only a regular face
    /// exists, so the caller should embolden the outlines itself.
    pub(crate) fn face(&self, bold: bool) -> (Option<ttf_parser::Face<'_>>, bool) {
        if bold {
            if let Some(face) = self.bold.as_ref().and_then(FaceData::parse) {
                return (Some(face), false);
            }
            let face = self.regular.as_ref().and_then(FaceData::parse);
            let synthetic = face.is_some();
            return (face, synthetic);
        }
        (
            self.regular
                .as_ref()
                .or(self.bold.as_ref())
                .and_then(FaceData::parse),
            false,
        )
    }
}

fn face_data(db: &fontdb::Database, id: fontdb::ID) -> Option<FaceData> {
    db.with_face_data(id, |data, index| FaceData {
        data: Arc::new(data.to_vec()),
        index,
    })
}

/// A face scaled to a pixel size, or fixed fallback metrics without one.
pub(crate) struct ScaledFont<'a> {
    face: Option<ttf_parser::Face<'a>>,
    px: f32,
}

impl<'a> ScaledFont<'a> {
    pub(crate) fn new(face: Option<ttf_parser::Face<'a>>, px: f32) -> Self {
        Self { face, px }
    }

    pub(crate) fn px(&self) -> f32 {
        self.px
    }

    fn scale(&self, face: &ttf_parser::Face<'_>) -> f32 {
        self.px / f32::from(face.units_per_em().max(1))
    }

    /// Horizontal advance of one character, in pixels.
    pub(crate) fn advance(&self, ch: char) -> f32 {
        if let Some(face) = &self.face {
            if let Some(advance) = face
                .glyph_index(ch)
                .and_then(|gid| face.glyph_hor_advance(gid))
            {
                return f32::from(advance) * self.scale(face);
            }
        }
        fallback_advance(ch, self.px)
    }

    /// Distance from the top of the line to the baseline, in pixels.
    pub(crate) fn ascent(&self) -> f32 {
        match &self.face {
            Some(face) => f32::from(face.ascender()) * self.scale(face),
            None => self.px * 0.8,
        }
    }

    /// Append the outlines of `line`, starting at pen position `(x, baseline)`.
    ///
    /// Returns false when no face is available to draw with.
    pub(crate) fn outline_line(
        &self,
        line: &str,
        x: f32,
        baseline: f32,
        builder: &mut PathBuilder,
    ) -> bool {
        let Some(face) = &self.face else {
            return false;
        };
        let scale = self.scale(face);
        let mut pen = x;
        for ch in line.chars() {
            if let Some(gid) = face.glyph_index(ch) {
                let mut sink = OutlineSink {
                    builder,
                    origin_x: pen,
                    baseline,
                    scale,
                };
                face.outline_glyph(gid, &mut sink);
            }
            pen += self.advance(ch);
        }
        true
    }
}

fn fallback_advance(ch: char, px: f32) -> f32 {
    if ch.is_ascii() {
        px * FALLBACK_NARROW_ADVANCE
    } else {
        px * FALLBACK_WIDE_ADVANCE
    }
}

/// Feeds font-unit glyph outlines into a pixel-space path.
struct OutlineSink<'b> {
    builder: &'b mut PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl OutlineSink<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for OutlineSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

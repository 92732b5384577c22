//! PPTX package writer.

use crate::deck::{DeckOptions, DeckSlide, TextBox, SLIDE_HEIGHT_EMU, SLIDE_WIDTH_EMU};
use crate::templates::*;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use slidefix_core::{Alignment, Error, Result};
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Relationship id of the first slide in presentation.xml.rels.
const FIRST_SLIDE_REL: usize = 6;

/// Notes page size: portrait 7.5 x 10 in.
const NOTES_WIDTH_EMU: i64 = 6_858_000;
const NOTES_HEIGHT_EMU: i64 = 9_144_000;

/// Writes decks as .pptx packages.
#[derive(Debug, Clone, Default)]
pub struct PptxWriter {
    options: DeckOptions,
}

impl PptxWriter {
    /// Create a writer with default text options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: DeckOptions) -> Self {
        self.options = options;
        self
    }

    /// Write a complete package into an in-memory buffer.
    pub fn to_bytes(&self, slides: &[DeckSlide]) -> Result<Vec<u8>> {
        Ok(self.write(slides, Cursor::new(Vec::new()))?.into_inner())
    }

    /// Write a complete package to `out`.
    pub fn write<W: Write + Seek>(&self, slides: &[DeckSlide], out: W) -> Result<W> {
        let any_notes = slides.iter().any(has_notes);
        let mut zip = ZipWriter::new(out);

        put(&mut zip, "[Content_Types].xml", &content_types(slides, any_notes)?)?;
        put(&mut zip, "_rels/.rels", &root_rels()?)?;
        put(&mut zip, "ppt/presentation.xml", &presentation(slides.len(), any_notes)?)?;
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &presentation_rels(slides.len(), any_notes)?,
        )?;
        put(&mut zip, "ppt/presProps.xml", PRES_PROPS.as_bytes())?;
        put(&mut zip, "ppt/viewProps.xml", VIEW_PROPS.as_bytes())?;
        put(&mut zip, "ppt/tableStyles.xml", TABLE_STYLES.as_bytes())?;
        put(&mut zip, "ppt/theme/theme1.xml", theme("Slide Theme").as_bytes())?;
        put(&mut zip, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER.as_bytes())?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS.as_bytes(),
        )?;
        put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT.as_bytes())?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            SLIDE_LAYOUT_RELS.as_bytes(),
        )?;
        if any_notes {
            put(&mut zip, "ppt/theme/theme2.xml", theme("Notes Theme").as_bytes())?;
            put(&mut zip, "ppt/notesMasters/notesMaster1.xml", NOTES_MASTER.as_bytes())?;
            put(
                &mut zip,
                "ppt/notesMasters/_rels/notesMaster1.xml.rels",
                NOTES_MASTER_RELS.as_bytes(),
            )?;
        }

        for (idx, slide) in slides.iter().enumerate() {
            let n = idx + 1;
            let media = format!("image{}.{}", n, slide.background.format.extension());
            store(&mut zip, &format!("ppt/media/{}", media), &slide.background.data)?;
            put(&mut zip, &format!("ppt/slides/slide{}.xml", n), &self.slide_xml(slide)?)?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                &slide_rels(n, &media, has_notes(slide))?,
            )?;
            if let Some(notes) = slide.notes.as_deref().filter(|n| !n.is_empty()) {
                put(
                    &mut zip,
                    &format!("ppt/notesSlides/notesSlide{}.xml", n),
                    &self.notes_xml(notes)?,
                )?;
                put(
                    &mut zip,
                    &format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", n),
                    &notes_rels(n)?,
                )?;
            }
            log::debug!(
                "Wrote slide {} with {} text boxes",
                n,
                slide.text_boxes.len()
            );
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish package: {}", e)))
    }

    fn slide_xml(&self, slide: &DeckSlide) -> Result<Vec<u8>> {
        let mut x = Xml::new()?;
        x.start("p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?;
        x.start("p:cSld", &[])?;
        x.start("p:spTree", &[])?;
        group_header(&mut x)?;

        // Full-bleed background picture.
        x.start("p:pic", &[])?;
        x.start("p:nvPicPr", &[])?;
        x.empty("p:cNvPr", &[("id", "2"), ("name", "Background")])?;
        x.start("p:cNvPicPr", &[])?;
        x.empty("a:picLocks", &[("noChangeAspect", "1")])?;
        x.end("p:cNvPicPr")?;
        x.empty("p:nvPr", &[])?;
        x.end("p:nvPicPr")?;
        x.start("p:blipFill", &[])?;
        x.empty("a:blip", &[("r:embed", "rId2")])?;
        x.start("a:stretch", &[])?;
        x.empty("a:fillRect", &[])?;
        x.end("a:stretch")?;
        x.end("p:blipFill")?;
        x.start("p:spPr", &[])?;
        transform(&mut x, 0, 0, SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU)?;
        rect_geometry(&mut x)?;
        x.end("p:spPr")?;
        x.end("p:pic")?;

        for (i, text_box) in slide.text_boxes.iter().enumerate() {
            self.text_box(&mut x, text_box, i + 3)?;
        }

        x.end("p:spTree")?;
        x.end("p:cSld")?;
        x.start("p:clrMapOvr", &[])?;
        x.empty("a:masterClrMapping", &[])?;
        x.end("p:clrMapOvr")?;
        x.end("p:sld")?;
        Ok(x.finish())
    }

    fn text_box(&self, x: &mut Xml, tb: &TextBox, shape_id: usize) -> Result<()> {
        let id = shape_id.to_string();
        let name = format!("Text {}", shape_id - 2);
        let size = font_size_hundredths(tb.font_size_pt).to_string();
        let algn = match tb.alignment {
            Alignment::Left => "l",
            Alignment::Center => "ctr",
            Alignment::Right => "r",
        };

        x.start("p:sp", &[])?;
        x.start("p:nvSpPr", &[])?;
        x.empty("p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        x.empty("p:cNvSpPr", &[("txBox", "1")])?;
        x.empty("p:nvPr", &[])?;
        x.end("p:nvSpPr")?;
        x.start("p:spPr", &[])?;
        transform(x, tb.x, tb.y, tb.cx, tb.cy)?;
        rect_geometry(x)?;
        x.empty("a:noFill", &[])?;
        x.end("p:spPr")?;

        x.start("p:txBody", &[])?;
        x.start(
            "a:bodyPr",
            &[("wrap", "square"), ("anchor", "t"), ("rtlCol", "0")],
        )?;
        if self.options.shrink_text {
            x.empty("a:normAutofit", &[])?;
        }
        x.end("a:bodyPr")?;
        x.empty("a:lstStyle", &[])?;

        for line in tb.text.split('\n') {
            x.start("a:p", &[])?;
            x.empty("a:pPr", &[("algn", algn)])?;
            let mut attrs = vec![("lang", self.options.language.as_str()), ("sz", size.as_str())];
            if tb.bold {
                attrs.push(("b", "1"));
            }
            attrs.push(("dirty", "0"));
            if line.is_empty() {
                x.empty("a:endParaRPr", &attrs)?;
            } else {
                x.start("a:r", &[])?;
                x.start("a:rPr", &attrs)?;
                x.start("a:solidFill", &[])?;
                x.empty("a:srgbClr", &[("val", tb.color.as_str())])?;
                x.end("a:solidFill")?;
                x.empty("a:latin", &[("typeface", self.options.font_face.as_str())])?;
                x.empty("a:ea", &[("typeface", self.options.font_face.as_str())])?;
                x.end("a:rPr")?;
                x.start("a:t", &[])?;
                x.text(line)?;
                x.end("a:t")?;
                x.end("a:r")?;
            }
            x.end("a:p")?;
        }

        x.end("p:txBody")?;
        x.end("p:sp")?;
        Ok(())
    }

    fn notes_xml(&self, notes: &str) -> Result<Vec<u8>> {
        let mut x = Xml::new()?;
        x.start("p:notes", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?;
        x.start("p:cSld", &[])?;
        x.start("p:spTree", &[])?;
        group_header(&mut x)?;

        x.start("p:sp", &[])?;
        x.start("p:nvSpPr", &[])?;
        x.empty("p:cNvPr", &[("id", "2"), ("name", "Slide Image Placeholder 1")])?;
        x.start("p:cNvSpPr", &[])?;
        x.empty(
            "a:spLocks",
            &[("noGrp", "1"), ("noRot", "1"), ("noChangeAspect", "1")],
        )?;
        x.end("p:cNvSpPr")?;
        x.start("p:nvPr", &[])?;
        x.empty("p:ph", &[("type", "sldImg")])?;
        x.end("p:nvPr")?;
        x.end("p:nvSpPr")?;
        x.empty("p:spPr", &[])?;
        x.end("p:sp")?;

        x.start("p:sp", &[])?;
        x.start("p:nvSpPr", &[])?;
        x.empty("p:cNvPr", &[("id", "3"), ("name", "Notes Placeholder 2")])?;
        x.start("p:cNvSpPr", &[])?;
        x.empty("a:spLocks", &[("noGrp", "1")])?;
        x.end("p:cNvSpPr")?;
        x.start("p:nvPr", &[])?;
        x.empty("p:ph", &[("type", "body"), ("idx", NOTES_BODY_IDX)])?;
        x.end("p:nvPr")?;
        x.end("p:nvSpPr")?;
        x.empty("p:spPr", &[])?;
        x.start("p:txBody", &[])?;
        x.empty("a:bodyPr", &[])?;
        x.empty("a:lstStyle", &[])?;
        for line in notes.split('\n') {
            x.start("a:p", &[])?;
            if line.is_empty() {
                x.empty("a:endParaRPr", &[("lang", self.options.language.as_str())])?;
            } else {
                x.start("a:r", &[])?;
                x.empty("a:rPr", &[("lang", self.options.language.as_str()), ("dirty", "0")])?;
                x.start("a:t", &[])?;
                x.text(line)?;
                x.end("a:t")?;
                x.end("a:r")?;
            }
            x.end("a:p")?;
        }
        x.end("p:txBody")?;
        x.end("p:sp")?;

        x.end("p:spTree")?;
        x.end("p:cSld")?;
        x.start("p:clrMapOvr", &[])?;
        x.empty("a:masterClrMapping", &[])?;
        x.end("p:clrMapOvr")?;
        x.end("p:notes")?;
        Ok(x.finish())
    }
}

fn has_notes(slide: &DeckSlide) -> bool {
    slide.notes.as_deref().is_some_and(|n| !n.is_empty())
}

/// Font size in DrawingML hundredths of a point, within the allowed range.
fn font_size_hundredths(pt: f64) -> i64 {
    let sz = if pt.is_finite() { (pt * 100.0).round() as i64 } else { 1800 };
    sz.clamp(100, 400_000)
}

fn content_types(slides: &[DeckSlide], any_notes: bool) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    x.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELS)])?;
    x.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;

    let mut formats: Vec<_> = slides.iter().map(|s| s.background.format).collect();
    formats.sort_by_key(|f| f.extension());
    formats.dedup();
    for format in formats {
        x.empty(
            "Default",
            &[("Extension", format.extension()), ("ContentType", format.content_type())],
        )?;
    }

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
        ("/ppt/presProps.xml".to_string(), CT_PRES_PROPS),
        ("/ppt/viewProps.xml".to_string(), CT_VIEW_PROPS),
        ("/ppt/tableStyles.xml".to_string(), CT_TABLE_STYLES),
        ("/ppt/theme/theme1.xml".to_string(), CT_THEME),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_SLIDE_LAYOUT),
    ];
    if any_notes {
        overrides.push(("/ppt/theme/theme2.xml".to_string(), CT_THEME));
        overrides.push(("/ppt/notesMasters/notesMaster1.xml".to_string(), CT_NOTES_MASTER));
    }
    for (idx, slide) in slides.iter().enumerate() {
        overrides.push((format!("/ppt/slides/slide{}.xml", idx + 1), CT_SLIDE));
        if has_notes(slide) {
            overrides.push((format!("/ppt/notesSlides/notesSlide{}.xml", idx + 1), CT_NOTES_SLIDE));
        }
    }
    for (part, content_type) in &overrides {
        x.empty("Override", &[("PartName", part.as_str()), ("ContentType", *content_type)])?;
    }

    x.end("Types")?;
    Ok(x.finish())
}

fn root_rels() -> Result<Vec<u8>> {
    relationships(&[("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string())])
}

fn presentation(slide_count: usize, any_notes: bool) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start(
        "p:presentation",
        &[
            ("xmlns:a", NS_A),
            ("xmlns:r", NS_R),
            ("xmlns:p", NS_P),
            ("saveSubsetFonts", "1"),
        ],
    )?;
    x.start("p:sldMasterIdLst", &[])?;
    x.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    x.end("p:sldMasterIdLst")?;

    if any_notes {
        let rid = format!("rId{}", FIRST_SLIDE_REL + slide_count);
        x.start("p:notesMasterIdLst", &[])?;
        x.empty("p:notesMasterId", &[("r:id", rid.as_str())])?;
        x.end("p:notesMasterIdLst")?;
    }

    if slide_count > 0 {
        x.start("p:sldIdLst", &[])?;
        for idx in 0..slide_count {
            let id = (256 + idx).to_string();
            let rid = format!("rId{}", FIRST_SLIDE_REL + idx);
            x.empty("p:sldId", &[("id", id.as_str()), ("r:id", rid.as_str())])?;
        }
        x.end("p:sldIdLst")?;
    }

    let (cx, cy) = (SLIDE_WIDTH_EMU.to_string(), SLIDE_HEIGHT_EMU.to_string());
    x.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    let (ncx, ncy) = (NOTES_WIDTH_EMU.to_string(), NOTES_HEIGHT_EMU.to_string());
    x.empty("p:notesSz", &[("cx", ncx.as_str()), ("cy", ncy.as_str())])?;
    x.end("p:presentation")?;
    Ok(x.finish())
}

fn presentation_rels(slide_count: usize, any_notes: bool) -> Result<Vec<u8>> {
    let mut rels = vec![
        ("rId1".to_string(), REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml".to_string()),
        ("rId2".to_string(), REL_PRES_PROPS, "presProps.xml".to_string()),
        ("rId3".to_string(), REL_VIEW_PROPS, "viewProps.xml".to_string()),
        ("rId4".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
        ("rId5".to_string(), REL_TABLE_STYLES, "tableStyles.xml".to_string()),
    ];
    for idx in 0..slide_count {
        rels.push((
            format!("rId{}", FIRST_SLIDE_REL + idx),
            REL_SLIDE,
            format!("slides/slide{}.xml", idx + 1),
        ));
    }
    if any_notes {
        rels.push((
            format!("rId{}", FIRST_SLIDE_REL + slide_count),
            REL_NOTES_MASTER,
            "notesMasters/notesMaster1.xml".to_string(),
        ));
    }
    let borrowed: Vec<_> = rels
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.clone()))
        .collect();
    relationships(&borrowed)
}

fn slide_rels(n: usize, media: &str, with_notes: bool) -> Result<Vec<u8>> {
    let mut rels = vec![
        ("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml".to_string()),
        ("rId2", REL_IMAGE, format!("../media/{}", media)),
    ];
    if with_notes {
        rels.push(("rId3", REL_NOTES_SLIDE, format!("../notesSlides/notesSlide{}.xml", n)));
    }
    relationships(&rels)
}

fn notes_rels(n: usize) -> Result<Vec<u8>> {
    relationships(&[
        ("rId1", REL_NOTES_MASTER, "../notesMasters/notesMaster1.xml".to_string()),
        ("rId2", REL_SLIDE, format!("../slides/slide{}.xml", n)),
    ])
}

fn relationships(rels: &[(&str, &str, String)]) -> Result<Vec<u8>> {
    let mut x = Xml::new()?;
    x.start("Relationships", &[("xmlns", NS_RELS)])?;
    for (id, kind, target) in rels {
        x.empty(
            "Relationship",
            &[("Id", *id), ("Type", *kind), ("Target", target.as_str())],
        )?;
    }
    x.end("Relationships")?;
    Ok(x.finish())
}

fn group_header(x: &mut Xml) -> Result<()> {
    x.start("p:nvGrpSpPr", &[])?;
    x.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
    x.empty("p:cNvGrpSpPr", &[])?;
    x.empty("p:nvPr", &[])?;
    x.end("p:nvGrpSpPr")?;
    x.start("p:grpSpPr", &[])?;
    x.start("a:xfrm", &[])?;
    x.empty("a:off", &[("x", "0"), ("y", "0")])?;
    x.empty("a:ext", &[("cx", "0"), ("cy", "0")])?;
    x.empty("a:chOff", &[("x", "0"), ("y", "0")])?;
    x.empty("a:chExt", &[("cx", "0"), ("cy", "0")])?;
    x.end("a:xfrm")?;
    x.end("p:grpSpPr")
}

fn transform(x: &mut Xml, off_x: i64, off_y: i64, cx: i64, cy: i64) -> Result<()> {
    let (off_x, off_y) = (off_x.to_string(), off_y.to_string());
    let (cx, cy) = (cx.max(0).to_string(), cy.max(0).to_string());
    x.start("a:xfrm", &[])?;
    x.empty("a:off", &[("x", off_x.as_str()), ("y", off_y.as_str())])?;
    x.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    x.end("a:xfrm")
}

fn rect_geometry(x: &mut Xml) -> Result<()> {
    x.start("a:prstGeom", &[("prst", "rect")])?;
    x.empty("a:avLst", &[])?;
    x.end("a:prstGeom")
}

/// Deflated XML part.
fn put<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, data: &[u8]) -> Result<()> {
    write_entry(zip, name, data, CompressionMethod::Deflated)
}

/// Stored (uncompressed) media part.
fn store<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, data: &[u8]) -> Result<()> {
    write_entry(zip, name, data, CompressionMethod::Stored)
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    data: &[u8],
    method: CompressionMethod,
) -> Result<()> {
    let options = FileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default());
    zip.start_file(name, options)
        .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
    zip.write_all(data)?;
    Ok(())
}

/// Thin event writer that maps quick-xml failures into our error type.
struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> Result<Self> {
        let mut xml = Self {
            writer: Writer::new(Vec::new()),
        };
        xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(xml)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(e.to_string()))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(tag))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let tag = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(tag))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Picture, PictureFormat};
    use quick_xml::Reader;
    use std::io::Read;
    use zip::ZipArchive;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn read_part(package: &[u8], path: &str) -> Option<String> {
        let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
        let mut file = archive.by_name(path).ok()?;
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        Some(content)
    }

    fn local_name(name: &[u8]) -> &[u8] {
        match name.iter().position(|&b| b == b':') {
            Some(pos) => &name[pos + 1..],
            None => name,
        }
    }

    /// Text of every `<a:t>` run in document order.
    fn runs(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut in_text = false;
        let mut out = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if local_name(e.name().as_ref()) == b"t" => in_text = true,
                Event::End(e) if local_name(e.name().as_ref()) == b"t" => in_text = false,
                Event::Text(e) if in_text => out.push(e.unescape().unwrap().into_owned()),
                Event::Eof => break,
                _ => {}
            }
        }
        out
    }

    fn slide_with_text(text: &str) -> DeckSlide {
        let mut slide = DeckSlide::new(Picture::new(PNG_MAGIC.to_vec(), PictureFormat::Png));
        slide.text_boxes.push(TextBox {
            x: 914_400,
            y: 457_200,
            cx: 3_048_000,
            cy: 685_800,
            text: text.to_string(),
            font_size_pt: 24.0,
            color: "FF0000".to_string(),
            bold: true,
            alignment: Alignment::Center,
        });
        slide
    }

    #[test]
    fn test_package_round_trip_parts() {
        let mut first = slide_with_text("Hello <World>\n\nSecond");
        first.notes = Some("Hello <World>".to_string());
        let second = DeckSlide::new(Picture::new(vec![0xFF, 0xD8, 0xFF, 0xE0], PictureFormat::Jpeg));
        let bytes = PptxWriter::new().to_bytes(&[first, second]).unwrap();

        let types = read_part(&bytes, "[Content_Types].xml").unwrap();
        assert!(types.contains("Extension=\"png\""));
        assert!(types.contains("Extension=\"jpeg\""));
        assert!(types.contains("/ppt/slides/slide2.xml"));
        assert!(types.contains("/ppt/notesSlides/notesSlide1.xml"));
        assert!(!types.contains("/ppt/notesSlides/notesSlide2.xml"));

        let slide1 = read_part(&bytes, "ppt/slides/slide1.xml").unwrap();
        assert_eq!(runs(&slide1), vec!["Hello <World>", "Second"]);
        assert!(slide1.contains("<a:off x=\"914400\" y=\"457200\"/>"));
        assert!(slide1.contains("<a:pPr algn=\"ctr\"/>"));
        assert!(slide1.contains("sz=\"2400\" b=\"1\""));
        assert!(slide1.contains("<a:srgbClr val=\"FF0000\"/>"));
        assert!(slide1.contains("typeface=\"Pretendard\""));
        assert!(slide1.contains("lang=\"ko-KR\""));
        assert!(slide1.contains("<a:normAutofit/>"));
        assert!(slide1.contains("<a:endParaRPr"));

        let slide2 = read_part(&bytes, "ppt/slides/slide2.xml").unwrap();
        assert!(runs(&slide2).is_empty());
        assert!(slide2.contains("r:embed=\"rId2\""));

        let rels1 = read_part(&bytes, "ppt/slides/_rels/slide1.xml.rels").unwrap();
        assert!(rels1.contains("../media/image1.png"));
        assert!(rels1.contains("../notesSlides/notesSlide1.xml"));
        let rels2 = read_part(&bytes, "ppt/slides/_rels/slide2.xml.rels").unwrap();
        assert!(rels2.contains("../media/image2.jpeg"));
        assert!(!rels2.contains("notesSlide"));

        let notes = read_part(&bytes, "ppt/notesSlides/notesSlide1.xml").unwrap();
        assert_eq!(runs(&notes), vec!["Hello <World>"]);
        let body_ph = format!("<p:ph type=\"body\" idx=\"{}\"/>", NOTES_BODY_IDX);
        assert!(notes.contains(&body_ph));
        let master = read_part(&bytes, "ppt/notesMasters/notesMaster1.xml").unwrap();
        assert!(master.contains(&format!("type=\"body\" sz=\"quarter\" idx=\"{}\"", NOTES_BODY_IDX)));
        assert!(read_part(&bytes, "ppt/notesMasters/notesMaster1.xml").is_some());
        assert!(read_part(&bytes, "ppt/theme/theme2.xml").is_some());
    }

    #[test]
    fn test_media_stored_verbatim() {
        let data = [PNG_MAGIC.to_vec(), vec![1, 2, 3, 4]].concat();
        let slide = DeckSlide::new(Picture::new(data.clone(), PictureFormat::Png));
        let bytes = PptxWriter::new().to_bytes(&[slide]).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut media = archive.by_name("ppt/media/image1.png").unwrap();
        let mut read = Vec::new();
        media.read_to_end(&mut read).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn test_no_notes_parts_without_transcripts() {
        let mut slide = slide_with_text("Body");
        slide.notes = Some(String::new());
        let bytes = PptxWriter::new().to_bytes(&[slide]).unwrap();

        assert!(read_part(&bytes, "ppt/notesMasters/notesMaster1.xml").is_none());
        assert!(read_part(&bytes, "ppt/notesSlides/notesSlide1.xml").is_none());
        let presentation = read_part(&bytes, "ppt/presentation.xml").unwrap();
        assert!(!presentation.contains("notesMasterIdLst"));
    }

    #[test]
    fn test_options_change_text_properties() {
        let options = DeckOptions {
            font_face: "Noto Sans".to_string(),
            language: "en-US".to_string(),
            shrink_text: false,
        };
        let bytes = PptxWriter::new()
            .with_options(options)
            .to_bytes(&[slide_with_text("Hi")])
            .unwrap();
        let slide = read_part(&bytes, "ppt/slides/slide1.xml").unwrap();
        assert!(slide.contains("typeface=\"Noto Sans\""));
        assert!(slide.contains("lang=\"en-US\""));
        assert!(!slide.contains("normAutofit"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let writer = PptxWriter::new();
        let slides = [slide_with_text("Same")];
        assert_eq!(writer.to_bytes(&slides).unwrap(), writer.to_bytes(&slides).unwrap());
    }

    #[test]
    fn test_font_size_hundredths() {
        assert_eq!(font_size_hundredths(18.0), 1800);
        assert_eq!(font_size_hundredths(10.5), 1050);
        assert_eq!(font_size_hundredths(0.2), 100);
        assert_eq!(font_size_hundredths(f64::NAN), 1800);
    }

    #[test]
    fn test_relationships_escape_and_order() {
        let xml = String::from_utf8(
            relationships(&[
                ("rId1", REL_IMAGE, "../media/a&b.png".to_string()),
                ("rId2", REL_SLIDE, "../slides/slide1.xml".to_string()),
            ])
            .unwrap(),
        )
        .unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("Target=\"../media/a&amp;b.png\""));
        assert!(xml.find("rId1").unwrap() < xml.find("rId2").unwrap());
    }

    #[test]
    fn test_presentation_lists_slides_and_notes_master() {
        let xml = String::from_utf8(presentation(2, true).unwrap()).unwrap();
        assert!(xml.contains("<p:sldId id=\"256\" r:id=\"rId6\"/>"));
        assert!(xml.contains("<p:sldId id=\"257\" r:id=\"rId7\"/>"));
        assert!(xml.contains("<p:notesMasterId r:id=\"rId8\"/>"));
        assert!(xml.contains("<p:sldSz cx=\"12192000\" cy=\"6858000\"/>"));

        let rels = String::from_utf8(presentation_rels(2, true).unwrap()).unwrap();
        assert!(rels.contains("Id=\"rId8\""));
        assert!(rels.contains("notesMasters/notesMaster1.xml"));
    }
}

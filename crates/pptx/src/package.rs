//! Generation of the slide-dependent parts and ZIP assembly of the package.

use crate::parts::{self, LayoutPart};
use deck_core::{Canvas, Error, Paragraph, PlaceholderRole, Result, StyleSpec};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// First `r:id` used for slides in `presentation.xml.rels`.
/// rId1 is the master, rId2 the theme, rId3 presProps, rId4 tableStyles.
const FIRST_SLIDE_REL: usize = 5;

/// First `p:sldId/@id`; the schema reserves everything below 256.
const FIRST_SLIDE_ID: usize = 256;

/// A slide held by a session until it is persisted.
#[derive(Debug, Clone)]
pub(crate) struct PendingSlide {
    pub layout: LayoutPart,
    /// Placeholders in first-write order.
    pub placeholders: Vec<(PlaceholderRole, Vec<Paragraph>)>,
}

impl PendingSlide {
    pub fn new(layout: LayoutPart) -> Self {
        Self {
            layout,
            placeholders: Vec::new(),
        }
    }

    /// Store paragraphs for a role, replacing earlier text in place.
    pub fn set_text(&mut self, role: PlaceholderRole, paragraphs: &[Paragraph]) {
        match self.placeholders.iter_mut().find(|(r, _)| *r == role) {
            Some((_, existing)) => *existing = paragraphs.to_vec(),
            None => self.placeholders.push((role, paragraphs.to_vec())),
        }
    }
}

fn xml_err(e: impl std::fmt::Display) -> Error {
    Error::Codec(format!("XML encoding failed: {}", e))
}

fn zip_err(e: impl std::fmt::Display) -> Error {
    Error::Codec(format!("ZIP packaging failed: {}", e))
}

/// Thin event writer over an in-memory buffer.
struct XmlOut {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlOut {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;
        Ok(Self { writer })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for attr in attrs {
            element.push_attribute(*attr);
        }
        self.writer.write_event(Event::Start(element)).map_err(xml_err)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for attr in attrs {
            element.push_attribute(*attr);
        }
        self.writer.write_event(Event::Empty(element)).map_err(xml_err)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_err)
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_err)
    }

    /// Write pre-escaped markup verbatim.
    fn raw(&mut self, markup: &str) -> Result<()> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(markup)))
            .map_err(xml_err)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}

/// `[Content_Types].xml`
pub(crate) fn content_types_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start("Types", &[("xmlns", parts::NS_CONTENT_TYPES)])?;
    out.empty("Default", &[("Extension", "rels"), ("ContentType", parts::CT_RELS)])?;
    out.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), parts::CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), parts::CT_SLIDE_MASTER),
    ];
    for layout in LayoutPart::ALL {
        overrides.push((
            format!("/ppt/slideLayouts/slideLayout{}.xml", layout.number()),
            parts::CT_SLIDE_LAYOUT,
        ));
    }
    overrides.push(("/ppt/theme/theme1.xml".to_string(), parts::CT_THEME));
    overrides.push(("/ppt/presProps.xml".to_string(), parts::CT_PRES_PROPS));
    overrides.push(("/ppt/tableStyles.xml".to_string(), parts::CT_TABLE_STYLES));
    for n in 1..=slide_count {
        overrides.push((format!("/ppt/slides/slide{}.xml", n), parts::CT_SLIDE));
    }

    for (part, content_type) in &overrides {
        out.empty("Override", &[("PartName", part.as_str()), ("ContentType", *content_type)])?;
    }
    out.end("Types")?;
    Ok(out.finish())
}

/// A relationships part from `(type, target)` pairs, numbered `rId1..`.
pub(crate) fn relationships_xml(rels: &[(&str, String)]) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start("Relationships", &[("xmlns", parts::NS_RELS)])?;
    for (index, (rel_type, target)) in rels.iter().enumerate() {
        let id = format!("rId{}", index + 1);
        out.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", *rel_type), ("Target", target.as_str())],
        )?;
    }
    out.end("Relationships")?;
    Ok(out.finish())
}

/// `ppt/_rels/presentation.xml.rels`
pub(crate) fn presentation_rels_xml(slide_count: usize) -> Result<Vec<u8>> {
    let mut rels = vec![
        (parts::REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml".to_string()),
        (parts::REL_THEME, "theme/theme1.xml".to_string()),
        (parts::REL_PRES_PROPS, "presProps.xml".to_string()),
        (parts::REL_TABLE_STYLES, "tableStyles.xml".to_string()),
    ];
    debug_assert_eq!(rels.len() + 1, FIRST_SLIDE_REL);
    for n in 1..=slide_count {
        rels.push((parts::REL_SLIDE, format!("slides/slide{}.xml", n)));
    }
    relationships_xml(&rels)
}

/// `ppt/presentation.xml`
pub(crate) fn presentation_xml(canvas: Canvas, slide_count: usize) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start(
        "p:presentation",
        &[
            ("xmlns:a", parts::NS_A),
            ("xmlns:r", parts::NS_R),
            ("xmlns:p", parts::NS_P),
            ("saveSubsetFonts", "1"),
        ],
    )?;

    out.start("p:sldMasterIdLst", &[])?;
    out.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    out.end("p:sldMasterIdLst")?;

    if slide_count > 0 {
        out.start("p:sldIdLst", &[])?;
        for index in 0..slide_count {
            let id = (FIRST_SLIDE_ID + index).to_string();
            let rel = format!("rId{}", FIRST_SLIDE_REL + index);
            out.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel.as_str())])?;
        }
        out.end("p:sldIdLst")?;
    }

    let (cx, cy) = (canvas.width_emu.to_string(), canvas.height_emu.to_string());
    out.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    let (notes_cx, notes_cy) = (parts::NOTES_SIZE.0.to_string(), parts::NOTES_SIZE.1.to_string());
    out.empty("p:notesSz", &[("cx", notes_cx.as_str()), ("cy", notes_cy.as_str())])?;

    out.end("p:presentation")?;
    Ok(out.finish())
}

/// `ppt/slides/slideN.xml`
pub(crate) fn slide_xml(slide: &PendingSlide) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.start(
        "p:sld",
        &[
            ("xmlns:a", parts::NS_A),
            ("xmlns:r", parts::NS_R),
            ("xmlns:p", parts::NS_P),
        ],
    )?;
    out.start("p:cSld", &[])?;
    out.start("p:spTree", &[])?;
    out.raw(parts::GROUP_PROPS)?;

    for (index, (role, paragraphs)) in slide.placeholders.iter().enumerate() {
        // Shape id 1 belongs to the group.
        let shape_id = (index + 2).to_string();
        write_placeholder_shape(&mut out, slide.layout, *role, &shape_id, paragraphs)?;
    }

    out.end("p:spTree")?;
    out.end("p:cSld")?;
    out.start("p:clrMapOvr", &[])?;
    out.empty("a:masterClrMapping", &[])?;
    out.end("p:clrMapOvr")?;
    out.end("p:sld")?;
    Ok(out.finish())
}

fn write_placeholder_shape(
    out: &mut XmlOut,
    layout: LayoutPart,
    role: PlaceholderRole,
    shape_id: &str,
    paragraphs: &[Paragraph],
) -> Result<()> {
    out.start("p:sp", &[])?;

    out.start("p:nvSpPr", &[])?;
    out.empty("p:cNvPr", &[("id", shape_id), ("name", layout.shape_name(role))])?;
    out.start("p:cNvSpPr", &[])?;
    out.empty("a:spLocks", &[("noGrp", "1")])?;
    out.end("p:cNvSpPr")?;
    out.start("p:nvPr", &[])?;
    out.empty("p:ph", layout.placeholder_attrs(role))?;
    out.end("p:nvPr")?;
    out.end("p:nvSpPr")?;

    out.empty("p:spPr", &[])?;

    out.start("p:txBody", &[])?;
    out.empty("a:bodyPr", &[])?;
    out.empty("a:lstStyle", &[])?;
    if paragraphs.is_empty() {
        // A text body needs at least one paragraph.
        out.start("a:p", &[])?;
        out.empty("a:endParaRPr", &[("lang", "en-US"), ("dirty", "0")])?;
        out.end("a:p")?;
    }
    for paragraph in paragraphs {
        write_paragraph(out, paragraph)?;
    }
    out.end("p:txBody")?;

    out.end("p:sp")
}

fn write_paragraph(out: &mut XmlOut, paragraph: &Paragraph) -> Result<()> {
    out.start("a:p", &[])?;
    if paragraph.level > 0 {
        let level = paragraph.level.to_string();
        out.empty("a:pPr", &[("lvl", level.as_str())])?;
    }

    if paragraph.text.is_empty() {
        write_run_properties(out, "a:endParaRPr", &paragraph.style)?;
    } else {
        out.start("a:r", &[])?;
        write_run_properties(out, "a:rPr", &paragraph.style)?;
        out.start("a:t", &[])?;
        out.text(&paragraph.text)?;
        out.end("a:t")?;
        out.end("a:r")?;
    }

    out.end("a:p")
}

fn write_run_properties(out: &mut XmlOut, element: &str, style: &StyleSpec) -> Result<()> {
    let size = style.font_size_pt.map(|pt| font_size_hundredths(pt).to_string());
    let mut attrs: Vec<(&str, &str)> = vec![("lang", "en-US")];
    if let Some(size) = &size {
        attrs.push(("sz", size.as_str()));
    }
    if let Some(bold) = style.bold {
        attrs.push(("b", if bold { "1" } else { "0" }));
    }
    attrs.push(("dirty", "0"));

    match style.color {
        Some(color) => {
            let hex = color.to_hex();
            out.start(element, &attrs)?;
            out.start("a:solidFill", &[])?;
            out.empty("a:srgbClr", &[("val", hex.as_str())])?;
            out.end("a:solidFill")?;
            out.end(element)
        }
        None => out.empty(element, &attrs),
    }
}

/// Points to the hundredths-of-a-point unit of `a:rPr/@sz`, clamped to the
/// range the schema allows.
pub(crate) fn font_size_hundredths(pt: f32) -> u32 {
    (pt * 100.0).round().clamp(100.0, 400_000.0) as u32
}

/// Zip every part of the package into memory.
pub(crate) fn assemble(canvas: Canvas, slides: &[PendingSlide]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // Fixed timestamps keep output byte-identical across runs.
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut add = |name: &str, bytes: &[u8]| -> Result<()> {
        zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(bytes).map_err(zip_err)
    };

    add("[Content_Types].xml", &content_types_xml(slides.len())?)?;
    add(
        "_rels/.rels",
        &relationships_xml(&[(parts::REL_OFFICE_DOCUMENT, "ppt/presentation.xml".to_string())])?,
    )?;
    add("ppt/presentation.xml", &presentation_xml(canvas, slides.len())?)?;
    add("ppt/_rels/presentation.xml.rels", &presentation_rels_xml(slides.len())?)?;
    add("ppt/presProps.xml", parts::PRES_PROPS_XML.as_bytes())?;
    add("ppt/tableStyles.xml", parts::TABLE_STYLES_XML.as_bytes())?;
    add("ppt/theme/theme1.xml", parts::THEME_XML.as_bytes())?;
    add("ppt/slideMasters/slideMaster1.xml", parts::SLIDE_MASTER_XML.as_bytes())?;

    let mut master_rels: Vec<(&str, String)> = LayoutPart::ALL
        .iter()
        .map(|layout| {
            (
                parts::REL_SLIDE_LAYOUT,
                format!("../slideLayouts/slideLayout{}.xml", layout.number()),
            )
        })
        .collect();
    master_rels.push((parts::REL_THEME, "../theme/theme1.xml".to_string()));
    add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &relationships_xml(&master_rels)?,
    )?;

    let layout_rels = relationships_xml(&[(
        parts::REL_SLIDE_MASTER,
        "../slideMasters/slideMaster1.xml".to_string(),
    )])?;
    for layout in LayoutPart::ALL {
        let n = layout.number();
        add(&format!("ppt/slideLayouts/slideLayout{}.xml", n), layout.xml().as_bytes())?;
        add(
            &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
            &layout_rels,
        )?;
    }

    for (index, slide) in slides.iter().enumerate() {
        let n = index + 1;
        add(&format!("ppt/slides/slide{}.xml", n), &slide_xml(slide)?)?;
        let rels = relationships_xml(&[(
            parts::REL_SLIDE_LAYOUT,
            format!("../slideLayouts/slideLayout{}.xml", slide.layout.number()),
        )])?;
        add(&format!("ppt/slides/_rels/slide{}.xml.rels", n), &rels)?;
    }

    let cursor = zip.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::Rgb;

    fn as_str(bytes: &[u8]) -> &str {
        std::str::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_paragraph_markup_levels_and_spacers() {
        let mut slide = PendingSlide::new(LayoutPart::TitleAndContent);
        slide.set_text(
            PlaceholderRole::Body,
            &[
                Paragraph::new("A", 0, StyleSpec::new()),
                Paragraph::new("", 1, StyleSpec::new()),
                Paragraph::new("B & C", 1, StyleSpec::new()),
            ],
        );
        let bytes = slide_xml(&slide).unwrap();
        let xml = as_str(&bytes);

        assert!(xml.contains(r#"<p:ph idx="1"/>"#));
        assert!(xml.contains(r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>A</a:t></a:r></a:p>"#));
        assert!(xml.contains(r#"<a:p><a:pPr lvl="1"/><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#));
        assert!(xml.contains("<a:t>B &amp; C</a:t>"));
        assert_eq!(xml.matches("<a:p>").count(), 3);
    }

    #[test]
    fn test_run_style_attributes() {
        let mut slide = PendingSlide::new(LayoutPart::TitleSlide);
        slide.set_text(
            PlaceholderRole::Title,
            &[Paragraph::new(
                "Deck",
                0,
                StyleSpec::new()
                    .with_font_size(44.0)
                    .with_bold(true)
                    .with_color(Rgb::new(31, 73, 125)),
            )],
        );
        let bytes = slide_xml(&slide).unwrap();
        let xml = as_str(&bytes);

        assert!(xml.contains(r#"<p:ph type="ctrTitle"/>"#));
        assert!(xml.contains(
            r#"<a:rPr lang="en-US" sz="4400" b="1" dirty="0"><a:solidFill><a:srgbClr val="1F497D"/></a:solidFill></a:rPr>"#
        ));
    }

    #[test]
    fn test_rewrite_replaces_in_place() {
        let mut slide = PendingSlide::new(LayoutPart::TitleAndContent);
        slide.set_text(PlaceholderRole::Title, &[Paragraph::new("old", 0, StyleSpec::new())]);
        slide.set_text(PlaceholderRole::Body, &[Paragraph::new("body", 0, StyleSpec::new())]);
        slide.set_text(PlaceholderRole::Title, &[Paragraph::new("new", 0, StyleSpec::new())]);

        assert_eq!(slide.placeholders.len(), 2);
        assert_eq!(slide.placeholders[0].0, PlaceholderRole::Title);
        assert_eq!(slide.placeholders[0].1[0].text, "new");
    }

    #[test]
    fn test_presentation_lists_slides_and_size() {
        let bytes = presentation_xml(Canvas::default(), 2).unwrap();
        let xml = as_str(&bytes);
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId5"/>"#));
        assert!(xml.contains(r#"<p:sldId id="257" r:id="rId6"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));

        let rels = presentation_rels_xml(2).unwrap();
        let rels = as_str(&rels);
        assert!(rels.contains(r#"Id="rId6""#));
        assert!(rels.contains(r#"Target="slides/slide2.xml""#));
    }

    #[test]
    fn test_empty_deck_omits_slide_list() {
        let bytes = presentation_xml(Canvas::default(), 0).unwrap();
        assert!(!as_str(&bytes).contains("sldIdLst"));
    }

    #[test]
    fn test_font_size_hundredths() {
        assert_eq!(font_size_hundredths(16.0), 1600);
        assert_eq!(font_size_hundredths(10.5), 1050);
        assert_eq!(font_size_hundredths(0.1), 100);
    }

    #[test]
    fn test_assemble_contains_every_part() {
        let mut slide = PendingSlide::new(LayoutPart::TitleAndContent);
        slide.set_text(PlaceholderRole::Title, &[Paragraph::new("T", 0, StyleSpec::new())]);
        let bytes = assemble(Canvas::default(), &[slide]).unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout2.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/_rels/slide1.xml.rels",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }
}

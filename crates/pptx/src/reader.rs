//! Read-back of persisted PPTX files.
//!
//! Recovers slide order, placeholder roles and paragraph text, level and
//! run style. Only what this crate writes is understood; it is an inspector
//! for verifying artifacts, not a general PPTX parser.

use deck_core::{Canvas, Error, Paragraph, PlaceholderRole, Result, Rgb, StyleSpec};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Everything recovered from a PPTX package.
#[derive(Debug, Clone, Serialize)]
pub struct PresentationContent {
    /// Slide size from `presentation.xml`, if declared.
    pub canvas: Option<Canvas>,
    /// Slides in presentation order.
    pub slides: Vec<SlideContent>,
}

impl PresentationContent {
    /// Get a slide by its 1-based number.
    pub fn slide(&self, number: usize) -> Option<&SlideContent> {
        number.checked_sub(1).and_then(|i| self.slides.get(i))
    }
}

/// One slide's placeholders.
#[derive(Debug, Clone, Serialize)]
pub struct SlideContent {
    /// 1-based slide number.
    pub number: usize,
    /// Placeholder shapes in document order.
    pub placeholders: Vec<PlaceholderContent>,
}

impl SlideContent {
    /// First placeholder with the given role.
    pub fn placeholder(&self, role: PlaceholderRole) -> Option<&PlaceholderContent> {
        self.placeholders.iter().find(|p| p.role == Some(role))
    }

    /// Title text, if the slide has a title placeholder.
    pub fn title(&self) -> Option<String> {
        self.placeholder(PlaceholderRole::Title).map(|p| p.text())
    }
}

/// Paragraphs of one placeholder shape.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceholderContent {
    /// Role, or `None` for placeholder types this crate never writes.
    pub role: Option<PlaceholderRole>,
    /// Paragraphs in order, spacers included.
    pub paragraphs: Vec<Paragraph>,
}

impl PlaceholderContent {
    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Reader for PPTX files.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read a PPTX file from a reader.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<PresentationContent> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let presentation = self.read_file_from_archive(&mut archive, "ppt/presentation.xml")?;
        let (canvas, slide_rel_ids) = scan_presentation(&presentation)?;
        let targets = self.slide_targets(&mut archive)?;

        let mut slides = Vec::with_capacity(slide_rel_ids.len());
        for (idx, rel_id) in slide_rel_ids.iter().enumerate() {
            let slide_path = targets.get(rel_id).ok_or_else(|| {
                Error::XmlError(format!("Slide relationship '{}' has no target", rel_id))
            })?;
            let content = self.read_file_from_archive(&mut archive, slide_path)?;
            slides.push(SlideContent {
                number: idx + 1,
                placeholders: extract_placeholders(&content)?,
            });
        }

        Ok(PresentationContent { canvas, slides })
    }

    /// Map slide relationship ids to archive paths.
    fn slide_targets<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<HashMap<String, String>> {
        let rels_content = self.read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut reader = Reader::from_str(&rels_content);
        let mut targets = HashMap::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let is_slide = attr_value(e, b"Type").is_some_and(|t| t.ends_with("/slide"));
                    if let (true, Some(id), Some(target)) =
                        (is_slide, attr_value(e, b"Id"), attr_value(e, b"Target"))
                    {
                        targets.insert(id, resolve_target(&target));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(targets)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the slide size and the ordered slide relationship ids out of
/// `presentation.xml`. Slide order is the order of `p:sldIdLst`.
fn scan_presentation(xml_content: &str) -> Result<(Option<Canvas>, Vec<String>)> {
    let mut reader = Reader::from_str(xml_content);
    let mut canvas = None;
    let mut rel_ids = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing presentation.xml: {}", e)))?;

        match event {
            Event::Empty(ref e) | Event::Start(ref e) => match local_name(e.name().as_ref()) {
                b"sldId" => {
                    // `r:id`, as opposed to the unprefixed numeric `id`.
                    let rel_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| {
                            attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id"
                        })
                        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
                        .ok_or_else(|| {
                            Error::XmlError("p:sldId without a relationship id".to_string())
                        })?;
                    rel_ids.push(rel_id);
                }
                b"sldSz" => {
                    let width = attr_value(e, b"cx").and_then(|v| v.parse().ok());
                    let height = attr_value(e, b"cy").and_then(|v| v.parse().ok());
                    canvas = width.zip(height).map(|(width_emu, height_emu)| Canvas {
                        width_emu,
                        height_emu,
                    });
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((canvas, rel_ids))
}

/// Turn a relationship target from `presentation.xml.rels` into an archive path.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// Paragraph being assembled while walking `a:p`.
#[derive(Debug, Default)]
struct ParagraphState {
    text: String,
    level: u8,
    style: Option<StyleSpec>,
}

/// Walk slide XML and collect every placeholder shape's paragraphs.
fn extract_placeholders(xml_content: &str) -> Result<Vec<PlaceholderContent>> {
    let mut placeholders = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut current_shape: Option<PlaceholderContent> = None;
    let mut is_placeholder = false;
    let mut paragraph: Option<ParagraphState> = None;
    let mut in_text = false;
    // Set while inside the run properties whose style is being captured.
    let mut capturing_style = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing slide: {}", e)))?;

        match event {
            Event::Start(ref e) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    current_shape = Some(PlaceholderContent {
                        role: None,
                        paragraphs: Vec::new(),
                    });
                    is_placeholder = false;
                }
                b"p" if current_shape.is_some() => {
                    paragraph = Some(ParagraphState::default());
                }
                b"pPr" => read_level(e, paragraph.as_mut()),
                b"rPr" | b"endParaRPr" => {
                    capturing_style = start_style(e, paragraph.as_mut());
                }
                b"t" => in_text = paragraph.is_some(),
                _ => {}
            },
            Event::Empty(ref e) => match local_name(e.name().as_ref()) {
                b"ph" => {
                    if let Some(shape) = current_shape.as_mut() {
                        shape.role = placeholder_role(e);
                        is_placeholder = true;
                    }
                }
                b"pPr" => read_level(e, paragraph.as_mut()),
                b"rPr" | b"endParaRPr" => {
                    start_style(e, paragraph.as_mut());
                }
                b"srgbClr" if capturing_style => {
                    if let Some(style) = paragraph.as_mut().and_then(|p| p.style.as_mut()) {
                        style.color = attr_value(e, b"val").and_then(|v| Rgb::from_hex(&v));
                    }
                }
                _ => {}
            },
            Event::Text(ref e) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlError(format!("Bad text content: {}", err)))?;
                    p.text.push_str(&text);
                }
            }
            Event::End(ref e) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"rPr" | b"endParaRPr" => capturing_style = false,
                b"p" => {
                    if let (Some(p), Some(shape)) = (paragraph.take(), current_shape.as_mut()) {
                        shape.paragraphs.push(Paragraph::new(
                            p.text,
                            p.level,
                            p.style.unwrap_or_default(),
                        ));
                    }
                }
                b"sp" => {
                    if let Some(shape) = current_shape.take() {
                        if is_placeholder {
                            placeholders.push(shape);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(placeholders)
}

/// Map `p:ph` attributes to a role.
fn placeholder_role(e: &BytesStart) -> Option<PlaceholderRole> {
    match attr_value(e, b"type").as_deref() {
        Some("title") | Some("ctrTitle") => Some(PlaceholderRole::Title),
        Some("subTitle") => Some(PlaceholderRole::Subtitle),
        Some("body") | Some("obj") => Some(PlaceholderRole::Body),
        // An untyped placeholder with an index is a content placeholder.
        None if attr_value(e, b"idx").is_some() => Some(PlaceholderRole::Body),
        _ => None,
    }
}

fn read_level(e: &BytesStart, paragraph: Option<&mut ParagraphState>) {
    if let (Some(p), Some(level)) = (paragraph, attr_value(e, b"lvl").and_then(|v| v.parse().ok())) {
        p.level = level;
    }
}

/// Capture the style of the first run in a paragraph. Returns whether this
/// element's style is being captured.
fn start_style(e: &BytesStart, paragraph: Option<&mut ParagraphState>) -> bool {
    let Some(p) = paragraph else {
        return false;
    };
    if p.style.is_some() {
        return false;
    }

    p.style = Some(StyleSpec {
        font_size_pt: attr_value(e, b"sz")
            .and_then(|v| v.parse::<f32>().ok())
            .map(|hundredths| hundredths / 100.0),
        bold: attr_value(e, b"b").map(|v| v == "1" || v == "true"),
        color: None,
    });
    true
}

/// Value of an unprefixed attribute.
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_presentation_follows_slide_id_list() {
        let xml = concat!(
            r#"<p:presentation xmlns:p="p" xmlns:r="r">"#,
            r#"<p:sldIdLst><p:sldId id="257" r:id="rId12"/><p:sldId id="256" r:id="rId3"/></p:sldIdLst>"#,
            r#"<p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/>"#,
            r#"</p:presentation>"#,
        );

        let (canvas, rel_ids) = scan_presentation(xml).unwrap();
        assert_eq!(rel_ids, vec!["rId12", "rId3"]);
        assert_eq!(canvas, Some(Canvas::widescreen()));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_extract_placeholders_from_slide_xml() {
        let xml = concat!(
            r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>"#,
            r#"<p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:txBody>"#,
            r#"<a:p><a:r><a:rPr lang="en-US" sz="4400" b="1"><a:solidFill><a:srgbClr val="1F497D"/></a:solidFill></a:rPr>"#,
            r#"<a:t>Hello &amp; welcome</a:t></a:r></a:p></p:txBody></p:sp>"#,
            r#"<p:sp><p:nvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:txBody>"#,
            r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>A</a:t></a:r></a:p>"#,
            r#"<a:p><a:pPr lvl="1"/><a:endParaRPr lang="en-US"/></a:p>"#,
            r#"<a:p><a:pPr lvl="1"/><a:r><a:rPr lang="en-US" sz="1600"/><a:t>B</a:t></a:r></a:p>"#,
            r#"</p:txBody></p:sp>"#,
            r#"<p:sp><p:txBody><a:p><a:r><a:t>free text box</a:t></a:r></a:p></p:txBody></p:sp>"#,
            r#"</p:spTree></p:cSld></p:sld>"#,
        );

        let placeholders = extract_placeholders(xml).unwrap();
        assert_eq!(placeholders.len(), 2);

        let title = &placeholders[0];
        assert_eq!(title.role, Some(PlaceholderRole::Title));
        assert_eq!(title.text(), "Hello & welcome");
        let style = &title.paragraphs[0].style;
        assert_eq!(style.font_size_pt, Some(44.0));
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.color, Some(Rgb::new(31, 73, 125)));

        let body = &placeholders[1];
        assert_eq!(body.role, Some(PlaceholderRole::Body));
        let lines: Vec<(&str, u8)> = body
            .paragraphs
            .iter()
            .map(|p| (p.text.as_str(), p.level))
            .collect();
        assert_eq!(lines, vec![("A", 0), ("", 1), ("B", 1)]);
        assert_eq!(body.paragraphs[2].style.font_size_pt, Some(16.0));
    }

    #[test]
    fn test_placeholder_role_mapping() {
        let role_of = |xml: &str| {
            let mut reader = Reader::from_str(xml);
            loop {
                match reader.read_event().unwrap() {
                    Event::Empty(e) => return placeholder_role(&e),
                    Event::Eof => return None,
                    _ => {}
                }
            }
        };

        assert_eq!(role_of(r#"<p:ph type="ctrTitle"/>"#), Some(PlaceholderRole::Title));
        assert_eq!(
            role_of(r#"<p:ph type="subTitle" idx="1"/>"#),
            Some(PlaceholderRole::Subtitle)
        );
        assert_eq!(role_of(r#"<p:ph idx="1"/>"#), Some(PlaceholderRole::Body));
        assert_eq!(role_of(r#"<p:ph type="sldNum" idx="12"/>"#), None);
    }

    #[test]
    fn test_not_a_zip() {
        let result = PptxReader::new().read(std::io::Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(result, Err(Error::ZipError(_))));
    }
}

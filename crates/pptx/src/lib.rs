//! PPTX (Office Open XML) backend for declarative slide decks.
//!
//! [`PptxCodec`] writes decks as .pptx packages, which are ZIP archives of
//! XML parts. [`PptxReader`] reads them back for verification.

pub(crate) mod package;
pub mod parts;
pub mod reader;
pub mod writer;

pub use reader::{PlaceholderContent, PptxReader, PresentationContent, SlideContent};
pub use writer::{PptxCodec, PptxSession};

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{
        build, Canvas, ContentNode, DeckDescription, DeckRenderer, PlaceholderRole, Rgb,
        SlideDescription, StyleSpec,
    };
    use std::fs::File;
    use std::path::Path;

    fn scenario() -> DeckDescription {
        let mut description = DeckDescription::new();
        description.add_slide(SlideDescription::title_slide("X", "Y"));
        let mut slide = SlideDescription::content("Z");
        slide
            .extend([
                ContentNode::new("A", 0),
                ContentNode::new("B", 1),
                ContentNode::spacer(1),
                ContentNode::new("C", 1),
            ])
            .unwrap();
        description.add_slide(slide);
        description
    }

    fn read_back(path: &Path) -> PresentationContent {
        PptxReader::new().read(File::open(path).unwrap()).unwrap()
    }

    #[test]
    fn test_two_slide_deck_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");

        let deck = build(&scenario()).unwrap();
        let artifact = deck_core::render(deck, &PptxCodec::new(), &path).unwrap();
        assert_eq!(artifact.slide_count, 2);
        assert_eq!(artifact.bytes_written, std::fs::metadata(&path).unwrap().len());

        let content = read_back(&path);
        assert_eq!(content.slides.len(), 2);
        assert_eq!(content.canvas, Some(Canvas::default()));

        let first = content.slide(1).unwrap();
        assert_eq!(first.title().as_deref(), Some("X"));
        assert_eq!(
            first.placeholder(PlaceholderRole::Subtitle).unwrap().text(),
            "Y"
        );
        assert!(first.placeholder(PlaceholderRole::Body).is_none());

        let second = content.slide(2).unwrap();
        assert_eq!(second.title().as_deref(), Some("Z"));
        let lines: Vec<(&str, u8)> = second
            .placeholder(PlaceholderRole::Body)
            .unwrap()
            .paragraphs
            .iter()
            .map(|p| (p.text.as_str(), p.level))
            .collect();
        assert_eq!(lines, vec![("A", 0), ("B", 1), ("", 1), ("C", 1)]);
    }

    #[test]
    fn test_render_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        std::fs::write(&path, b"stale contents").unwrap();

        let codec = PptxCodec::new();
        deck_core::render(build(&scenario()).unwrap(), &codec, &path).unwrap();

        let mut single = DeckDescription::new();
        single.add_slide(SlideDescription::title_slide("Only", "One"));
        deck_core::render(build(&single).unwrap(), &codec, &path).unwrap();

        let content = read_back(&path);
        assert_eq!(content.slides.len(), 1);
        assert_eq!(content.slides[0].title().as_deref(), Some("Only"));
    }

    #[test]
    fn test_identical_decks_produce_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.pptx");
        let second = dir.path().join("b.pptx");

        let codec = PptxCodec::new();
        deck_core::render(build(&scenario()).unwrap(), &codec, &first).unwrap();
        deck_core::render(build(&scenario()).unwrap(), &codec, &second).unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn test_styles_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styled.pptx");

        let heading = StyleSpec::new()
            .with_font_size(44.0)
            .with_bold(true)
            .with_color(Rgb::new(31, 73, 125));
        let mut slide = SlideDescription::content("Styled").with_title_style(heading.clone());
        slide
            .push(
                ContentNode::new("Renderer", 0)
                    .with_style(StyleSpec::new().with_font_size(16.0))
                    .with_child(ContentNode::entry("WebGL", "hardware accelerated", 1))
                    .unwrap(),
            )
            .unwrap();
        let mut description = DeckDescription::new();
        description.add_slide(slide);

        DeckRenderer::new()
            .with_canvas(Canvas::widescreen())
            .render(build(&description).unwrap(), &PptxCodec::new(), &path)
            .unwrap();

        let content = read_back(&path);
        assert_eq!(content.canvas, Some(Canvas::widescreen()));

        let slide = content.slide(1).unwrap();
        let title = &slide.placeholder(PlaceholderRole::Title).unwrap().paragraphs[0];
        assert_eq!(title.style, heading);

        let body = &slide.placeholder(PlaceholderRole::Body).unwrap().paragraphs;
        assert_eq!(body[0].style.font_size_pt, Some(16.0));
        assert_eq!(body[1].text, "WebGL: hardware accelerated");
        assert_eq!(body[1].level, 1);
        assert_eq!(body[1].style.font_size_pt, Some(16.0));
    }
}

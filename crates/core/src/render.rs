//! Replays a built deck into a codec session.

use crate::codec::{Canvas, CodecSession, PresentationCodec, RenderedArtifact};
use crate::deck::{Deck, SlideSpec};
use crate::error::Result;
use crate::layout::{LayoutResolver, PlaceholderRole};
use std::path::Path;

/// Drives a codec through one deck, front to back.
#[derive(Debug, Clone, Default)]
pub struct DeckRenderer {
    canvas: Canvas,
    resolver: LayoutResolver,
}

impl DeckRenderer {
    /// Create a renderer with the default canvas and standard layouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different canvas size.
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Use a different layout table.
    pub fn with_resolver(mut self, resolver: LayoutResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Canvas every session is opened with.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Render a deck and persist it to `destination`.
    ///
    /// The first error stops the render: later slides are not attempted,
    /// nothing is persisted and the session is discarded.
    pub fn render<C: PresentationCodec>(
        &self,
        deck: Deck,
        codec: &C,
        destination: &Path,
    ) -> Result<RenderedArtifact> {
        log::info!(
            "Rendering {} slides with {} codec to {}",
            deck.len(),
            codec.name(),
            destination.display()
        );

        let mut session = codec.open_session(self.canvas)?;

        if let Err(e) = self.write_slides(&mut session, &deck) {
            log::warn!("Render aborted: {}", e);
            session.discard();
            return Err(e);
        }

        let artifact = session.persist(destination)?;
        log::info!(
            "Wrote {} slides ({} bytes) to {}",
            artifact.slide_count,
            artifact.bytes_written,
            artifact.path.display()
        );
        Ok(artifact)
    }

    fn write_slides<S: CodecSession>(&self, session: &mut S, deck: &Deck) -> Result<()> {
        for slide in deck.slides() {
            self.write_slide(session, slide)?;
        }
        Ok(())
    }

    fn write_slide<S: CodecSession>(&self, session: &mut S, slide: &SlideSpec) -> Result<()> {
        let binding = self.resolver.resolve(slide.kind)?;
        log::debug!("Slide {}: layout '{}'", slide.number, binding.layout);

        let handle = session.add_slide(&binding.layout)?;

        for role in &binding.roles {
            let placeholder = session.get_placeholder(handle, *role)?;
            match role {
                PlaceholderRole::Title => {
                    session.write_text(placeholder, std::slice::from_ref(&slide.title))?
                }
                PlaceholderRole::Subtitle | PlaceholderRole::Body => {
                    session.write_text(placeholder, &slide.paragraphs())?
                }
            }
        }

        Ok(())
    }
}

/// Render with the default renderer.
pub fn render<C: PresentationCodec>(
    deck: Deck,
    codec: &C,
    destination: &Path,
) -> Result<RenderedArtifact> {
    DeckRenderer::new().render(deck, codec, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::build;
    use crate::error::Error;
    use crate::layout::{LayoutBinding, LayoutId, TITLE_AND_CONTENT_LAYOUT, TITLE_SLIDE_LAYOUT};
    use crate::recording::{CodecOp, Fault, RecordingCodec};
    use crate::style::{Rgb, StyleSpec};
    use crate::types::{ContentNode, DeckDescription, SlideDescription, SlideKind};
    use std::path::PathBuf;

    fn content_deck(count: usize) -> Deck {
        let mut description = DeckDescription::new();
        for i in 0..count {
            let mut slide = SlideDescription::content(format!("Slide {}", i + 1));
            slide.push(ContentNode::new(format!("Point {}", i + 1), 0)).unwrap();
            description.add_slide(slide);
        }
        build(&description).unwrap()
    }

    fn scenario() -> Deck {
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
        build(&description).unwrap()
    }

    #[test]
    fn test_add_slide_once_per_slide_in_order() {
        let mut description = DeckDescription::new();
        description.add_slide(SlideDescription::title_slide("Opening", "Sub"));
        description.add_slide(SlideDescription::content("Second"));
        description.add_slide(SlideDescription::title_slide("Interlude", "Sub"));
        description.add_slide(SlideDescription::content("Fourth"));
        let deck = build(&description).unwrap();

        let codec = RecordingCodec::new();
        let artifact = render(deck, &codec, Path::new("deck.pptx")).unwrap();

        assert_eq!(artifact.slide_count, 4);
        let layouts: Vec<String> = codec
            .added_layouts()
            .iter()
            .map(|l| l.as_str().to_string())
            .collect();
        assert_eq!(
            layouts,
            vec![
                TITLE_SLIDE_LAYOUT,
                TITLE_AND_CONTENT_LAYOUT,
                TITLE_SLIDE_LAYOUT,
                TITLE_AND_CONTENT_LAYOUT
            ]
        );
    }

    #[test]
    fn test_call_sequence_for_scenario() {
        let codec = RecordingCodec::new();
        DeckRenderer::new()
            .render(scenario(), &codec, Path::new("out.pptx"))
            .unwrap();

        let ops = codec.operations();
        assert_eq!(ops[0], CodecOp::OpenSession(Canvas::default()));
        assert_eq!(ops[1], CodecOp::AddSlide(LayoutId::new(TITLE_SLIDE_LAYOUT)));
        assert_eq!(
            ops[2],
            CodecOp::GetPlaceholder {
                slide: 1,
                role: PlaceholderRole::Title
            }
        );
        assert_eq!(
            ops[4],
            CodecOp::GetPlaceholder {
                slide: 1,
                role: PlaceholderRole::Subtitle
            }
        );
        assert_eq!(ops.last(), Some(&CodecOp::Persist(PathBuf::from("out.pptx"))));

        let subtitle = codec.written(1, PlaceholderRole::Subtitle).unwrap();
        assert_eq!(subtitle.len(), 1);
        assert_eq!(subtitle[0].text, "Y");
        assert_eq!(codec.written(1, PlaceholderRole::Title).unwrap()[0].text, "X");
    }

    #[test]
    fn test_body_paragraphs_with_spacer() {
        let codec = RecordingCodec::new();
        render(scenario(), &codec, Path::new("out.pptx")).unwrap();

        let body = codec.written(2, PlaceholderRole::Body).unwrap();
        let lines: Vec<(&str, u8)> = body.iter().map(|p| (p.text.as_str(), p.level)).collect();
        assert_eq!(lines, vec![("A", 0), ("B", 1), ("", 1), ("C", 1)]);
        assert_eq!(codec.written(2, PlaceholderRole::Title).unwrap()[0].text, "Z");
    }

    #[test]
    fn test_missing_placeholder_on_third_slide_is_fatal() {
        let codec = RecordingCodec::new().with_fault(Fault::MissingPlaceholder { slide: 3 });
        let err = render(content_deck(5), &codec, Path::new("out.pptx")).unwrap_err();

        assert!(matches!(err, Error::PlaceholderNotFound { slide: 3, .. }));
        assert_eq!(codec.added_layouts().len(), 3);

        let ops = codec.operations();
        assert!(!ops.iter().any(|op| matches!(op, CodecOp::Persist(_))));
        assert_eq!(ops.last(), Some(&CodecOp::Discard));
        assert!(codec.written(4, PlaceholderRole::Body).is_none());
    }

    #[test]
    fn test_persist_failure_surfaces() {
        let codec = RecordingCodec::new().with_fault(Fault::PersistDenied);
        let err = render(content_deck(2), &codec, Path::new("/locked/out.pptx")).unwrap_err();
        match err {
            Error::Persist { path, source } => {
                assert_eq!(path, PathBuf::from("/locked/out.pptx"));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unbound_kind_is_unknown_layout() {
        let resolver = LayoutResolver::empty().with_binding(LayoutBinding::new(
            SlideKind::Content,
            LayoutId::new(TITLE_AND_CONTENT_LAYOUT),
            vec![PlaceholderRole::Title, PlaceholderRole::Body],
        ));
        let codec = RecordingCodec::new();
        let err = DeckRenderer::new()
            .with_resolver(resolver)
            .render(scenario(), &codec, Path::new("out.pptx"))
            .unwrap_err();

        assert!(matches!(err, Error::UnknownLayout(_)));
        assert!(codec.added_layouts().is_empty());
        assert_eq!(codec.operations().last(), Some(&CodecOp::Discard));
    }

    #[test]
    fn test_effective_style_reaches_codec() {
        let mut description = DeckDescription::new();
        let mut slide = SlideDescription::content("Styled")
            .with_default_style(StyleSpec::new().with_bold(false));
        slide
            .push(
                ContentNode::new("accent", 0)
                    .with_style(StyleSpec::new().with_bold(true).with_color(Rgb::new(31, 73, 125))),
            )
            .unwrap();
        description.add_slide(slide);

        let codec = RecordingCodec::new();
        render(build(&description).unwrap(), &codec, Path::new("out.pptx")).unwrap();

        let body = codec.written(1, PlaceholderRole::Body).unwrap();
        assert_eq!(body[0].style.bold, Some(true));
        assert_eq!(body[0].style.color, Some(Rgb::new(31, 73, 125)));
    }

    #[test]
    fn test_custom_canvas_passed_to_session() {
        let codec = RecordingCodec::new();
        DeckRenderer::new()
            .with_canvas(Canvas::widescreen())
            .render(content_deck(1), &codec, Path::new("out.pptx"))
            .unwrap();
        assert_eq!(
            codec.operations()[0],
            CodecOp::OpenSession(Canvas::widescreen())
        );
    }
}

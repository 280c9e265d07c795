//! Validated, style-resolved decks.

use crate::codec::Paragraph;
use crate::error::{Error, Result};
use crate::style::{StyleEngine, StyleSpec};
use crate::types::{
    validate_outline, ContentNode, DeckDescription, NodeLocation, NodePath, SlideDescription,
    SlideKind,
};

/// An immutable deck, ready to render.
///
/// The only way to obtain one is [`build`], so every deck has passed level
/// validation and carries fully resolved styles.
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    slides: Vec<SlideSpec>,
}

impl Deck {
    /// Validate and resolve a description. Same as [`build`].
    pub fn build(description: &DeckDescription) -> Result<Self> {
        build(description)
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// True when the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

impl IntoIterator for Deck {
    type Item = SlideSpec;
    type IntoIter = std::vec::IntoIter<SlideSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.into_iter()
    }
}

/// One slide of a built deck.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSpec {
    /// 1-based position in the deck.
    pub number: usize,
    /// Slide intent.
    pub kind: SlideKind,
    /// Title text with its effective style.
    pub title: Paragraph,
    /// Body outline with effective styles.
    pub body: Vec<BodyNode>,
}

impl SlideSpec {
    /// Body paragraphs in pre-order, one per node, spacers included.
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        let mut out = Vec::new();
        for node in &self.body {
            node.collect_paragraphs(&mut out);
        }
        out
    }
}

/// A body node after validation and style resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyNode {
    /// Paragraph text.
    pub text: String,
    /// Indentation level.
    pub level: u8,
    /// Effective style after the full cascade.
    pub style: StyleSpec,
    /// Position within the slide body.
    pub path: NodePath,
    /// Nested nodes.
    pub children: Vec<BodyNode>,
}

impl BodyNode {
    fn collect_paragraphs(&self, out: &mut Vec<Paragraph>) {
        out.push(Paragraph::new(self.text.clone(), self.level, self.style.clone()));
        for child in &self.children {
            child.collect_paragraphs(out);
        }
    }
}

/// Validate a deck description and resolve every node's effective style.
///
/// Pure and deterministic: the same description always yields an equal deck.
/// Fails on the first offending node in document order.
pub fn build(description: &DeckDescription) -> Result<Deck> {
    if let Some(Err(reason)) = description.default_style.as_ref().map(StyleSpec::validate) {
        return Err(Error::InvalidStyle {
            location: NodeLocation::new(None, NodePath::root()),
            reason,
        });
    }

    let deck_default = description.default_style.clone().unwrap_or_default();
    let mut slides = Vec::with_capacity(description.slides.len());

    for (index, slide) in description.slides.iter().enumerate() {
        slides.push(build_slide(index + 1, slide, &deck_default)?);
    }

    log::debug!("Built deck with {} slides", slides.len());
    Ok(Deck { slides })
}

fn build_slide(number: usize, slide: &SlideDescription, deck_default: &StyleSpec) -> Result<SlideSpec> {
    validate_outline(&slide.body, Some(number))?;

    check_style(slide.title_style.as_ref(), number, &NodePath::root())?;
    check_style(slide.default_style.as_ref(), number, &NodePath::root())?;

    let title_style = StyleEngine::apply(deck_default, slide.title_style.as_ref());
    let mut engine = StyleEngine::new(deck_default.apply(slide.default_style.as_ref()));
    let mut path = NodePath::root();
    let body = resolve_nodes(&slide.body, &mut engine, &mut path, number)?;

    log::debug!(
        "Slide {} ({}): {} body nodes",
        number,
        slide.kind,
        slide.node_count()
    );

    Ok(SlideSpec {
        number,
        kind: slide.kind,
        title: Paragraph::new(slide.title.clone(), 0, title_style),
        body,
    })
}

fn resolve_nodes(
    nodes: &[ContentNode],
    engine: &mut StyleEngine,
    path: &mut NodePath,
    slide: usize,
) -> Result<Vec<BodyNode>> {
    let mut resolved = Vec::with_capacity(nodes.len());

    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        check_style(node.style_override.as_ref(), slide, path)?;

        let style = engine.push(node.style_override.as_ref());
        let children = resolve_nodes(&node.children, engine, path, slide)?;
        engine.pop();

        resolved.push(BodyNode {
            text: node.text.clone(),
            level: node.level,
            style,
            path: path.clone(),
            children,
        });
        path.pop();
    }

    Ok(resolved)
}

fn check_style(style: Option<&StyleSpec>, slide: usize, path: &NodePath) -> Result<()> {
    match style.map(StyleSpec::validate) {
        Some(Err(reason)) => Err(Error::InvalidStyle {
            location: NodeLocation::new(Some(slide), path.clone()),
            reason,
        }),
        _ => Ok(()),
    }
}

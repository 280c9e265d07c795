//! Domain types for describing a deck as nested outline content.

use crate::error::{Error, Result};
use crate::style::StyleSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Describes an entire deck before it has been validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckDescription {
    /// Style applied beneath every slide's own defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_style: Option<StyleSpec>,

    /// Slides in presentation order.
    #[serde(default)]
    pub slides: Vec<SlideDescription>,
}

impl DeckDescription {
    /// Create an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deck-wide default style.
    pub fn with_default_style(mut self, style: StyleSpec) -> Self {
        self.default_style = Some(style);
        self
    }

    /// Append a slide.
    pub fn add_slide(&mut self, slide: SlideDescription) {
        self.slides.push(slide);
    }

    /// Decode a description from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the description as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The closed set of slide intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    /// Opening slide: title plus subtitle.
    Title,
    /// Title plus an outline body.
    Content,
}

impl SlideKind {
    /// Lower-case name used in descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlideKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            other => Err(Error::UnknownLayout(format!("no slide kind named '{}'", other))),
        }
    }
}

/// One slide before validation.
///
/// For [`SlideKind::Title`] slides the body carries the subtitle lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideDescription {
    /// Slide intent.
    pub kind: SlideKind,

    /// Text for the title placeholder.
    pub title: String,

    /// Override applied to the title text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_style: Option<StyleSpec>,

    /// Default style for every body node on this slide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_style: Option<StyleSpec>,

    /// Outline content, in display order.
    #[serde(default)]
    pub body: Vec<ContentNode>,
}

impl SlideDescription {
    /// Create a slide of the given kind with an empty body.
    pub fn new(kind: SlideKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            title_style: None,
            default_style: None,
            body: Vec::new(),
        }
    }

    /// Create a title slide with a single subtitle line.
    pub fn title_slide(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        let mut slide = Self::new(SlideKind::Title, title);
        slide.body.push(ContentNode::new(subtitle, 0));
        slide
    }

    /// Create a content slide with an empty body.
    pub fn content(title: impl Into<String>) -> Self {
        Self::new(SlideKind::Content, title)
    }

    /// Set the title style override.
    pub fn with_title_style(mut self, style: StyleSpec) -> Self {
        self.title_style = Some(style);
        self
    }

    /// Set the slide-level default body style.
    pub fn with_default_style(mut self, style: StyleSpec) -> Self {
        self.default_style = Some(style);
        self
    }

    /// Append a node to the body, rejecting it if its indentation does not
    /// follow from what the body already holds.
    pub fn push(&mut self, node: ContentNode) -> Result<&mut Self> {
        self.body.push(node);
        if let Err(e) = validate_outline(&self.body, None) {
            self.body.pop();
            return Err(e);
        }
        Ok(self)
    }

    /// Append several nodes in order, stopping at the first rejected one.
    pub fn extend<I>(&mut self, nodes: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = ContentNode>,
    {
        for node in nodes {
            self.push(node)?;
        }
        Ok(self)
    }

    /// Total number of body nodes, including nested children.
    pub fn node_count(&self) -> usize {
        self.body.iter().map(ContentNode::node_count).sum()
    }
}

/// A node in a slide's body outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Paragraph text. Empty text renders as a blank spacer line.
    #[serde(default)]
    pub text: String,

    /// Indentation depth, 0 being the top level.
    #[serde(default)]
    pub level: u8,

    /// Typography override for this node and its children.
    #[serde(default, rename = "style", skip_serializing_if = "Option::is_none")]
    pub style_override: Option<StyleSpec>,

    /// Nested nodes, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a node with the given text and level.
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level,
            style_override: None,
            children: Vec::new(),
        }
    }

    /// Create an empty spacer line.
    pub fn spacer(level: u8) -> Self {
        Self::new(String::new(), level)
    }

    /// Create a `label: detail` row.
    pub fn entry(label: &str, detail: &str, level: u8) -> Self {
        Self::new(format!("{}: {}", label, detail), level)
    }

    /// Set the style override, consuming the node.
    pub fn with_style(mut self, style: StyleSpec) -> Self {
        self.style_override = Some(style);
        self
    }

    /// Set the style override in place.
    pub fn set_style(&mut self, style: StyleSpec) {
        self.style_override = Some(style);
    }

    /// Attach a child. Its level must equal this node's level or be one deeper.
    pub fn add_child(&mut self, child: ContentNode) -> Result<&mut Self> {
        let max_allowed = self.level.saturating_add(1);
        if child.level < self.level || child.level > max_allowed {
            return Err(Error::InvalidLevel {
                location: NodeLocation::under(
                    &self.text,
                    NodePath::from(vec![self.children.len()]),
                ),
                level: child.level,
                min_allowed: self.level,
                max_allowed,
            });
        }

        self.children.push(child);
        Ok(self)
    }

    /// Attach a child, consuming and returning the node.
    pub fn with_child(mut self, child: ContentNode) -> Result<Self> {
        self.add_child(child)?;
        Ok(self)
    }

    /// True when this node exists only to add vertical space.
    pub fn is_spacer(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ContentNode::node_count).sum::<usize>()
    }
}

/// Position of a node inside a slide body: child indices from the top level down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Zero-based child indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth of the addressed node (1 for a top-level node).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    /// One-based and dotted, e.g. `2.1` for the first child of the second node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        let parts: Vec<String> = self.0.iter().map(|i| (i + 1).to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

/// A node path, plus the slide it belongs to once the slide is part of a deck.
///
/// When `parent` is set the path is relative to that node rather than to
/// the slide body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLocation {
    /// 1-based slide number, if known.
    pub slide: Option<usize>,
    /// Path within the slide body, or within `parent`.
    pub path: NodePath,
    /// Text of the node the path is relative to.
    pub parent: Option<String>,
}

impl NodeLocation {
    /// Create a location within a slide body.
    pub fn new(slide: Option<usize>, path: NodePath) -> Self {
        Self {
            slide,
            path,
            parent: None,
        }
    }

    /// Create a location relative to a parent node that is not yet in a body.
    pub fn under(parent: &str, path: NodePath) -> Self {
        Self {
            slide: None,
            path,
            parent: Some(parent.to_string()),
        }
    }
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.parent, self.slide) {
            (Some(parent), _) => write!(f, "child {} of node '{}'", self.path, parent),
            (None, Some(slide)) => write!(f, "slide {}, node {}", slide, self.path),
            (None, None) => write!(f, "node {}", self.path),
        }
    }
}

/// Check the indentation rules over a whole body, in document order.
///
/// A node may be at most one level deeper than the deepest level seen so far
/// in the body (so the first node must sit at level 0), and a child must sit
/// at its parent's level or one deeper.
pub(crate) fn validate_outline(nodes: &[ContentNode], slide: Option<usize>) -> Result<()> {
    let mut max_seen = None;
    let mut path = NodePath::root();
    validate_nodes(nodes, None, &mut max_seen, &mut path, slide)
}

fn validate_nodes(
    nodes: &[ContentNode],
    parent_level: Option<u8>,
    max_seen: &mut Option<u8>,
    path: &mut NodePath,
    slide: Option<usize>,
) -> Result<()> {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);

        let ceiling = max_seen.map_or(0, |m: u8| m.saturating_add(1));
        let (min_allowed, max_allowed) = match parent_level {
            Some(parent) => (parent, ceiling.min(parent.saturating_add(1))),
            None => (0, ceiling),
        };

        if node.level < min_allowed || node.level > max_allowed {
            return Err(Error::InvalidLevel {
                location: NodeLocation::new(slide, path.clone()),
                level: node.level,
                min_allowed,
                max_allowed,
            });
        }

        *max_seen = Some(max_seen.map_or(node.level, |m| m.max(node.level)));
        validate_nodes(&node.children, Some(node.level), max_seen, path, slide)?;

        path.pop();
    }

    Ok(())
}

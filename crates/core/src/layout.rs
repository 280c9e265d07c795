//! Mapping from slide intent to concrete layouts and placeholder roles.

use crate::error::{Error, Result};
use crate::types::SlideKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the layout used for opening slides.
pub const TITLE_SLIDE_LAYOUT: &str = "Title Slide";

/// Name of the layout used for outline slides.
pub const TITLE_AND_CONTENT_LAYOUT: &str = "Title and Content";

/// A named content slot defined by a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceholderRole {
    /// The slide title.
    Title,
    /// Secondary line under the title on an opening slide.
    Subtitle,
    /// Outline body.
    Body,
}

impl fmt::Display for PlaceholderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Body => "body",
        };
        f.write_str(name)
    }
}

/// Identifier of a layout as understood by a codec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutId(String);

impl LayoutId {
    /// Create a layout identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The layout name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A slide kind resolved to its layout and the placeholders that layout guarantees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBinding {
    /// The kind this binding serves.
    pub kind: SlideKind,
    /// Layout to instantiate.
    pub layout: LayoutId,
    /// Placeholder roles in write order, title first.
    pub roles: Vec<PlaceholderRole>,
}

impl LayoutBinding {
    /// Create a binding. Roles are reordered so that the title comes first;
    /// the relative order of the remaining roles is kept.
    pub fn new(kind: SlideKind, layout: LayoutId, mut roles: Vec<PlaceholderRole>) -> Self {
        roles.sort_by_key(|role| *role != PlaceholderRole::Title);
        Self {
            kind,
            layout,
            roles,
        }
    }

    /// Whether the layout exposes a role.
    pub fn exposes(&self, role: PlaceholderRole) -> bool {
        self.roles.contains(&role)
    }

    /// The role after the title, which receives the slide body.
    pub fn secondary_role(&self) -> Option<PlaceholderRole> {
        self.roles
            .iter()
            .copied()
            .find(|role| *role != PlaceholderRole::Title)
    }
}

/// Resolves slide kinds against a table of bindings.
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    bindings: Vec<LayoutBinding>,
}

impl Default for LayoutResolver {
    fn default() -> Self {
        Self::empty()
            .with_binding(LayoutBinding::new(
                SlideKind::Title,
                LayoutId::new(TITLE_SLIDE_LAYOUT),
                vec![PlaceholderRole::Title, PlaceholderRole::Subtitle],
            ))
            .with_binding(LayoutBinding::new(
                SlideKind::Content,
                LayoutId::new(TITLE_AND_CONTENT_LAYOUT),
                vec![PlaceholderRole::Title, PlaceholderRole::Body],
            ))
    }
}

impl LayoutResolver {
    /// Create a resolver with the standard title and content layouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with no bindings.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a binding, replacing any existing binding for the same kind.
    pub fn with_binding(mut self, binding: LayoutBinding) -> Self {
        self.bindings.retain(|b| b.kind != binding.kind);
        self.bindings.push(binding);
        self
    }

    /// Resolve a slide kind to its binding.
    pub fn resolve(&self, kind: SlideKind) -> Result<LayoutBinding> {
        self.bindings
            .iter()
            .find(|b| b.kind == kind)
            .cloned()
            .ok_or_else(|| Error::UnknownLayout(format!("no layout bound to slide kind '{}'", kind)))
    }

    /// All bindings, in insertion order.
    pub fn bindings(&self) -> &[LayoutBinding] {
        &self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_title_slide() {
        let binding = LayoutResolver::new().resolve(SlideKind::Title).unwrap();
        assert_eq!(binding.layout.as_str(), TITLE_SLIDE_LAYOUT);
        assert_eq!(
            binding.roles,
            vec![PlaceholderRole::Title, PlaceholderRole::Subtitle]
        );
        assert_eq!(binding.secondary_role(), Some(PlaceholderRole::Subtitle));
    }

    #[test]
    fn test_resolve_content_slide() {
        let binding = LayoutResolver::new().resolve(SlideKind::Content).unwrap();
        assert_eq!(binding.layout.as_str(), TITLE_AND_CONTENT_LAYOUT);
        assert_eq!(binding.roles, vec![PlaceholderRole::Title, PlaceholderRole::Body]);
        assert!(binding.exposes(PlaceholderRole::Body));
        assert!(!binding.exposes(PlaceholderRole::Subtitle));
    }

    #[test]
    fn test_missing_binding_is_unknown_layout() {
        let resolver = LayoutResolver::empty();
        assert!(matches!(
            resolver.resolve(SlideKind::Content),
            Err(Error::UnknownLayout(_))
        ));
    }

    #[test]
    fn test_title_role_moved_first() {
        let binding = LayoutBinding::new(
            SlideKind::Content,
            LayoutId::new("Custom"),
            vec![PlaceholderRole::Body, PlaceholderRole::Title],
        );
        assert_eq!(binding.roles, vec![PlaceholderRole::Title, PlaceholderRole::Body]);
    }

    #[test]
    fn test_with_binding_replaces_same_kind() {
        let resolver = LayoutResolver::new().with_binding(LayoutBinding::new(
            SlideKind::Content,
            LayoutId::new("Two Content"),
            vec![PlaceholderRole::Title, PlaceholderRole::Body],
        ));
        assert_eq!(resolver.bindings().len(), 2);
        assert_eq!(
            resolver.resolve(SlideKind::Content).unwrap().layout.as_str(),
            "Two Content"
        );
    }
}

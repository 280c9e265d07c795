//! Typography overrides and the cascade that resolves them.
//!
//! Styles are layered: theme default (left to the codec), deck default,
//! slide default, every ancestor's override, then the node's own override.
//! A field that is absent at one layer inherits from the layer below it;
//! absence never means "reset".

use serde::{Deserialize, Serialize};
use std::fmt;

/// An sRGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a six-digit hex string such as `1F497D` (a leading `#` is allowed).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Upper-case hex form without a leading `#`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Optional typography overrides for a run of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size_pt: Option<f32>,

    /// Bold weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    /// Text color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

impl StyleSpec {
    /// An empty style that inherits everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font size in points.
    pub fn with_font_size(mut self, pt: f32) -> Self {
        self.font_size_pt = Some(pt);
        self
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set the text color.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.font_size_pt.is_none() && self.bold.is_none() && self.color.is_none()
    }

    /// Merge `over` on top of `self`: every field present in `over` wins,
    /// every absent one keeps the value from `self`.
    pub fn apply(&self, over: Option<&StyleSpec>) -> StyleSpec {
        let Some(over) = over else {
            return self.clone();
        };

        StyleSpec {
            font_size_pt: over.font_size_pt.or(self.font_size_pt),
            bold: over.bold.or(self.bold),
            color: over.color.or(self.color),
        }
    }

    /// Check that every set field can be encoded.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self.font_size_pt {
            Some(pt) if !pt.is_finite() || pt <= 0.0 => {
                Err(format!("font size must be a positive number of points, got {}", pt))
            }
            _ => Ok(()),
        }
    }
}

/// Resolves effective styles by folding layers of overrides.
///
/// The engine keeps a stack mirroring the depth of the content tree being
/// walked: `push` enters a node, `pop` leaves it.
#[derive(Debug, Clone)]
pub struct StyleEngine {
    stack: Vec<StyleSpec>,
}

impl StyleEngine {
    /// Start a cascade from a base style.
    pub fn new(base: StyleSpec) -> Self {
        Self { stack: vec![base] }
    }

    /// Right-biased merge of one override onto a base.
    pub fn apply(base: &StyleSpec, over: Option<&StyleSpec>) -> StyleSpec {
        base.apply(over)
    }

    /// The style in effect at the current depth.
    pub fn current(&self) -> &StyleSpec {
        // The base layer is never popped.
        &self.stack[self.stack.len() - 1]
    }

    /// Enter a layer, returning the style now in effect.
    pub fn push(&mut self, over: Option<&StyleSpec>) -> StyleSpec {
        let resolved = self.current().apply(over);
        self.stack.push(resolved.clone());
        resolved
    }

    /// Leave the innermost layer. The base layer stays in place.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Number of layers above the base.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}

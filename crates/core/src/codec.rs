//! Contract between the deck renderer and a presentation file encoder.
//!
//! A codec opens exactly one [`CodecSession`] per render. The session is
//! consumed by either [`CodecSession::persist`] or [`CodecSession::discard`],
//! so a session can never be written twice or left dangling.

use crate::error::Result;
use crate::layout::{LayoutId, PlaceholderRole};
use crate::style::StyleSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Target slide dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    /// Width in EMU.
    pub width_emu: i64,
    /// Height in EMU.
    pub height_emu: i64,
}

impl Default for Canvas {
    /// 10in x 7.5in (4:3).
    fn default() -> Self {
        Self::from_inches(10.0, 7.5)
    }
}

impl Canvas {
    /// Create a canvas from dimensions in inches.
    pub fn from_inches(width: f64, height: f64) -> Self {
        Self {
            width_emu: (width * EMU_PER_INCH as f64).round() as i64,
            height_emu: (height * EMU_PER_INCH as f64).round() as i64,
        }
    }

    /// 13.333in x 7.5in (16:9).
    pub fn widescreen() -> Self {
        Self {
            width_emu: 12_192_000,
            height_emu: 6_858_000,
        }
    }
}

/// One line of text as handed to a codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text content; empty for a spacer line.
    pub text: String,
    /// Indentation level.
    pub level: u8,
    /// Effective style.
    pub style: StyleSpec,
}

impl Paragraph {
    /// Create a paragraph.
    pub fn new(text: impl Into<String>, level: u8, style: StyleSpec) -> Self {
        Self {
            text: text.into(),
            level,
            style,
        }
    }
}

/// Handle to a slide created inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlideHandle(usize);

impl SlideHandle {
    /// Wrap a zero-based slide index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Zero-based slide index.
    pub fn index(&self) -> usize {
        self.0
    }

    /// 1-based slide number.
    pub fn number(&self) -> usize {
        self.0 + 1
    }
}

/// Handle to a placeholder on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderHandle {
    slide: SlideHandle,
    role: PlaceholderRole,
}

impl PlaceholderHandle {
    /// Create a handle.
    pub fn new(slide: SlideHandle, role: PlaceholderRole) -> Self {
        Self { slide, role }
    }

    /// Owning slide.
    pub fn slide(&self) -> SlideHandle {
        self.slide
    }

    /// Placeholder role.
    pub fn role(&self) -> PlaceholderRole {
        self.role
    }
}

/// What a successful render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Where the artifact was written.
    pub path: PathBuf,
    /// Number of slides it contains.
    pub slide_count: usize,
    /// Size on disk, 0 for codecs that do not write files.
    pub bytes_written: u64,
}

/// A presentation encoder.
pub trait PresentationCodec {
    /// The writer session this codec hands out.
    type Session: CodecSession;

    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Start a session targeting the given canvas.
    fn open_session(&self, canvas: Canvas) -> Result<Self::Session>;
}

/// A single-writer session producing one artifact.
pub trait CodecSession {
    /// Append a slide using the given layout.
    fn add_slide(&mut self, layout: &LayoutId) -> Result<SlideHandle>;

    /// Look up a placeholder on a slide, failing with
    /// [`Error::PlaceholderNotFound`](crate::Error::PlaceholderNotFound) if the
    /// slide's layout does not expose the role.
    fn get_placeholder(
        &mut self,
        slide: SlideHandle,
        role: PlaceholderRole,
    ) -> Result<PlaceholderHandle>;

    /// Replace the placeholder's text with the given paragraphs.
    fn write_text(&mut self, placeholder: PlaceholderHandle, paragraphs: &[Paragraph]) -> Result<()>;

    /// Finalize the session and write the artifact, overwriting `destination`.
    fn persist(self, destination: &Path) -> Result<RenderedArtifact>
    where
        Self: Sized;

    /// Finalize the session without writing anything.
    fn discard(self)
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_canvas_is_ten_by_seven_and_a_half_inches() {
        let canvas = Canvas::default();
        assert_eq!(canvas.width_emu, 9_144_000);
        assert_eq!(canvas.height_emu, 6_858_000);
    }

    #[test]
    fn test_widescreen_canvas() {
        assert_eq!(Canvas::widescreen(), Canvas::from_inches(13.333_333, 7.5));
    }

    #[test]
    fn test_slide_handle_numbering() {
        let handle = SlideHandle::new(2);
        assert_eq!(handle.index(), 2);
        assert_eq!(handle.number(), 3);
    }
}

//! PPTX codec: collects slides in memory and writes the package on persist.

use crate::package::{self, PendingSlide};
use crate::parts::{LayoutPart, MAX_PARAGRAPH_LEVEL};
use deck_core::{
    Canvas, CodecSession, Error, LayoutId, Paragraph, PlaceholderHandle, PlaceholderRole,
    PresentationCodec, RenderedArtifact, Result, SlideHandle,
};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Codec for PPTX (Office Open XML) files.
pub struct PptxCodec;

impl PptxCodec {
    /// Create a new PPTX codec.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PptxCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationCodec for PptxCodec {
    type Session = PptxSession;

    fn name(&self) -> &str {
        "pptx"
    }

    fn open_session(&self, canvas: Canvas) -> Result<Self::Session> {
        log::debug!(
            "Opening PPTX session ({}x{} EMU)",
            canvas.width_emu,
            canvas.height_emu
        );
        Ok(PptxSession {
            canvas,
            slides: Vec::new(),
        })
    }
}

/// Writer session for one PPTX file.
#[derive(Debug)]
pub struct PptxSession {
    canvas: Canvas,
    slides: Vec<PendingSlide>,
}

impl PptxSession {
    /// Number of slides added so far.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Encode the session into package bytes without touching the filesystem.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        package::assemble(self.canvas, &self.slides)
    }
}

impl CodecSession for PptxSession {
    fn add_slide(&mut self, layout: &LayoutId) -> Result<SlideHandle> {
        let part = LayoutPart::from_name(layout.as_str()).ok_or_else(|| {
            Error::UnknownLayout(format!("PPTX codec has no layout named '{}'", layout))
        })?;

        self.slides.push(PendingSlide::new(part));
        Ok(SlideHandle::new(self.slides.len() - 1))
    }

    fn get_placeholder(
        &mut self,
        slide: SlideHandle,
        role: PlaceholderRole,
    ) -> Result<PlaceholderHandle> {
        let exposed = self
            .slides
            .get(slide.index())
            .is_some_and(|s| s.layout.roles().contains(&role));

        if !exposed {
            return Err(Error::PlaceholderNotFound {
                slide: slide.number(),
                role,
            });
        }

        Ok(PlaceholderHandle::new(slide, role))
    }

    fn write_text(&mut self, placeholder: PlaceholderHandle, paragraphs: &[Paragraph]) -> Result<()> {
        let slide_number = placeholder.slide().number();
        let slide = self
            .slides
            .get_mut(placeholder.slide().index())
            .ok_or(Error::PlaceholderNotFound {
                slide: slide_number,
                role: placeholder.role(),
            })?;

        if let Some(deep) = paragraphs.iter().find(|p| p.level > MAX_PARAGRAPH_LEVEL) {
            return Err(Error::Codec(format!(
                "Slide {}: paragraph level {} exceeds the PPTX maximum of {}",
                slide_number, deep.level, MAX_PARAGRAPH_LEVEL
            )));
        }

        slide.set_text(placeholder.role(), paragraphs);
        Ok(())
    }

    fn persist(self, destination: &Path) -> Result<RenderedArtifact> {
        let bytes = self.to_bytes()?;
        write_atomically(destination, &bytes)?;

        log::debug!(
            "Persisted {} slides to {}",
            self.slides.len(),
            destination.display()
        );

        Ok(RenderedArtifact {
            path: destination.to_path_buf(),
            slide_count: self.slides.len(),
            bytes_written: bytes.len() as u64,
        })
    }

    fn discard(self) {
        log::debug!("Discarding PPTX session with {} slides", self.slides.len());
    }
}

/// Write into a temporary file beside `destination`, then rename it over the
/// destination. A failed write leaves any previous file untouched.
fn write_atomically(destination: &Path, bytes: &[u8]) -> Result<()> {
    let persist_err = |source: std::io::Error| Error::Persist {
        path: destination.to_path_buf(),
        source,
    };

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(persist_err)?;
    file.write_all(bytes).map_err(persist_err)?;
    file.as_file().sync_all().map_err(persist_err)?;
    file.persist(destination).map_err(|e| persist_err(e.error))?;
    Ok(())
}

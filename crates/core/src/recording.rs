//! In-memory codec that records every operation it receives.
//!
//! Used for dry runs and for checking the exact call sequence a render
//! produces. The operation log is shared between the codec and its session,
//! so it stays readable after the session has been consumed.

use crate::codec::{
    Canvas, CodecSession, Paragraph, PlaceholderHandle, PresentationCodec, RenderedArtifact,
    SlideHandle,
};
use crate::error::{Error, Result};
use crate::layout::{LayoutId, LayoutResolver, PlaceholderRole};
use std::cell::RefCell;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One call received by a [`RecordingSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum CodecOp {
    /// A session was opened.
    OpenSession(Canvas),
    /// A slide was appended.
    AddSlide(LayoutId),
    /// A placeholder was requested.
    GetPlaceholder {
        /// 1-based slide number.
        slide: usize,
        /// Requested role.
        role: PlaceholderRole,
    },
    /// Text was written into a placeholder.
    WriteText {
        /// 1-based slide number.
        slide: usize,
        /// Target role.
        role: PlaceholderRole,
        /// Paragraphs in order.
        paragraphs: Vec<Paragraph>,
    },
    /// The session was persisted.
    Persist(PathBuf),
    /// The session was discarded.
    Discard,
}

/// An injected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every placeholder lookup on this 1-based slide fails.
    MissingPlaceholder {
        /// 1-based slide number.
        slide: usize,
    },
    /// Persisting fails with a permission error.
    PersistDenied,
}

/// Codec that keeps an operation log instead of writing a file.
#[derive(Debug, Clone, Default)]
pub struct RecordingCodec {
    layouts: LayoutResolver,
    fault: Option<Fault>,
    log: Rc<RefCell<Vec<CodecOp>>>,
}

impl RecordingCodec {
    /// Create a codec that accepts the standard layouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the layouts (and their roles) from the given resolver instead.
    pub fn with_layouts(mut self, layouts: LayoutResolver) -> Self {
        self.layouts = layouts;
        self
    }

    /// Inject a failure.
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Snapshot of the operations recorded so far.
    pub fn operations(&self) -> Vec<CodecOp> {
        self.log.borrow().clone()
    }

    /// Layouts of every slide added so far, in order.
    pub fn added_layouts(&self) -> Vec<LayoutId> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                CodecOp::AddSlide(layout) => Some(layout.clone()),
                _ => None,
            })
            .collect()
    }

    /// Paragraphs last written to a placeholder on a 1-based slide.
    pub fn written(&self, slide: usize, role: PlaceholderRole) -> Option<Vec<Paragraph>> {
        self.log.borrow().iter().rev().find_map(|op| match op {
            CodecOp::WriteText {
                slide: s,
                role: r,
                paragraphs,
            } if *s == slide && *r == role => Some(paragraphs.clone()),
            _ => None,
        })
    }

    /// Human-readable transcript of the operation log.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for op in self.log.borrow().iter() {
            // Writing to a String cannot fail.
            let _ = match op {
                CodecOp::OpenSession(canvas) => writeln!(
                    out,
                    "open session {}x{} EMU",
                    canvas.width_emu, canvas.height_emu
                ),
                CodecOp::AddSlide(layout) => writeln!(out, "add slide [{}]", layout),
                CodecOp::GetPlaceholder { slide, role } => {
                    writeln!(out, "  slide {} placeholder {}", slide, role)
                }
                CodecOp::WriteText {
                    role, paragraphs, ..
                } => {
                    let mut result = writeln!(out, "  write {} ({} paragraphs)", role, paragraphs.len());
                    for p in paragraphs {
                        result = result.and_then(|_| {
                            writeln!(out, "    {}{}", "  ".repeat(p.level as usize), p.text)
                        });
                    }
                    result
                }
                CodecOp::Persist(path) => writeln!(out, "persist {}", path.display()),
                CodecOp::Discard => writeln!(out, "discard"),
            };
        }
        out
    }
}

impl PresentationCodec for RecordingCodec {
    type Session = RecordingSession;

    fn name(&self) -> &str {
        "recording"
    }

    fn open_session(&self, canvas: Canvas) -> Result<Self::Session> {
        self.log.borrow_mut().push(CodecOp::OpenSession(canvas));
        Ok(RecordingSession {
            layouts: self.layouts.clone(),
            fault: self.fault,
            log: Rc::clone(&self.log),
            slides: Vec::new(),
        })
    }
}

/// Session handed out by [`RecordingCodec`].
#[derive(Debug)]
pub struct RecordingSession {
    layouts: LayoutResolver,
    fault: Option<Fault>,
    log: Rc<RefCell<Vec<CodecOp>>>,
    slides: Vec<Vec<PlaceholderRole>>,
}

impl RecordingSession {
    fn record(&self, op: CodecOp) {
        self.log.borrow_mut().push(op);
    }
}

impl CodecSession for RecordingSession {
    fn add_slide(&mut self, layout: &LayoutId) -> Result<SlideHandle> {
        let roles = self
            .layouts
            .bindings()
            .iter()
            .find(|b| &b.layout == layout)
            .map(|b| b.roles.clone())
            .ok_or_else(|| Error::UnknownLayout(format!("codec has no layout named '{}'", layout)))?;

        self.record(CodecOp::AddSlide(layout.clone()));
        self.slides.push(roles);
        Ok(SlideHandle::new(self.slides.len() - 1))
    }

    fn get_placeholder(
        &mut self,
        slide: SlideHandle,
        role: PlaceholderRole,
    ) -> Result<PlaceholderHandle> {
        self.record(CodecOp::GetPlaceholder {
            slide: slide.number(),
            role,
        });

        let injected = matches!(
            self.fault,
            Some(Fault::MissingPlaceholder { slide: n }) if n == slide.number()
        );
        let exposed = self
            .slides
            .get(slide.index())
            .is_some_and(|roles| roles.contains(&role));

        if injected || !exposed {
            return Err(Error::PlaceholderNotFound {
                slide: slide.number(),
                role,
            });
        }

        Ok(PlaceholderHandle::new(slide, role))
    }

    fn write_text(&mut self, placeholder: PlaceholderHandle, paragraphs: &[Paragraph]) -> Result<()> {
        self.record(CodecOp::WriteText {
            slide: placeholder.slide().number(),
            role: placeholder.role(),
            paragraphs: paragraphs.to_vec(),
        });
        Ok(())
    }

    fn persist(self, destination: &Path) -> Result<RenderedArtifact> {
        if self.fault == Some(Fault::PersistDenied) {
            self.record(CodecOp::Discard);
            return Err(Error::Persist {
                path: destination.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            });
        }

        self.record(CodecOp::Persist(destination.to_path_buf()));
        Ok(RenderedArtifact {
            path: destination.to_path_buf(),
            slide_count: self.slides.len(),
            bytes_written: 0,
        })
    }

    fn discard(self) {
        self.record(CodecOp::Discard);
    }
}

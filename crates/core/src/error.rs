//! Error types for deck assembly and rendering.

use crate::layout::PlaceholderRole;
use crate::types::NodeLocation;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or rendering a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// A content node's indentation breaks the single-step rule.
    #[error("Invalid indentation at {location}: level {level} is outside {min_allowed}..={max_allowed}")]
    InvalidLevel {
        /// Where the offending node sits.
        location: NodeLocation,
        /// The level the node declared.
        level: u8,
        /// Lowest level accepted at that position.
        min_allowed: u8,
        /// Highest level accepted at that position.
        max_allowed: u8,
    },

    /// A style override carries a value no codec can encode.
    #[error("Invalid style at {location}: {reason}")]
    InvalidStyle {
        /// Where the offending node sits.
        location: NodeLocation,
        /// What is wrong with the style.
        reason: String,
    },

    /// No layout is bound to the requested slide kind.
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    /// The slide's layout does not expose a placeholder the builder expects.
    #[error("Placeholder {role} not found on slide {slide}")]
    PlaceholderNotFound {
        /// 1-based slide number.
        slide: usize,
        /// The role that was requested.
        role: PlaceholderRole,
    },

    /// Writing the finished artifact to durable storage failed.
    #[error("Failed to persist {}: {source}", path.display())]
    Persist {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// A deck description could not be decoded.
    #[error("Invalid deck description: {0}")]
    Description(String),

    /// The codec failed to encode the session contents.
    #[error("Codec error: {0}")]
    Codec(String),

    /// ZIP archive error (reading a persisted PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (reading a persisted PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Description(e.to_string())
    }
}

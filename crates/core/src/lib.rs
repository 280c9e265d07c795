//! Core content model, layout resolution, style cascading and rendering
//! for declarative slide decks.

pub mod codec;
pub mod deck;
pub mod error;
pub mod layout;
pub mod recording;
pub mod render;
pub mod style;
pub mod types;

pub use codec::{
    Canvas, CodecSession, Paragraph, PlaceholderHandle, PresentationCodec, RenderedArtifact,
    SlideHandle,
};
pub use deck::{build, BodyNode, Deck, SlideSpec};
pub use error::{Error, Result};
pub use layout::{LayoutBinding, LayoutId, LayoutResolver, PlaceholderRole};
pub use recording::{CodecOp, Fault, RecordingCodec};
pub use render::{render, DeckRenderer};
pub use style::{Rgb, StyleEngine, StyleSpec};
pub use types::{ContentNode, DeckDescription, NodeLocation, NodePath, SlideDescription, SlideKind};

//! Scene graph and text measurement.
//!
//! The assembly pipeline emits an immutable tree of abstract primitives
//! (group, line, rect, circle, path, text, image). Encoders in
//! [`crate::output`] turn the tree into a concrete format.

mod scene;
mod text;

pub use scene::{SceneNode, Style, TextAnchor, TextNode};
pub use text::{HeuristicTextMeasurer, TextMeasurer};

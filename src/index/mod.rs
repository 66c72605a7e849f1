//! Table-of-contents layout and rendering.
//!
//! The index is laid out exactly once: [`layout::IndexLayout`] assigns every
//! row a page number and a bounding rectangle, and both the renderer and the
//! annotator consume that one value read-only. There is no second
//! vertical-cursor implementation to keep in sync, so link rectangles land on
//! the rendered text by construction.

pub mod layout;
pub mod render;

pub use layout::{IndexLayout, RowPlacement};
pub use render::IndexRenderer;

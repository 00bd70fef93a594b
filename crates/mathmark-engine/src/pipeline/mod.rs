//! # Markdown Pipeline
//!
//! A small host for the math extensions: finds math in a markdown document
//! and renders the document to HTML.
//!
//! ## Modules
//!
//! - **`cursor`**: `Cursor` for character-by-character scanning
//! - **`scan`**: `tokenize()` splitting a document into text, raw zones and
//!   math tokens
//! - **`html`**: `render_markdown()` rendering math with KaTeX and the rest
//!   with pulldown-cmark
//!
//! ## Raw Zones
//!
//! Code spans and fenced code blocks are never scanned for math, so
//! `` `$x$` `` stays code.

pub mod cursor;
pub mod html;
pub mod scan;

pub use html::render_markdown;
pub use scan::{Segment, tokenize};

pub mod delimiters;
pub mod extension;
pub mod pipeline;
pub mod render;

// Re-export key types for easier usage
pub use delimiters::{CompiledMatcher, DelimiterError, DelimiterSpec, MathKind, MathToken, compile};
pub use extension::{BlockMath, InlineMath, Level, TokenizerExtension};
pub use pipeline::{Segment, render_markdown, tokenize};
pub use render::{OutputFormat, RenderError, RenderOptions, render};

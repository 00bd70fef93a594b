//! # Delimiter Matching
//!
//! Recognises math spans such as `$...$`, `$$...$$`, `\(...\)` and `\[...\]`
//! at the start of a string.
//!
//! ## Modules
//!
//! - **`spec`**: `DelimiterSpec` and the default delimiter list
//! - **`rules`**: turns an ordered list into inline and block pattern sources
//! - **`matcher`**: `CompiledMatcher` with `match_inline`, `match_block` and
//!   `start_index`
//! - **`token`**: `MathToken` and `MathKind`
//!
//! ## Precedence
//!
//! Delimiters are tried in list order. A block delimiter contributes two
//! branches: one used inline (`$$x$$` in a sentence) and one that requires
//! the content to sit on its own lines:
//!
//! ```text
//! $$
//! E=mc^2
//! $$
//! ```
//!
//! A closing delimiter only counts when it is followed by the end of input,
//! whitespace or punctuation, so `$5 and $6` is not math.

pub mod matcher;
pub mod rules;
pub mod spec;
pub mod token;

pub use matcher::{CompiledMatcher, compile};
pub use spec::DelimiterSpec;
pub use token::{MathKind, MathToken};

#[derive(Debug, thiserror::Error)]
pub enum DelimiterError {
    #[error("Delimiter #{index} has an empty left or right token")]
    EmptyDelimiter { index: usize },
    #[error("Invalid delimiter pattern: {0}")]
    Pattern(#[from] regex::Error),
}

use serde::Serialize;

/// Which tokenizer produced a [`MathToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MathKind {
    /// Math inside a line of text (`inlineKatex`).
    Inline,
    /// Math on its own lines, wrapped in newlines inside the delimiters
    /// (`blockKatex`).
    Block,
}

impl MathKind {
    pub fn name(self) -> &'static str {
        match self {
            MathKind::Inline => "inlineKatex",
            MathKind::Block => "blockKatex",
        }
    }
}

/// A matched math span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MathToken {
    /// The full matched text including delimiters. Its length is how much
    /// input the span consumes.
    pub raw: String,
    /// The content between the delimiters, trimmed.
    pub text: String,
    /// True when the span was opened by a block-style delimiter.
    pub display_mode: bool,
}

impl MathToken {
    /// Number of input bytes this token consumes.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

//! Tokenizer extensions a host pipeline can register.
//!
//! Each extension owns a name, the level it runs at, a cheap `start` check and
//! a `tokenize` function that only ever looks at the unconsumed input.

use crate::delimiters::{CompiledMatcher, MathKind, MathToken};

/// Where in the document an extension is tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Anywhere inside a line.
    Inline,
    /// Only at the start of a line.
    Block,
}

pub trait TokenizerExtension {
    fn name(&self) -> &'static str;

    fn level(&self) -> Level;

    /// Index of the first position worth calling [`Self::tokenize`] at.
    fn start(&self, src: &str) -> Option<usize>;

    /// Matches a token at the very start of `src`.
    fn tokenize(&self, src: &str) -> Option<MathToken>;

    fn kind(&self) -> MathKind {
        match self.level() {
            Level::Inline => MathKind::Inline,
            Level::Block => MathKind::Block,
        }
    }
}

/// Inline math: `$x$`, `\(x\)`, and block delimiters used within a line.
#[derive(Debug, Clone, Copy)]
pub struct InlineMath<'m> {
    pub matcher: &'m CompiledMatcher,
}

/// Display math whose content sits on its own lines.
#[derive(Debug, Clone, Copy)]
pub struct BlockMath<'m> {
    pub matcher: &'m CompiledMatcher,
}

impl TokenizerExtension for InlineMath<'_> {
    fn name(&self) -> &'static str {
        MathKind::Inline.name()
    }

    fn level(&self) -> Level {
        Level::Inline
    }

    fn start(&self, src: &str) -> Option<usize> {
        self.matcher.start_index(src)
    }

    fn tokenize(&self, src: &str) -> Option<MathToken> {
        self.matcher.match_inline(src)
    }
}

impl TokenizerExtension for BlockMath<'_> {
    fn name(&self) -> &'static str {
        MathKind::Block.name()
    }

    fn level(&self) -> Level {
        Level::Block
    }

    fn start(&self, src: &str) -> Option<usize> {
        self.matcher.start_index(src)
    }

    fn tokenize(&self, src: &str) -> Option<MathToken> {
        self.matcher.match_block(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_report_their_kind() {
        let matcher = CompiledMatcher::default_matcher();
        let inline = InlineMath { matcher };
        let block = BlockMath { matcher };

        assert_eq!(inline.name(), "inlineKatex");
        assert_eq!(inline.kind(), MathKind::Inline);
        assert_eq!(block.name(), "blockKatex");
        assert_eq!(block.kind(), MathKind::Block);
    }

    #[test]
    fn extensions_delegate_to_matcher() {
        let matcher = CompiledMatcher::default_matcher();
        let extensions: [&dyn TokenizerExtension; 2] =
            [&BlockMath { matcher }, &InlineMath { matcher }];

        let src = "$$\nx\n$$";
        assert_eq!(extensions[0].start(src), Some(0));
        assert!(extensions[0].tokenize(src).is_some());
        assert!(extensions[1].tokenize("$y$").is_some());
        assert!(extensions[1].tokenize("y").is_none());
    }
}

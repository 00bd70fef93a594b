use serde::{Deserialize, Serialize};

/// One delimiter pair recognised by the matcher.
///
/// Block delimiters (`is_block`) also match inline when the content is not
/// wrapped in newlines, and their left token marks a span as display math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterSpec {
    pub left: String,
    pub right: String,
    #[serde(rename = "display", alias = "is_block", default)]
    pub is_block: bool,
}

impl DelimiterSpec {
    pub fn new(left: impl Into<String>, right: impl Into<String>, is_block: bool) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            is_block,
        }
    }

    pub fn inline(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new(left, right, false)
    }

    pub fn block(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new(left, right, true)
    }

    /// The default delimiter list, in precedence order.
    ///
    /// `$$` sits before `$` so that `$$x$$` is read as display math rather
    /// than as `$` wrapping `$x`.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::block("$$", "$$"),
            Self::inline("$", "$"),
            Self::inline(r"\pu{", "}"),
            Self::inline(r"\ce{", "}"),
            Self::inline(r"\(", r"\)"),
            Self::block(r"\[", r"\]"),
            Self::block(r"\begin{equation}", r"\end{equation}"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_put_double_dollar_first() {
        let specs = DelimiterSpec::defaults();
        assert_eq!(specs[0], DelimiterSpec::block("$$", "$$"));
        assert_eq!(specs[1], DelimiterSpec::inline("$", "$"));
    }

    #[test]
    fn defaults_have_no_empty_tokens() {
        for spec in DelimiterSpec::defaults() {
            assert!(!spec.left.is_empty());
            assert!(!spec.right.is_empty());
        }
    }
}

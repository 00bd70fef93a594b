use super::spec::DelimiterSpec;

/// Characters allowed directly after a closing delimiter: whitespace, ASCII
/// punctuation and common CJK punctuation. Anything else means the closing
/// token belongs to ordinary text (`$5 and $6`).
pub const TERMINATOR_CLASS: &str = r"[\s!-/:-@\[-`{-~。，？！：]";

/// One content unit: an escaped pair, or any non-backslash character.
const UNIT: &str = r"(?:\\[\s\S]|[^\\])";

/// Same as [`UNIT`] but may not be a newline. Used for the first unit of a
/// block delimiter read inline.
const UNIT_NO_NEWLINE: &str = r"(?:\\[\s\S]|[^\\\n])";

/// Pattern sources generated from an ordered delimiter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSources {
    /// `None` when no delimiter can match inline.
    pub inline: Option<String>,
    /// `None` when the list holds no block delimiters.
    pub block: Option<String>,
}

/// Builds the inline and block pattern sources.
///
/// Branch order follows `specs`, so earlier delimiters win when several could
/// match at the same position. Group 1 is the whole span without the
/// terminator; every branch contributes exactly one further content group.
pub fn generate(specs: &[DelimiterSpec]) -> RuleSources {
    let mut inline_branches = Vec::with_capacity(specs.len());
    let mut block_branches = Vec::new();

    for spec in specs {
        let left = regex::escape(&spec.left);
        let right = regex::escape(&spec.right);

        if !spec.is_block {
            inline_branches.push(format!("{left}({UNIT}+?){right}"));
            continue;
        }

        // Read inline, a block delimiter may not have a newline directly
        // inside either token. A right token that itself starts with a
        // newline can never satisfy that, so the inline branch is omitted.
        if !spec.right.starts_with('\n') {
            inline_branches.push(format!("{left}({UNIT_NO_NEWLINE}{UNIT}*?){right}"));
        }
        block_branches.push(format!(r"{left}\n({UNIT}+?)\n{right}"));
    }

    RuleSources {
        inline: anchor(&inline_branches),
        block: anchor(&block_branches),
    }
}

fn anchor(branches: &[String]) -> Option<String> {
    if branches.is_empty() {
        return None;
    }
    Some(format!(
        "^({})(?:{TERMINATOR_CLASS}|$)",
        branches.join("|")
    ))
}

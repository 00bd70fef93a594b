use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{
    DelimiterError,
    rules::{self, RuleSources},
    spec::DelimiterSpec,
    token::MathToken,
};

/// Inline and block rules compiled from an ordered delimiter list.
///
/// Immutable once built; share it by reference between callers and threads.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    inline: Option<Regex>,
    block: Option<Regex>,
    /// Left tokens of block delimiters, longest first.
    display_prefixes: Vec<String>,
    /// Leading characters of every left token, in declaration order.
    triggers: Vec<char>,
}

/// Compiles `specs` into a matcher. Earlier specs take precedence.
pub fn compile(specs: &[DelimiterSpec]) -> Result<CompiledMatcher, DelimiterError> {
    for (index, spec) in specs.iter().enumerate() {
        if spec.left.is_empty() || spec.right.is_empty() {
            return Err(DelimiterError::EmptyDelimiter { index });
        }
    }

    let RuleSources { inline, block } = rules::generate(specs);
    let inline = inline.as_deref().map(Regex::new).transpose()?;
    let block = block.as_deref().map(Regex::new).transpose()?;

    let mut display_prefixes: Vec<String> = Vec::new();
    for spec in specs.iter().filter(|spec| spec.is_block) {
        if !display_prefixes.contains(&spec.left) {
            display_prefixes.push(spec.left.clone());
        }
    }
    // Stable, so equal lengths keep declaration order
    display_prefixes.sort_by_key(|prefix| std::cmp::Reverse(prefix.len()));

    let mut triggers = Vec::new();
    for c in specs.iter().filter_map(|spec| spec.left.chars().next()) {
        if !triggers.contains(&c) {
            triggers.push(c);
        }
    }

    log::debug!(
        "compiled {} delimiters (triggers: {:?}, display: {:?})",
        specs.len(),
        triggers,
        display_prefixes
    );

    Ok(CompiledMatcher {
        inline,
        block,
        display_prefixes,
        triggers,
    })
}

impl CompiledMatcher {
    /// The matcher for [`DelimiterSpec::defaults`], built on first use.
    pub fn default_matcher() -> &'static CompiledMatcher {
        static DEFAULT: OnceLock<CompiledMatcher> = OnceLock::new();
        DEFAULT.get_or_init(|| {
            compile(&DelimiterSpec::defaults()).expect("Invalid default delimiter list")
        })
    }

    /// Matches an inline span at the very start of `input`.
    ///
    /// The span is display math when it opens with a block delimiter's left
    /// token, e.g. `$$x$$` inside a line.
    pub fn match_inline(&self, input: &str) -> Option<MathToken> {
        let caps = self.inline.as_ref()?.captures(input)?;
        let raw = caps.get(1)?.as_str();
        let display_mode = self
            .display_prefixes
            .iter()
            .any(|prefix| raw.starts_with(prefix.as_str()));
        Some(token_from(&caps, raw, display_mode))
    }

    /// Matches a block span (content wrapped in newlines inside the
    /// delimiters) at the very start of `input`. Always display math.
    pub fn match_block(&self, input: &str) -> Option<MathToken> {
        let caps = self.block.as_ref()?.captures(input)?;
        let raw = caps.get(1)?.as_str();
        Some(token_from(&caps, raw, true))
    }

    /// Byte index of the first character that could open a span.
    ///
    /// A cheap pre-filter: `None` means neither match function can succeed
    /// anywhere in `input`.
    pub fn start_index(&self, input: &str) -> Option<usize> {
        input.find(self.triggers.as_slice())
    }

    /// Whether `c` is the first character of some left delimiter.
    pub fn is_trigger(&self, c: char) -> bool {
        self.triggers.contains(&c)
    }
}

impl Default for CompiledMatcher {
    fn default() -> Self {
        Self::default_matcher().clone()
    }
}

fn token_from(caps: &Captures<'_>, raw: &str, display_mode: bool) -> MathToken {
    // Exactly one content group participates; it may be blank (`$ $`).
    let text = caps
        .iter()
        .skip(2)
        .flatten()
        .map(|m| m.as_str().trim())
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    MathToken {
        raw: raw.to_string(),
        text: text.to_string(),
        display_mode,
    }
}

use crate::{
    delimiters::{CompiledMatcher, MathKind, MathToken},
    extension::{BlockMath, InlineMath, TokenizerExtension},
};

use super::cursor::Cursor;

/// A piece of a markdown document after math tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Markdown that contains no math.
    Text(&'a str),
    /// A code span or fenced code block. Never scanned for math.
    Raw(&'a str),
    Math { kind: MathKind, token: MathToken },
}

impl Segment<'_> {
    /// The source text this segment covers.
    pub fn source(&self) -> &str {
        match self {
            Segment::Text(s) | Segment::Raw(s) => s,
            Segment::Math { token, .. } => &token.raw,
        }
    }
}

/// Splits `src` into text, raw zones and math tokens.
///
/// Code spans and fenced code are raw zones: `` `$x$` `` stays code. Block
/// math is only tried where nothing but indentation precedes the cursor on
/// its line; inline math is tried at every trigger character and never runs
/// past the end of the current paragraph or heading. A backslash
/// escape such as `\$` is plain text. Concatenating the [`Segment::source`]
/// of every segment reproduces `src`.
pub fn tokenize<'a>(matcher: &CompiledMatcher, src: &'a str) -> Vec<Segment<'a>> {
    let block = BlockMath { matcher };
    let inline = InlineMath { matcher };
    let mut scan = Scanner::new(src);

    while let Some(c) = scan.cur.peek() {
        if scan.cur.at_line_start()
            && let Some(len) = fenced_code_len(scan.cur.rest())
        {
            scan.push_raw(len);
            continue;
        }

        if matcher.is_trigger(c) {
            if scan.cur.line_prefix_is_blank()
                && let Some(token) = block.tokenize(scan.cur.rest())
            {
                scan.push_math(block.kind(), token);
                continue;
            }
            if let Some(token) = inline.tokenize(scan.inline_window()) {
                scan.push_math(inline.kind(), token);
                continue;
            }
        }

        match c {
            '`' => {
                let ticks = scan.cur.run_len('`');
                match code_span_len(scan.cur.rest(), ticks) {
                    Some(len) => scan.push_raw(len),
                    // An unmatched backtick run is literal text
                    None => scan.cur.bump_n(ticks),
                }
                continue;
            }
            '\\' if scan
                .cur
                .peek_second()
                .is_some_and(|next| next.is_ascii_punctuation()) =>
            {
                scan.cur.bump();
                scan.cur.bump();
            }
            _ => {
                scan.cur.bump();
            }
        }
        scan.skip_plain(&inline);
    }

    scan.finish()
}

struct Scanner<'a> {
    src: &'a str,
    cur: Cursor<'a>,
    text_start: usize,
    out: Vec<Segment<'a>>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            cur: Cursor::new(src),
            text_start: 0,
            out: vec![],
        }
    }

    fn flush_text(&mut self) {
        let end = self.cur.pos();
        if end > self.text_start {
            self.out.push(Segment::Text(&self.src[self.text_start..end]));
        }
    }

    fn push_raw(&mut self, len: usize) {
        self.flush_text();
        let start = self.cur.pos();
        self.out.push(Segment::Raw(&self.src[start..start + len]));
        self.cur.bump_n(len);
        self.text_start = self.cur.pos();
    }

    fn push_math(&mut self, kind: MathKind, token: MathToken) {
        self.flush_text();
        log::debug!("{} at {}: {:?}", kind.name(), self.cur.pos(), token.text);
        self.cur.bump_n(token.len());
        self.out.push(Segment::Math { kind, token });
        self.text_start = self.cur.pos();
    }

    /// The unconsumed input up to the end of the current block: the next
    /// blank line, fence opener or ATX heading. A heading line is a block of
    /// its own.
    fn inline_window(&self) -> &'a str {
        let rest = self.cur.rest();
        let first_end = rest.find('\n').map_or(rest.len(), |nl| nl + 1);
        if is_atx_heading(self.cur.current_line()) {
            return &rest[..first_end];
        }

        let mut offset = first_end;
        while offset < rest.len() {
            let line_end = rest[offset..]
                .find('\n')
                .map_or(rest.len(), |nl| offset + nl + 1);
            let line = &rest[offset..line_end];
            if line.trim().is_empty() || fence_opener(line).is_some() || is_atx_heading(line) {
                break;
            }
            offset = line_end;
        }
        &rest[..offset]
    }

    /// Jumps to the next position that could start something: a trigger
    /// character, a backtick, a backslash or the start of a line.
    fn skip_plain(&mut self, inline: &InlineMath<'_>) {
        if self.cur.at_line_start() {
            return;
        }
        let rest = self.cur.rest();
        let next = [
            inline.start(rest),
            rest.find(['`', '\\']),
            rest.find('\n').map(|nl| nl + 1),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
        self.cur.bump_n(next);
    }

    fn finish(mut self) -> Vec<Segment<'a>> {
        self.flush_text();
        self.out
    }
}

/// Length of a code span opened by `ticks` backticks at the start of `rest`,
/// up to and including the closing run of exactly as many backticks.
fn code_span_len(rest: &str, ticks: usize) -> Option<usize> {
    let body = &rest[ticks..];
    let mut i = 0;
    while let Some(found) = body[i..].find('`') {
        let at = i + found;
        let run = body[at..].bytes().take_while(|&b| b == b'`').count();
        if run == ticks {
            return Some(ticks + at + run);
        }
        i = at + run;
    }
    None
}

/// Length of a fenced code block starting at the start of `rest`, through its
/// closing fence line. An unclosed fence runs to the end of the document.
fn fenced_code_len(rest: &str) -> Option<usize> {
    let (fence, width) = fence_opener(rest)?;
    let first_line_end = rest.find('\n').map_or(rest.len(), |nl| nl + 1);

    let mut offset = first_line_end;
    while offset < rest.len() {
        let line_end = rest[offset..]
            .find('\n')
            .map_or(rest.len(), |nl| offset + nl + 1);
        let line = &rest[offset..line_end];
        let trimmed = line.trim_start_matches(' ');
        if line.len() - trimmed.len() <= 3 {
            let closing = trimmed.bytes().take_while(|&b| b == fence).count();
            if closing >= width && trimmed[closing..].trim().is_empty() {
                return Some(line_end);
            }
        }
        offset = line_end;
    }
    Some(rest.len())
}

/// Fence character and width when the line at the start of `line` opens a
/// fenced code block.
fn fence_opener(line: &str) -> Option<(u8, usize)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let opener = &line[indent..];
    let fence = match opener.as_bytes().first() {
        Some(b'`') => b'`',
        Some(b'~') => b'~',
        _ => return None,
    };
    let width = opener.bytes().take_while(|&b| b == fence).count();
    if width < 3 {
        return None;
    }
    let first_line_end = opener.find('\n').map_or(opener.len(), |nl| nl + 1);
    if fence == b'`' && opener[width..first_line_end].contains('`') {
        return None;
    }
    Some((fence, width))
}

/// `#` to `######` followed by a space, tab or end of line, indented at
/// most three spaces.
fn is_atx_heading(line: &str) -> bool {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return false;
    }
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    (1..=6).contains(&hashes)
        && matches!(
            trimmed.as_bytes().get(hashes),
            None | Some(b' ' | b'\t' | b'\n' | b'\r')
        )
}

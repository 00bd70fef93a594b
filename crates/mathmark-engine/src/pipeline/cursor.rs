/// A cursor over a markdown source, moving one character at a time.
///
/// Positions are byte offsets into `s` and always sit on a char boundary.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.s[self.i..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Peeks at the character after the current one.
    pub fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    /// True at offset 0 or directly after a newline.
    pub fn at_line_start(&self) -> bool {
        self.i == 0 || self.s.as_bytes().get(self.i - 1) == Some(&b'\n')
    }

    fn line_start(&self) -> usize {
        self.s[..self.i].rfind('\n').map_or(0, |nl| nl + 1)
    }

    /// True when only spaces or tabs precede the cursor on its line.
    pub fn line_prefix_is_blank(&self) -> bool {
        self.s[self.line_start()..self.i]
            .chars()
            .all(|c| c == ' ' || c == '\t')
    }

    /// The whole line the cursor is on, including its newline.
    pub fn current_line(&self) -> &'a str {
        let start = self.line_start();
        let end = self.s[self.i..]
            .find('\n')
            .map_or(self.s.len(), |nl| self.i + nl + 1);
        &self.s[start..end]
    }

    /// Advances by one character, returning it.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Advances by `n` bytes. `n` must land on a char boundary.
    pub fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.s.len());
    }

    /// Counts how many times `c` repeats from the current position.
    pub fn run_len(&self, c: char) -> usize {
        self.rest().chars().take_while(|&x| x == c).count()
    }
}

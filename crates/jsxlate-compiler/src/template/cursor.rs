/// A cursor over template text that tracks the column.
///
/// Templates are single expressions, usually on one line; the column is
/// what diagnostics report.
pub struct Cursor<'src> {
    source: &'src str,
    /// Remaining text, starting at the current position.
    rest: &'src str,
    /// Byte offset from the start of the template.
    offset: usize,
    /// Column (1-indexed, byte based).
    column: u32,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
            column: 1,
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    /// Current character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// The nth character ahead (0 = current).
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    #[inline]
    pub fn check_str(&self, s: &str) -> bool {
        self.rest.starts_with(s)
    }

    /// Consume the current character.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        let len = ch.len_utf8();
        self.rest = &self.rest[len..];
        self.offset += len;
        self.column += len as u32;
        Some(ch)
    }

    /// Consume `s` if the remaining text starts with it.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.check_str(s) {
            self.rest = &self.rest[s.len()..];
            self.offset += s.len();
            self.column += s.len() as u32;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches; returns the slice.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        while self.check(&f) {
            self.advance();
        }
        &self.source[start..self.offset]
    }

    /// Source text between `start` and the current position.
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.offset]
    }
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_column() {
        let mut c = Cursor::new("ab c");
        assert_eq!(c.advance(), Some('a'));
        assert_eq!(c.column(), 2);
        assert_eq!(c.eat_while(is_ident_continue), "b");
        assert!(c.eat(' '));
        assert_eq!(c.column(), 4);
        assert_eq!(c.peek(), Some('c'));
    }

    #[test]
    fn eat_str_and_slice() {
        let mut c = Cursor::new("===x");
        let start = c.offset();
        assert!(c.eat_str("==="));
        assert_eq!(c.slice_from(start), "===");
        assert_eq!(c.peek_nth(0), Some('x'));
        assert!(!c.eat_str("=="));
    }
}

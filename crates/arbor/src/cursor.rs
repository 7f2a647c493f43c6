//! Byte cursor shared by the JSON, XML and XPath parsers

use crate::error::Pos;

/// Cursor for navigating byte input with position tracking
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    /// Create cursor from byte slice
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Get current byte without consuming
    pub fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Check whether the remaining input starts with `pattern`
    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.remaining().starts_with(pattern)
    }

    /// Advance cursor by one byte
    pub fn advance(&mut self) {
        if let Some(b) = self.current() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    /// Advance cursor by `count` bytes
    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    /// Skip whitespace
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.current() {
            if is_whitespace(b) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consume byte if it matches
    pub fn consume(&mut self, expected: u8) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `pattern` if the remaining input starts with it
    pub fn consume_bytes(&mut self, pattern: &[u8]) -> bool {
        if self.starts_with(pattern) {
            self.advance_by(pattern.len());
            true
        } else {
            false
        }
    }

    /// Consume bytes while `pred` holds, returning the consumed slice
    pub fn take_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while let Some(b) = self.current() {
            if !pred(b) {
                break;
            }
            self.advance();
        }
        self.slice_from(start)
    }

    /// Consume everything up to and including `pattern`, returning the bytes
    /// before it. Returns `None` (cursor at end) if the pattern never occurs.
    pub fn take_until(&mut self, pattern: &[u8]) -> Option<&'a [u8]> {
        let start = self.pos;
        while !self.is_eof() {
            if self.starts_with(pattern) {
                let taken = self.slice_from(start);
                self.advance_by(pattern.len());
                return Some(taken);
            }
            self.advance();
        }
        None
    }

    /// Consume a `'` or `"` delimited run and return its raw contents.
    ///
    /// No escape processing happens here; JSON strings are decoded by the JSON
    /// parser itself.
    pub fn take_quoted(&mut self) -> Option<&'a [u8]> {
        let quote = match self.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return None,
        };
        let checkpoint = self.clone();
        self.advance();
        let start = self.pos;
        while let Some(b) = self.current() {
            if b == quote {
                let taken = self.slice_from(start);
                self.advance();
                return Some(taken);
            }
            self.advance();
        }
        *self = checkpoint;
        None
    }

    /// Consume an `open ... close` run, honouring nesting and skipping over
    /// quoted text, and return the bytes between the outer delimiters.
    pub fn take_balanced(&mut self, open: u8, close: u8) -> Option<&'a [u8]> {
        if self.current() != Some(open) {
            return None;
        }
        let checkpoint = self.clone();
        self.advance();
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(b) = self.current() {
            match b {
                b'"' | b'\'' => {
                    if self.take_quoted().is_none() {
                        break;
                    }
                    continue;
                }
                _ if b == open => depth += 1,
                _ if b == close => {
                    depth -= 1;
                    if depth == 0 {
                        let taken = self.slice_from(start);
                        self.advance();
                        return Some(taken);
                    }
                }
                _ => {}
            }
            self.advance();
        }
        *self = checkpoint;
        None
    }

    /// Get current position
    pub const fn position(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    /// Check if at end of input
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get remaining bytes
    pub fn remaining(&self) -> &'a [u8] {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Get current position index
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Get slice from start to current position
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        self.input.get(start..self.pos).unwrap_or_default()
    }
}

/// The whitespace set shared by every grammar in the crate
pub const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_basic() {
        let mut cursor = Cursor::new(b"hello");
        assert_eq!(cursor.current(), Some(b'h'));
        assert!(cursor.starts_with(b"hel"));
        cursor.advance();
        assert_eq!(cursor.current(), Some(b'e'));
    }

    #[test]
    fn test_cursor_whitespace() {
        let mut cursor = Cursor::new(b"  \t\nhello");
        cursor.skip_whitespace();
        assert_eq!(cursor.current(), Some(b'h'));
        assert_eq!(cursor.position().line, 2);
    }

    #[test]
    fn test_cursor_consume() {
        let mut cursor = Cursor::new(b"abc");
        assert!(cursor.consume(b'a'));
        assert!(!cursor.consume(b'z'));
        assert!(cursor.consume_bytes(b"bc"));
        assert!(cursor.is_eof());
        assert_eq!(cursor.current(), None);
    }

    #[test]
    fn test_take_while_and_until() {
        let mut cursor = Cursor::new(b"name rest-->tail");
        assert_eq!(cursor.take_while(|b| b.is_ascii_alphabetic()), b"name");
        assert_eq!(cursor.take_until(b"-->"), Some(&b" rest"[..]));
        assert_eq!(cursor.remaining(), b"tail");
        assert_eq!(cursor.take_until(b"-->"), None);
    }

    #[test]
    fn test_take_quoted() {
        let mut cursor = Cursor::new(b"'a\"b' x");
        assert_eq!(cursor.take_quoted(), Some(&b"a\"b"[..]));
        assert_eq!(cursor.current(), Some(b' '));

        let mut unterminated = Cursor::new(b"\"abc");
        assert_eq!(unterminated.take_quoted(), None);
        assert_eq!(unterminated.pos(), 0);
    }

    #[test]
    fn test_take_balanced() {
        let mut cursor = Cursor::new(b"[@a=']'][2]/b");
        assert_eq!(cursor.take_balanced(b'[', b']'), Some(&b"@a=']'"[..]));
        assert_eq!(cursor.take_balanced(b'[', b']'), Some(&b"2"[..]));
        assert_eq!(cursor.remaining(), b"/b");

        let mut nested = Cursor::new(b"((a)b)c");
        assert_eq!(nested.take_balanced(b'(', b')'), Some(&b"(a)b"[..]));

        let mut open = Cursor::new(b"(a");
        assert_eq!(open.take_balanced(b'(', b')'), None);
        assert_eq!(open.pos(), 0);
    }
}

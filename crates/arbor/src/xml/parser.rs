//! XML parser building the node tree directly

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::node::{Object, Scalar};
use crate::xml::Config;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// XML parser
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    config: &'a Config,
    depth: u16,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a [u8], config: &'a Config) -> Self {
        let input = input.strip_prefix(BOM).unwrap_or(input);
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
        }
    }

    /// Parse a document into an unnamed container of its top-level elements
    pub(crate) fn parse_document(&mut self) -> Result<Object> {
        let document = Object::new();

        loop {
            self.cursor.skip_whitespace();
            if self.cursor.is_eof() {
                break;
            }

            if self.cursor.starts_with(b"<?") {
                self.skip_markup(b"<?", b"?>")?;
            } else if self.cursor.starts_with(b"<!--") {
                self.skip_markup(b"<!--", b"-->")?;
            } else if self.cursor.starts_with(b"<!") {
                self.skip_doctype()?;
            } else if self.cursor.starts_with(b"</") {
                return Err(self.error_here(ErrorKind::InvalidToken, "unexpected closing tag"));
            } else if self.cursor.current() == Some(b'<') {
                let (name, element) = self.parse_element()?;
                document.add_element(&element, &name);
            } else {
                return Err(self.error_here(ErrorKind::InvalidToken, "text outside of an element"));
            }
        }

        if document.is_empty() {
            return Err(self.error_here(ErrorKind::UnexpectedEof, "document has no elements"));
        }
        Ok(document)
    }

    /// Parse one element starting at its `<`. Returns the tag and the element.
    fn parse_element(&mut self) -> Result<(String, Object)> {
        let start = self.cursor.position();
        self.cursor.advance();
        let name = self.parse_name()?;
        let element = Object::named(&name);
        self.parse_attributes(&element)?;

        if self.cursor.consume_bytes(b"/>") {
            return Ok((name, element));
        }
        self.expect_byte(b'>')?;

        self.enter()?;
        let mut text = String::new();
        loop {
            if self.cursor.is_eof() {
                return Err(Error::new(
                    ErrorKind::UnterminatedElement { name },
                    Span::new(start, self.cursor.position()),
                ));
            }

            if self.cursor.starts_with(b"</") {
                self.parse_closing_tag(&name, start)?;
                break;
            } else if self.cursor.starts_with(b"<!--") {
                self.skip_markup(b"<!--", b"-->")?;
            } else if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let data = self
                    .cursor
                    .take_until(b"]]>")
                    .ok_or_else(|| self.error_here(ErrorKind::UnexpectedEof, "unterminated CDATA section"))?;
                text.push_str(&self.utf8(data)?);
            } else if self.cursor.starts_with(b"<?") {
                self.skip_markup(b"<?", b"?>")?;
            } else if self.cursor.current() == Some(b'<') {
                let (child_name, child) = self.parse_element()?;
                element.add_element(&child, &child_name);
            } else {
                let raw = self.cursor.take_while(|b| b != b'<');
                let segment = decode_entities(&self.utf8(raw)?)?;
                if !segment.trim().is_empty() {
                    text.push_str(&segment);
                }
            }
        }
        self.exit();

        let text = text.trim();
        if !text.is_empty() {
            element.set_inner_value(text);
        }
        Ok((name, element))
    }

    fn parse_closing_tag(&mut self, open: &str, start: Pos) -> Result<()> {
        self.cursor.advance_by(2);
        let close = self.parse_name()?;
        if close != open {
            return Err(Error::new(
                ErrorKind::MismatchedTag {
                    open: open.to_string(),
                    close,
                },
                Span::new(start, self.cursor.position()),
            ));
        }
        self.cursor.skip_whitespace();
        self.expect_byte(b'>')
    }

    fn parse_attributes(&mut self, element: &Object) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => return Ok(()),
                Some(_) => {}
                None => {
                    return Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated tag"));
                }
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let raw = self
                .cursor
                .take_quoted()
                .ok_or_else(|| self.error_here(ErrorKind::InvalidToken, "expected quoted attribute value"))?;
            let value = decode_entities(&self.utf8(raw)?)?;

            if element.contains(&name) {
                return Err(self.error_here(ErrorKind::DuplicateAttribute { name }, ""));
            }
            element.set_value(&name, Scalar::String(value));
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        match self.cursor.current() {
            Some(b) if is_name_start(b) => {}
            Some(_) => return Err(self.error_here(ErrorKind::InvalidToken, "expected name")),
            None => return Err(self.error_here(ErrorKind::UnexpectedEof, "expected name")),
        }
        let raw = self.cursor.take_while(is_name_char);
        self.utf8(raw)
    }

    /// Skip `<!DOCTYPE ...>`, including a bracketed internal subset
    fn skip_doctype(&mut self) -> Result<()> {
        self.cursor.advance_by(2);
        while let Some(b) = self.cursor.current() {
            match b {
                b'[' => {
                    if self.cursor.take_balanced(b'[', b']').is_none() {
                        break;
                    }
                }
                b'"' | b'\'' => {
                    if self.cursor.take_quoted().is_none() {
                        break;
                    }
                }
                b'>' => {
                    self.cursor.advance();
                    return Ok(());
                }
                _ => self.cursor.advance(),
            }
        }
        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated declaration"))
    }

    fn skip_markup(&mut self, open: &[u8], close: &[u8]) -> Result<()> {
        self.cursor.advance_by(open.len());
        match self.cursor.take_until(close) {
            Some(_) => Ok(()),
            None => Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated markup")),
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            return Ok(());
        }
        let found = match self.cursor.current() {
            Some(b) => format!("'{}'", char::from(b)),
            None => "end of input".to_string(),
        };
        Err(Error::at(
            ErrorKind::Expected {
                expected: format!("'{}'", char::from(expected)),
                found,
            },
            self.cursor.position(),
        ))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_add(1);
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.cursor.position(),
            ));
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn utf8(&self, bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| Error::at(ErrorKind::InvalidUtf8, self.cursor.position()))
    }

    fn error_here(&self, kind: ErrorKind, message: &str) -> Error {
        let pos = self.cursor.position();
        if message.is_empty() {
            Error::at(kind, pos)
        } else {
            Error::with_message(kind, Span::point(pos), message)
        }
    }
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);
        let after = after.strip_prefix('&').unwrap_or(after);
        let Some(semi) = after.find(';') else {
            return Err(invalid_entity(after));
        };
        let (entity, tail) = after.split_at(semi);
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(invalid_entity(entity)),
        }
        rest = tail.strip_prefix(';').unwrap_or(tail);
    }
    result.push_str(rest);
    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

fn invalid_entity(entity: &str) -> Error {
    Error::new(
        ErrorKind::InvalidEntity {
            entity: entity.chars().take(16).collect(),
        },
        Span::empty(),
    )
}

//! Recursive descent parser for the supported XPath subset
//!
//! ```text
//! path      := ( group | axis? step ) ( axis step )*
//! group     := '(' path ')' predicate?
//! axis      := '//' | '/'
//! step      := name predicate?
//! predicate := '[' ( integer | operand | operand op operand ) ']'
//! operand   := '@' name | name | 'position()' | literal | number
//! ```

use crate::cursor::{is_whitespace, Cursor};
use crate::error::{Error, ErrorKind, Result, Span};
use crate::xpath::ast::{Axis, CompareOp, NameTest, Operand, Predicate, Segment, Step};

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Parse the whole input as one path
    pub(crate) fn parse(mut self) -> Result<Vec<Segment>> {
        let path = self.parse_path()?;
        self.cursor.skip_whitespace();
        if !self.cursor.is_eof() {
            return Err(self.malformed("unexpected trailing input"));
        }
        Ok(path)
    }

    fn parse_path(&mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();

        self.cursor.skip_whitespace();
        if self.cursor.current() == Some(b'(') {
            let inner = self
                .cursor
                .take_balanced(b'(', b')')
                .ok_or_else(|| self.malformed("unbalanced parentheses"))?;
            let path = Self::new(inner).parse()?;
            let predicate = self.parse_predicate()?;
            segments.push(Segment::Group { path, predicate });
        } else {
            let axis = self.parse_axis().unwrap_or(Axis::Child);
            segments.push(Segment::Step(self.parse_step(axis)?));
        }

        loop {
            self.cursor.skip_whitespace();
            if self.cursor.is_eof() {
                break;
            }
            let Some(axis) = self.parse_axis() else {
                return Err(self.malformed("expected '/' or '//'"));
            };
            segments.push(Segment::Step(self.parse_step(axis)?));
        }

        Ok(segments)
    }

    fn parse_axis(&mut self) -> Option<Axis> {
        if self.cursor.consume_bytes(b"//") {
            Some(Axis::Descendant)
        } else if self.cursor.consume(b'/') {
            Some(Axis::Child)
        } else {
            None
        }
    }

    fn parse_step(&mut self, axis: Axis) -> Result<Step> {
        self.cursor.skip_whitespace();
        let name = take_name(&mut self.cursor, true);
        if name.is_empty() {
            return Err(self.malformed("expected element name"));
        }
        if name == "." || name == ".." || name.contains("::") {
            return Err(self.malformed("unsupported axis"));
        }
        if self.cursor.current() == Some(b'(') {
            return Err(self.malformed("unsupported function"));
        }

        let predicate = self.parse_predicate()?;
        self.cursor.skip_whitespace();
        if self.cursor.current() == Some(b'[') {
            return Err(self.malformed("only one predicate per step is supported"));
        }

        Ok(Step {
            axis,
            test: NameTest::new(&name),
            predicate,
        })
    }

    fn parse_predicate(&mut self) -> Result<Option<Predicate>> {
        self.cursor.skip_whitespace();
        if self.cursor.current() != Some(b'[') {
            return Ok(None);
        }
        let body = self
            .cursor
            .take_balanced(b'[', b']')
            .ok_or_else(|| self.malformed("unbalanced brackets"))?;
        parse_predicate_body(body).map(Some)
    }

    fn malformed(&self, message: &str) -> Error {
        Error::with_message(
            ErrorKind::MalformedQuery,
            Span::point(self.cursor.position()),
            message,
        )
    }
}

fn parse_predicate_body(body: &[u8]) -> Result<Predicate> {
    let text = std::str::from_utf8(body).map_err(|_| malformed("invalid utf-8"))?;
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let index = trimmed
            .parse::<usize>()
            .map_err(|_| malformed("position out of range"))?;
        return Ok(Predicate::Position(index));
    }

    let mut cursor = Cursor::new(body);
    let left = parse_operand(&mut cursor)?;
    cursor.skip_whitespace();

    if cursor.is_eof() {
        return match left {
            Operand::Attribute(_) | Operand::Child(_) => Ok(Predicate::Exists(left)),
            // A lone number such as `[1.5]` is a position test
            Operand::Literal(number) if number.parse::<f64>().is_ok() => Ok(Predicate::Compare {
                left: Operand::Position,
                op: CompareOp::Eq,
                right: Operand::Literal(number),
            }),
            _ => Err(malformed("predicate must test, compare or index")),
        };
    }

    let op = parse_compare_op(&mut cursor)?;
    let right = parse_operand(&mut cursor)?;
    cursor.skip_whitespace();
    if !cursor.is_eof() {
        return Err(malformed("unsupported predicate expression"));
    }

    Ok(Predicate::Compare { left, op, right })
}

fn parse_operand(cursor: &mut Cursor<'_>) -> Result<Operand> {
    cursor.skip_whitespace();
    match cursor.current() {
        Some(b'@') => {
            cursor.advance();
            let name = take_name(cursor, false);
            if name.is_empty() {
                return Err(malformed("expected attribute name after '@'"));
            }
            Ok(Operand::Attribute(name))
        }
        Some(b'"' | b'\'') => {
            let raw = cursor
                .take_quoted()
                .ok_or_else(|| malformed("unterminated string literal"))?;
            let text = std::str::from_utf8(raw).map_err(|_| malformed("invalid utf-8"))?;
            Ok(Operand::Literal(text.to_string()))
        }
        Some(b) if b.is_ascii_digit() || b == b'-' || b == b'.' => {
            let raw = cursor.take_while(|b| b.is_ascii_digit() || matches!(b, b'-' | b'.'));
            let text = std::str::from_utf8(raw).map_err(|_| malformed("invalid utf-8"))?;
            if text.parse::<f64>().is_err() {
                return Err(malformed("invalid number"));
            }
            Ok(Operand::Literal(text.to_string()))
        }
        Some(_) => {
            let name = take_name(cursor, false);
            if name.is_empty() {
                return Err(malformed("expected operand"));
            }
            cursor.skip_whitespace();
            if cursor.current() == Some(b'(') {
                if name == "position" && cursor.consume_bytes(b"()") {
                    return Ok(Operand::Position);
                }
                return Err(malformed("unsupported function"));
            }
            if name.contains("::") {
                return Err(malformed("unsupported axis"));
            }
            Ok(Operand::Child(name))
        }
        None => Err(malformed("expected operand")),
    }
}

fn parse_compare_op(cursor: &mut Cursor<'_>) -> Result<CompareOp> {
    let op = if cursor.consume_bytes(b"!=") {
        CompareOp::Ne
    } else if cursor.consume_bytes(b"<=") {
        CompareOp::Le
    } else if cursor.consume_bytes(b">=") {
        CompareOp::Ge
    } else if cursor.consume(b'=') {
        CompareOp::Eq
    } else if cursor.consume(b'<') {
        CompareOp::Lt
    } else if cursor.consume(b'>') {
        CompareOp::Gt
    } else {
        return Err(malformed("expected comparison operator"));
    };
    Ok(op)
}

fn take_name(cursor: &mut Cursor<'_>, allow_wildcards: bool) -> String {
    let raw = cursor.take_while(|b| {
        !is_whitespace(b)
            && (b.is_ascii_alphanumeric()
                || matches!(b, b'_' | b'-' | b'.' | b':')
                || b >= 0x80
                || (allow_wildcards && matches!(b, b'*' | b'?')))
    });
    String::from_utf8_lossy(raw).into_owned()
}

fn malformed(message: &str) -> Error {
    Error::with_message(ErrorKind::MalformedQuery, Span::empty(), message)
}

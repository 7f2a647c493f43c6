//! Recursive descent JSON parser building the node tree directly

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result};
use crate::json::Config;
use crate::node::{Array, Node, Object, Scalar, Value};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// JSON parser with a depth limit
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

    /// Parse a complete document; the root must be an object or an array
    pub(crate) fn parse_document(&mut self) -> Result<Node> {
        self.cursor.skip_whitespace();
        let root = match self.cursor.current() {
            Some(b'{') => Node::Object(self.parse_object()?),
            Some(b'[') => Node::Array(self.parse_array()?),
            Some(_) => {
                // Parse the scalar so malformed input is still reported as such
                self.parse_value()?;
                self.expect_end()?;
                return Err(Error::shape("object or array", "scalar"));
            }
            None => return Err(self.error(ErrorKind::UnexpectedEof)),
        };
        self.expect_end()?;
        Ok(root)
    }

    fn expect_end(&mut self) -> Result<()> {
        self.cursor.skip_whitespace();
        if self.cursor.is_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.cursor.skip_whitespace();
        match self.cursor.current() {
            Some(b'{') => Ok(Value::Object(self.parse_object()?)),
            Some(b'[') => Ok(Value::Array(self.parse_array()?)),
            Some(b'"') => Ok(Value::Scalar(Scalar::String(self.parse_string()?))),
            Some(b'-' | b'0'..=b'9') => Ok(Value::Scalar(Scalar::Number(self.parse_number()?))),
            Some(b't') => self.parse_literal(b"true", Scalar::Bool(true)),
            Some(b'f') => self.parse_literal(b"false", Scalar::Bool(false)),
            Some(b'n') => self.parse_literal(b"null", Scalar::Null),
            Some(_) => Err(self.error(ErrorKind::InvalidToken)),
            None => Err(self.error(ErrorKind::UnexpectedEof)),
        }
    }

    fn parse_object(&mut self) -> Result<Object> {
        self.enter()?;
        self.cursor.advance(); // consume '{'
        let object = Object::new();

        self.cursor.skip_whitespace();
        if self.cursor.consume(b'}') {
            self.exit();
            return Ok(object);
        }

        loop {
            self.cursor.skip_whitespace();
            let key = match self.cursor.current() {
                Some(b'"') => self.parse_string()?,
                Some(b'}') => return Err(self.error(ErrorKind::TrailingComma)),
                None => return Err(self.error(ErrorKind::UnexpectedEof)),
                Some(_) => return Err(self.unexpected("string key")),
            };

            self.cursor.skip_whitespace();
            if !self.cursor.consume(b':') {
                return Err(self.unexpected("':'"));
            }

            let value = self.parse_value()?;
            object.insert_raw(&key, value);

            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b',') => self.cursor.advance(),
                Some(b'}') => {
                    self.cursor.advance();
                    break;
                }
                None => return Err(self.error(ErrorKind::UnexpectedEof)),
                Some(_) => return Err(self.unexpected("',' or '}'")),
            }
        }

        self.lift_inner_value(&object);
        self.exit();
        Ok(object)
    }

    /// Move a scalar stored under the inner-value key into the inner-value slot
    fn lift_inner_value(&self, object: &Object) {
        let key = self.config.inner_value_key.as_str();
        if matches!(object.attribute(key), Some(Value::Scalar(_))) {
            if let Some(Value::Scalar(inner)) = object.take_attribute(key) {
                object.set_inner_raw(Some(inner));
            }
        }
    }

    fn parse_array(&mut self) -> Result<Array> {
        self.enter()?;
        self.cursor.advance(); // consume '['
        let array = Array::new();

        self.cursor.skip_whitespace();
        if self.cursor.consume(b']') {
            self.exit();
            return Ok(array);
        }

        loop {
            self.cursor.skip_whitespace();
            if self.cursor.current() == Some(b']') {
                return Err(self.error(ErrorKind::TrailingComma));
            }

            let value = self.parse_value()?;
            let member = self.wrap_member(value);
            array.push_unchecked(&member);

            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b',') => self.cursor.advance(),
                Some(b']') => {
                    self.cursor.advance();
                    break;
                }
                None => return Err(self.error(ErrorKind::UnexpectedEof)),
                Some(_) => return Err(self.unexpected("',' or ']'")),
            }
        }

        self.exit();
        Ok(array)
    }

    /// Arrays only hold objects: wrap scalars and nested arrays
    fn wrap_member(&self, value: Value) -> Object {
        match value {
            Value::Object(o) => o,
            Value::Scalar(s) => {
                let wrapper = Object::new();
                wrapper.set_inner_raw(Some(s));
                wrapper
            }
            Value::Array(a) => {
                let wrapper = Object::new();
                wrapper.insert_raw(&self.config.inner_value_key, Value::Array(a));
                wrapper
            }
        }
    }

    fn parse_literal(&mut self, literal: &[u8], scalar: Scalar) -> Result<Value> {
        if self.cursor.consume_bytes(literal) {
            Ok(Value::Scalar(scalar))
        } else {
            Err(self.error(ErrorKind::InvalidToken))
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        let start = self.cursor.position();
        self.cursor.advance(); // consume opening quote
        let mut bytes = Vec::new();

        loop {
            match self.cursor.current() {
                None => return Err(Error::at(ErrorKind::UnterminatedString, start)),
                Some(b'"') => {
                    self.cursor.advance();
                    break;
                }
                Some(b'\\') => {
                    self.cursor.advance();
                    let decoded = match self.cursor.current() {
                        Some(b'"') => '"',
                        Some(b'\\') => '\\',
                        Some(b'/') => '/',
                        Some(b'b') => '\x08',
                        Some(b'f') => '\x0C',
                        Some(b'n') => '\n',
                        Some(b'r') => '\r',
                        Some(b't') => '\t',
                        Some(b'u') => {
                            self.cursor.advance();
                            let ch = self.parse_unicode_escape()?;
                            let mut buf = [0u8; 4];
                            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                            continue;
                        }
                        _ => return Err(self.error(ErrorKind::InvalidEscapeSequence)),
                    };
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
                    self.cursor.advance();
                }
                Some(b) if b < 0x20 => {
                    // JSON strings cannot contain raw control characters
                    return Err(self.error(ErrorKind::InvalidToken));
                }
                Some(b) => {
                    bytes.push(b);
                    self.cursor.advance();
                }
            }
        }

        String::from_utf8(bytes).map_err(|_| Error::at(ErrorKind::InvalidUtf8, start))
    }

    /// Decode the hex digits after `\u`, combining surrogate pairs
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let start = self.cursor.position();
        let high = self.parse_hex4()?;

        let code = if (0xD800..0xDC00).contains(&high) {
            if !self.cursor.consume_bytes(b"\\u") {
                return Err(Error::at(ErrorKind::InvalidUnicodeEscape, start));
            }
            let low = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(Error::at(ErrorKind::InvalidUnicodeEscape, start));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };

        char::from_u32(code).ok_or_else(|| Error::at(ErrorKind::InvalidUnicodeEscape, start))
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let mut code: u32 = 0;
        for _ in 0..4 {
            let digit = self
                .cursor
                .current()
                .and_then(|b| char::from(b).to_digit(16))
                .ok_or_else(|| self.error(ErrorKind::InvalidUnicodeEscape))?;
            code = code * 16 + digit;
            self.cursor.advance();
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<f64> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        let invalid = || Error::at(ErrorKind::InvalidNumber, start_pos);

        self.cursor.consume(b'-');
        match self.cursor.current() {
            Some(b'0') => self.cursor.advance(),
            Some(b'1'..=b'9') => {
                self.cursor.take_while(|b| b.is_ascii_digit());
            }
            _ => return Err(invalid()),
        }

        if self.cursor.consume(b'.') && self.cursor.take_while(|b| b.is_ascii_digit()).is_empty() {
            return Err(invalid());
        }

        if matches!(self.cursor.current(), Some(b'e' | b'E')) {
            self.cursor.advance();
            if matches!(self.cursor.current(), Some(b'+' | b'-')) {
                self.cursor.advance();
            }
            if self.cursor.take_while(|b| b.is_ascii_digit()).is_empty() {
                return Err(invalid());
            }
        }

        std::str::from_utf8(self.cursor.slice_from(start))
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .ok_or_else(invalid)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_add(1);
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            return Err(self.error(ErrorKind::MaxDepthExceeded {
                max: self.config.max_depth,
            }));
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::at(kind, self.cursor.position())
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = match self.cursor.current() {
            Some(b) => format!("'{}'", char::from(b)),
            None => "end of input".to_string(),
        };
        self.error(ErrorKind::Expected {
            expected: expected.to_string(),
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Node> {
        Parser::new(input.as_bytes(), &Config::default()).parse_document()
    }

    fn kind(input: &str) -> Option<ErrorKind> {
        parse(input).err().map(|e| e.kind().clone())
    }

    #[test]
    fn test_object_order_and_scalars() -> Result<()> {
        let node = parse(r#"{"b": "x", "a": -1.5e2, "t": true, "n": null}"#)?;
        let obj = node.into_object().unwrap_or_default();
        assert_eq!(obj.keys(), vec!["b", "a", "t", "n"]);
        assert_eq!(obj.scalar("a"), Some(Scalar::Number(-150.0)));
        assert_eq!(obj.scalar("t"), Some(Scalar::Bool(true)));
        assert_eq!(obj.scalar("n"), Some(Scalar::Null));
        Ok(())
    }

    #[test]
    fn test_duplicate_keys_keep_first_position() -> Result<()> {
        let obj = parse(r#"{"a":1,"b":2,"a":3}"#)?.into_object().unwrap_or_default();
        assert_eq!(obj.keys(), vec!["a", "b"]);
        assert_eq!(obj.scalar("a"), Some(Scalar::Number(3.0)));
        Ok(())
    }

    #[test]
    fn test_inner_value_is_lifted() -> Result<()> {
        let obj = parse(r#"{"age":5,"innerValue":"hello"}"#)?
            .into_object()
            .unwrap_or_default();
        assert_eq!(obj.keys(), vec!["age"]);
        assert_eq!(obj.inner_value(), Some(Scalar::from("hello")));
        Ok(())
    }

    #[test]
    fn test_array_members_are_wrapped() -> Result<()> {
        let array = parse(r#"[1, {"a": 2}, [3]]"#)?.into_array().unwrap_or_default();
        assert_eq!(array.len(), 3);

        let first = array.get(0).unwrap_or_default();
        assert_eq!(first.inner_value(), Some(Scalar::Number(1.0)));

        let third = array.get(2).unwrap_or_default();
        let nested = third
            .attribute("innerValue")
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();
        assert_eq!(nested.len(), 1);
        assert_eq!(
            nested.get(0).and_then(|o| o.inner_value()),
            Some(Scalar::Number(3.0))
        );
        Ok(())
    }

    #[test]
    fn test_strings_decode_escapes_and_utf8() -> Result<()> {
        let obj = parse(r#"{"s":"a\n\"é😀ü"}"#)?
            .into_object()
            .unwrap_or_default();
        assert_eq!(obj.scalar("s"), Some(Scalar::from("a\n\"é😀ü")));
        Ok(())
    }

    #[test]
    fn test_malformed_inputs() {
        assert_eq!(kind(r#"{"a":1,}"#), Some(ErrorKind::TrailingComma));
        assert_eq!(kind("[1,]"), Some(ErrorKind::TrailingComma));
        assert!(kind(r#"{"a" 1}"#).is_some());
        assert!(kind(r#"{"a":01}"#).is_some());
        assert_eq!(kind(r#"{"a":"x"#), Some(ErrorKind::UnterminatedString));
        assert_eq!(kind(r#"{"a":tru}"#), Some(ErrorKind::InvalidToken));
        assert!(kind("{} extra").is_some());
        assert_eq!(kind(""), Some(ErrorKind::UnexpectedEof));
        assert_eq!(kind(r#"{"a":1.}"#), Some(ErrorKind::InvalidNumber));
    }

    #[test]
    fn test_scalar_root_is_shape_mismatch() {
        assert!(matches!(
            kind("42"),
            Some(ErrorKind::ShapeMismatch { found: "scalar", .. })
        ));
        assert!(kind("4 2").is_some_and(|k| !matches!(k, ErrorKind::ShapeMismatch { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let config = Config::new(2, 0);
        let result = Parser::new(br#"{"a":{"b":{"c":1}}}"#, &config).parse_document();
        assert!(matches!(
            result.err().map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 2 })
        ));
    }

    #[test]
    fn test_bom_is_skipped() -> Result<()> {
        let node = Parser::new(b"\xEF\xBB\xBF{}", &Config::default()).parse_document()?;
        assert!(node.as_object().is_some_and(Object::is_empty));
        Ok(())
    }
}

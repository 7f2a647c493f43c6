//! Leaf values stored in attribute slots and inner-value slots

use std::fmt;
use std::iter::Peekable;
use std::str::Bytes;

/// A leaf value.
///
/// JSON documents produce every variant; XML documents only ever produce
/// [`Scalar::String`].
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Returns true if this scalar is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a boolean scalar
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view: numbers as-is, strings when they are written as a
    /// decimal number, the same grammar XPath comparisons use. `NaN`, `inf`
    /// and `+1` stay text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => parse_number(s),
            Self::Bool(_) | Self::Null => None,
        }
    }

    /// Text form used for XML output and string comparison
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

/// Reads `text` as `-? digits ( . digits )? ( [eE] [+-]? digits )?`, ignoring
/// surrounding whitespace
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let mut bytes = text.bytes().peekable();

    if bytes.peek() == Some(&b'-') {
        bytes.next();
    }
    if !skip_digits(&mut bytes) {
        return None;
    }
    if bytes.next_if_eq(&b'.').is_some() && !skip_digits(&mut bytes) {
        return None;
    }
    if bytes.next_if(|b| matches!(b, b'e' | b'E')).is_some() {
        bytes.next_if(|b| matches!(b, b'+' | b'-'));
        if !skip_digits(&mut bytes) {
            return None;
        }
    }
    if bytes.next().is_some() {
        return None;
    }
    text.parse().ok()
}

fn skip_digits(bytes: &mut Peekable<Bytes<'_>>) -> bool {
    let mut any = false;
    while bytes.next_if(u8::is_ascii_digit).is_some() {
        any = true;
    }
    any
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

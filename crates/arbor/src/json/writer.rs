//! JSON serializer

use std::fmt::Write as _;

use crate::node::{Array, Object, Scalar, Value};

pub(crate) fn to_string(value: &Value, inner_value_key: &str) -> String {
    let mut writer = Writer::new(inner_value_key, None);
    writer.value(value, 0);
    writer.out
}

pub(crate) fn to_string_pretty(value: &Value, inner_value_key: &str) -> String {
    let mut writer = Writer::new(inner_value_key, Some(2));
    writer.value(value, 0);
    writer.out
}

struct Writer<'k> {
    out: String,
    inner_value_key: &'k str,
    indent: Option<usize>,
}

impl<'k> Writer<'k> {
    fn new(inner_value_key: &'k str, indent: Option<usize>) -> Self {
        Self {
            out: String::new(),
            inner_value_key,
            indent,
        }
    }

    fn value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Scalar(s) => self.scalar(s),
            Value::Object(o) => self.object(o, depth),
            Value::Array(a) => self.array(a, depth),
        }
    }

    fn object(&mut self, object: &Object, depth: usize) {
        let mut entries = Vec::new();
        if let Some(inner) = object.inner_value() {
            entries.push((self.inner_value_key.to_string(), Value::Scalar(inner)));
        }
        entries.extend(object.attributes());

        if entries.is_empty() {
            self.out.push_str("{}");
            return;
        }

        self.out.push('{');
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.newline(depth + 1);
            self.string(key);
            self.out.push(':');
            if self.indent.is_some() {
                self.out.push(' ');
            }
            self.value(value, depth + 1);
        }
        self.newline(depth);
        self.out.push('}');
    }

    fn array(&mut self, array: &Array, depth: usize) {
        let members = array.elements();
        if members.is_empty() {
            self.out.push_str("[]");
            return;
        }

        self.out.push('[');
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.newline(depth + 1);
            match self.unwrapped(member) {
                Some(value) => self.value(&value, depth + 1),
                None => self.object(member, depth + 1),
            }
        }
        self.newline(depth);
        self.out.push(']');
    }

    /// Array members that only wrap a scalar or a nested array are written
    /// back in their bare JSON form
    fn unwrapped(&self, member: &Object) -> Option<Value> {
        let attributes = member.attributes();
        match (member.inner_value(), attributes.as_slice()) {
            (Some(inner), []) => Some(Value::Scalar(inner)),
            (None, [(key, Value::Array(nested))]) if key == self.inner_value_key => {
                Some(Value::Array(nested.clone()))
            }
            _ => None,
        }
    }

    fn scalar(&mut self, scalar: &Scalar) {
        match scalar {
            Scalar::Null => self.out.push_str("null"),
            Scalar::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Scalar::Number(n) if n.is_finite() => {
                let _ = write!(self.out, "{n}");
            }
            Scalar::Number(_) => self.out.push_str("null"),
            Scalar::String(s) => self.string(s),
        }
    }

    fn string(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\x08' => self.out.push_str("\\b"),
                '\x0C' => self.out.push_str("\\f"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if c.is_control() => {
                    let _ = write!(self.out, "\\u{:04x}", u32::from(c));
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn newline(&mut self, depth: usize) {
        if let Some(width) = self.indent {
            self.out.push('\n');
            self.out.push_str(&" ".repeat(width * depth));
        }
    }
}

//! XML serializer

use crate::node::{Array, Object, Value};
use crate::xml::DEFAULT_ELEMENT_NAME;

/// Serialize an object. A named object is written as one element; an unnamed
/// one (such as a parsed document container) contributes only its content.
pub(crate) fn object_to_string(object: &Object) -> String {
    let mut output = String::new();
    match object.element_name() {
        Some(name) => write_element(&name, object, &mut output),
        None => write_content(object, &mut output),
    }
    output
}

/// Serialize an array as sibling elements sharing its name
pub(crate) fn array_to_string(array: &Array) -> String {
    let mut output = String::new();
    write_members(array, array.name().as_deref(), &mut output);
    output
}

fn write_content(object: &Object, output: &mut String) {
    if let Some(inner) = object.inner_value() {
        output.push_str(&escape_xml(&inner.as_text()));
    }
    for (key, value) in object.attributes() {
        match value {
            Value::Scalar(s) if s.is_null() => {}
            Value::Scalar(s) => {
                output.push('<');
                output.push_str(&key);
                output.push('>');
                output.push_str(&escape_xml(&s.as_text()));
                output.push_str("</");
                output.push_str(&key);
                output.push('>');
            }
            Value::Object(o) => write_element(&key, &o, output),
            Value::Array(a) => write_members(&a, Some(&key), output),
        }
    }
}

fn write_members(array: &Array, name: Option<&str>, output: &mut String) {
    for member in array.elements() {
        let tag = name
            .map(str::to_string)
            .or_else(|| member.element_name())
            .unwrap_or_else(|| DEFAULT_ELEMENT_NAME.to_string());
        write_element(&tag, &member, output);
    }
}

fn write_element(name: &str, element: &Object, output: &mut String) {
    output.push('<');
    output.push_str(name);

    let mut children = Vec::new();
    for (key, value) in element.attributes() {
        match value {
            Value::Scalar(s) if s.is_null() => {}
            Value::Scalar(s) => {
                output.push(' ');
                output.push_str(&key);
                output.push_str("=\"");
                output.push_str(&escape_xml(&s.as_text()));
                output.push('"');
            }
            other => children.push((key, other)),
        }
    }

    let inner = element.inner_value().filter(|s| !s.is_null());
    if inner.is_none() && children.is_empty() {
        output.push_str("/>");
        return;
    }

    output.push('>');
    if let Some(inner) = inner {
        output.push_str(&escape_xml(&inner.as_text()));
    }
    for (key, child) in children {
        match child {
            Value::Object(o) => write_element(&key, &o, output),
            Value::Array(a) => write_members(&a, Some(&key), output),
            Value::Scalar(_) => {}
        }
    }
    output.push_str("</");
    output.push_str(name);
    output.push('>');
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

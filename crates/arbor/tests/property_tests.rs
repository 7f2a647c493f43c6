//! Property-based tests for the codecs and the tree
//!
//! 1. JSON documents written in compact form serialize back byte for byte
//! 2. XML documents survive parse -> serialize -> parse structurally
//! 3. Deep copies are structurally equal and share nothing with the source

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Json {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

fn serialize_json(value: &Json) -> String {
    match value {
        Json::Null => "null".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => format!("\"{}\"", escape_json(s)),
        Json::Array(items) => {
            let items: Vec<String> = items.iter().map(serialize_json).collect();
            format!("[{}]", items.join(","))
        }
        Json::Object(pairs) => {
            let pairs: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("\"{k}\":{}", serialize_json(v)))
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
    }
}

fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,5}"
}

fn arb_json_value() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        (-1e6f64..1e6f64).prop_map(Json::Number),
        "[ -~]{0,8}".prop_map(Json::String),
    ];

    leaf.prop_recursive(6, 128, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
            prop::collection::vec((arb_key(), inner), 0..6).prop_map(|pairs| {
                let mut seen = HashSet::new();
                Json::Object(
                    pairs
                        .into_iter()
                        .filter(|(k, _)| seen.insert(k.clone()))
                        .collect(),
                )
            }),
        ]
    })
}

/// Documents must have an object or array root
fn arb_json_document() -> impl Strategy<Value = Json> {
    arb_json_value().prop_map(|value| match value {
        Json::Array(_) | Json::Object(_) => value,
        scalar => Json::Array(vec![scalar]),
    })
}

#[derive(Clone, Debug)]
struct Element {
    name: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    children: Vec<Element>,
}

fn serialize_xml(element: &Element) -> String {
    let mut out = format!("<{}", element.name);
    for (k, v) in &element.attributes {
        out.push_str(&format!(" {k}=\"{}\"", escape_xml(v)));
    }
    if element.text.is_none() && element.children.is_empty() {
        out.push_str("/>");
        return out;
    }
    out.push('>');
    if let Some(text) = &element.text {
        out.push_str(&escape_xml(text));
    }
    for child in &element.children {
        out.push_str(&serialize_xml(child));
    }
    out.push_str(&format!("</{}>", element.name));
    out
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn arb_element() -> impl Strategy<Value = Element> {
    // element and attribute names never collide
    let name = "e[0-3]";
    let attributes = prop::collection::btree_map("a[0-9]", "[ -~]{0,8}", 0..4);
    let text = proptest::option::of("[a-zA-Z0-9&<>'\"]{1,8}");

    let leaf = (name, attributes.clone(), text.clone()).prop_map(|(name, attributes, text)| {
        Element {
            name,
            attributes,
            text,
            children: Vec::new(),
        }
    });

    leaf.prop_recursive(4, 48, 4, move |inner| {
        (
            name,
            attributes.clone(),
            text.clone(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(name, attributes, text, children)| Element {
                name,
                attributes,
                text,
                children,
            })
    })
}

proptest! {
    #[test]
    fn json_roundtrip(value in arb_json_document()) {
        let input = serialize_json(&value);
        let parsed = arbor::from_json(input.as_bytes())?;
        prop_assert_eq!(parsed.to_json(), input);
    }

    #[test]
    fn json_pretty_output_parses_back(value in arb_json_document()) {
        let parsed = arbor::from_json(serialize_json(&value).as_bytes())?;
        let reparsed = arbor::from_json(parsed.to_json_pretty().as_bytes())?;
        prop_assert_eq!(reparsed, parsed);
    }

    #[test]
    fn xml_roundtrip(element in arb_element()) {
        let input = serialize_xml(&element);
        let parsed = arbor::from_xml(input.as_bytes())?;
        let output = parsed.to_xml();
        let reparsed = arbor::from_xml(output.as_bytes())?;
        prop_assert!(reparsed.structurally_eq(&parsed), "{} vs {}", input, output);
        prop_assert_eq!(reparsed.to_xml(), output);
    }

    #[test]
    fn xml_through_json(element in arb_element()) {
        let parsed = arbor::from_xml(serialize_xml(&element).as_bytes())?;
        let json = parsed.to_json();
        let back = arbor::from_json(json.as_bytes())?;
        prop_assert_eq!(back.to_xml(), parsed.to_xml());
    }

    #[test]
    fn deep_copy_is_equal_and_detached(value in arb_json_document()) {
        let parsed = arbor::from_json(serialize_json(&value).as_bytes())?;
        let copy = parsed.deep_copy();
        prop_assert_eq!(&copy, &parsed);

        let before = parsed.to_json();
        if let Some(root) = copy.as_object() {
            root.set_value("zz_marker", true);
        }
        if let Some(root) = copy.as_array() {
            root.push(&arbor::Object::new());
        }
        prop_assert_eq!(parsed.to_json(), before);
    }

    #[test]
    fn malformed_query_never_panics(expression in "[a-z/\\[\\]@=<>!'()*?0-9 ]{0,16}") {
        let root = arbor::Object::from_json(br#"{"a":{"b":[{"c":1},{"c":2}]}}"#)?;
        let _ = root.filter_xpath(&expression);
    }
}

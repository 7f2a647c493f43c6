use arbor::{xml, ErrorKind, Object, Scalar, Value};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn first_child(doc: &Object) -> Object {
    doc.attributes()
        .into_iter()
        .find_map(|(_, v)| v.as_object().cloned())
        .unwrap_or_default()
}

#[test]
fn test_inner_value_round_trip() -> TestResult {
    let input = r#"<person age="5">hello</person>"#;
    let doc = arbor::from_xml(input.as_bytes())?;
    let person = first_child(&doc);

    assert_eq!(person.element_name().as_deref(), Some("person"));
    assert_eq!(person.scalar("age"), Some(Scalar::from("5")));
    assert_eq!(person.inner_value(), Some(Scalar::from("hello")));
    assert_eq!(doc.to_xml(), input);
    assert_eq!(person.to_xml(), input);
    Ok(())
}

#[test]
fn test_nested_document_round_trip() -> TestResult {
    let input = r#"<catalog version="2"><book id="1"><title>Dune</title></book><book id="2"><title>Emma</title><tag/></book><owner>me</owner></catalog>"#;
    let doc = arbor::from_xml(input.as_bytes())?;
    assert_eq!(doc.to_xml(), input);

    let reparsed = arbor::from_xml(doc.to_xml().as_bytes())?;
    assert!(reparsed.structurally_eq(&doc));
    Ok(())
}

#[test]
fn test_repeated_elements_promote_to_array() -> TestResult {
    let doc = arbor::from_xml(b"<r><item>a</item><item>b</item><item>c</item></r>")?;
    let root = first_child(&doc);
    let Some(Value::Array(items)) = root.attribute("item") else {
        return Err("expected an array of items".into());
    };
    let texts: Vec<String> = items
        .elements()
        .iter()
        .filter_map(Object::inner_value)
        .map(|s| s.as_text())
        .collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
    assert_eq!(items.to_xml(), "<item>a</item><item>b</item><item>c</item>");
    Ok(())
}

#[test]
fn test_whitespace_and_mixed_content() -> TestResult {
    let doc = arbor::from_xml(b"<p>\n  one <b>bold</b> two\n</p>")?;
    let p = first_child(&doc);
    assert_eq!(p.inner_value(), Some(Scalar::from("one  two")));
    assert!(p.contains("b"));
    Ok(())
}

#[test]
fn test_escaping_round_trip() -> TestResult {
    let doc = arbor::from_xml(br#"<a q="&quot;x&quot; &amp; y">1 &lt; 2</a>"#)?;
    let a = first_child(&doc);
    assert_eq!(a.scalar("q"), Some(Scalar::from("\"x\" & y")));
    assert_eq!(a.inner_value(), Some(Scalar::from("1 < 2")));
    assert_eq!(
        doc.to_xml(),
        r#"<a q="&quot;x&quot; &amp; y">1 &lt; 2</a>"#
    );
    Ok(())
}

#[test]
fn test_malformed_xml_yields_no_tree() {
    for input in [
        "",
        "<a>",
        "<a></b>",
        "<a><b></a></b>",
        "<a x=\"1\"",
        "<a x=\"1\" x=\"2\"/>",
        "<a>&nope;</a>",
        "<!-- only a comment -->",
        "<a/>trailing",
        "<1a/>",
    ] {
        assert!(arbor::from_xml(input.as_bytes()).is_err(), "{input:?} parsed");
    }
}

#[test]
fn test_error_kinds() {
    let kind = |input: &[u8]| arbor::from_xml(input).err().map(|e| e.kind().clone());
    assert_eq!(
        kind(b"<a></b>"),
        Some(ErrorKind::MismatchedTag {
            open: "a".into(),
            close: "b".into()
        })
    );
    assert_eq!(
        kind(b"<a>"),
        Some(ErrorKind::UnterminatedElement { name: "a".into() })
    );
}

#[test]
fn test_depth_limit() {
    let deep = format!("{}{}", "<a>".repeat(40), "</a>".repeat(40));
    let config = xml::Config::new(16, 0);
    assert!(matches!(
        arbor::from_xml_with_config(deep.as_bytes(), &config).map_err(|e| e.kind().clone()),
        Err(ErrorKind::MaxDepthExceeded { max: 16 })
    ));
    assert!(arbor::from_xml(deep.as_bytes()).is_ok());
}

#[test]
fn test_typed_scalars_serialize_as_text() {
    let obj = Object::named("n")
        .set_value("int", 3)
        .set_value("flag", false)
        .set_inner_value(1.5);
    assert_eq!(obj.to_xml(), r#"<n int="3" flag="false">1.5</n>"#);
}

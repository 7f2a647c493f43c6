use arbor::{Array, Object, Parent, Scalar, Value};

fn child(parent: &Object, name: &str) -> Option<Object> {
    parent.attribute(name).and_then(|v| v.as_object().cloned())
}

fn array(parent: &Object, name: &str) -> Option<Array> {
    parent.attribute(name).and_then(|v| v.as_array().cloned())
}

#[test]
fn test_add_element_promotes_to_array() {
    let root = Object::named("root");
    let first = Object::new().set_inner_value("1");
    let second = Object::new().set_inner_value("2");
    let third = Object::new().set_inner_value("3");

    root.add_element(&first, "item");
    assert!(child(&root, "item").is_some_and(|c| c.ptr_eq(&first)));
    assert!(matches!(first.parent(), Some(Parent::Object(p)) if p.ptr_eq(&root)));

    root.add_element(&second, "item");
    let items = array(&root, "item");
    assert!(items.as_ref().is_some_and(|a| a.len() == 2));
    assert!(items
        .as_ref()
        .and_then(|a| a.get(0))
        .is_some_and(|m| m.ptr_eq(&first)));

    root.add_element(&third, "item");
    assert!(array(&root, "item").is_some_and(|a| a.len() == 3));
    assert_eq!(root.keys(), vec!["item"]);

    for member in [&first, &second, &third] {
        assert_eq!(member.element_name().as_deref(), Some("item"));
        assert!(matches!(member.parent(), Some(Parent::Array(_))));
    }
    assert_eq!(root.to_xml(), "<root><item>1</item><item>2</item><item>3</item></root>");
}

#[test]
fn test_add_element_replaces_scalar_slot() {
    let root = Object::new().set_value("a", "text");
    let element = Object::new().set_value("k", 1);
    root.add_element(&element, "a");
    assert!(child(&root, "a").is_some_and(|c| c.ptr_eq(&element)));
}

#[test]
fn test_remove_until_empty_removes_slot() {
    let root = Object::new();
    let first = Object::new();
    let second = Object::new();
    root.add_element(&first, "item");
    root.add_element(&second, "item");

    root.remove_element(&first);
    assert!(first.parent().is_none());
    // a single survivor stays in its array
    assert!(array(&root, "item").is_some_and(|a| a.len() == 1));

    root.remove_element(&second);
    assert!(!root.contains("item"));
    assert!(root.is_empty());
}

#[test]
fn test_remove_from_parent() {
    let root = Object::new();
    let single = Object::new();
    let member = Object::new();
    root.add_element(&single, "one");
    root.add_element(&member, "many");
    root.add_element(&Object::new(), "many");

    assert!(matches!(single.remove_from_parent(), Some(Parent::Object(p)) if p.ptr_eq(&root)));
    assert!(!root.contains("one"));
    assert!(single.parent().is_none());
    assert!(single.remove_from_parent().is_none());

    assert!(matches!(member.remove_from_parent(), Some(Parent::Array(_))));
    assert!(array(&root, "many").is_some_and(|a| a.len() == 1));
}

#[test]
fn test_moving_an_element_detaches_it() {
    let left = Object::new();
    let right = Object::new();
    let element = Object::new().set_value("v", 1);
    left.add_element(&element, "x");
    right.add_element(&element, "y");

    assert!(!left.contains("x"));
    assert!(child(&right, "y").is_some_and(|c| c.ptr_eq(&element)));
    assert_eq!(element.element_name().as_deref(), Some("y"));
}

#[test]
fn test_cycles_are_refused() {
    let root = Object::new();
    let middle = Object::new();
    let leaf = Object::new();
    root.add_element(&middle, "middle");
    middle.add_element(&leaf, "leaf");

    leaf.add_element(&root, "loop");
    leaf.set_value("loop", root.clone());
    root.add_element(&root, "self");
    assert!(leaf.is_empty());
    assert!(!root.contains("self"));

    let items = Array::new();
    items.push(&Object::new());
    leaf.set_value("items", items.clone());
    let member = items.get(0).unwrap_or_default();
    member.set_value("back", items.clone());
    assert!(!member.contains("back"));
    assert_eq!(root.to_json(), r#"{"middle":{"leaf":{"items":[{}]}}}"#);
}

#[test]
fn test_set_value_overwrites_in_place() {
    let obj = Object::new().set_value("a", 1).set_value("b", 2).set_value("a", 3);
    assert_eq!(obj.keys(), vec!["a", "b"]);
    assert_eq!(obj.scalar("a"), Some(Scalar::Number(3.0)));

    let nested = Object::new();
    obj.set_value("n", nested.clone());
    obj.set_value("n", Scalar::Null);
    assert!(nested.parent().is_none());
    assert_eq!(obj.to_json(), r#"{"a":3,"b":2,"n":null}"#);
}

#[test]
fn test_delete_attribute() {
    let obj = Object::new().set_value("a", 1).set_value("b", 2);
    let nested = Object::new();
    obj.set_value("c", nested.clone());

    obj.delete_attribute("a").delete_attribute("missing").delete_attribute("c");
    assert_eq!(obj.keys(), vec!["b"]);
    assert!(nested.parent().is_none());
}

#[test]
fn test_remove_element_named_keeps_scalars() {
    let obj = Object::new().set_value("a", 1);
    obj.add_element(&Object::new(), "b");
    obj.remove_element_named("a").remove_element_named("b");
    assert_eq!(obj.keys(), vec!["a"]);
}

#[test]
fn test_set_element_name_only_on_detached() {
    let detached = Object::new().set_element_name("free");
    assert_eq!(detached.element_name().as_deref(), Some("free"));

    let root = Object::new();
    root.add_element(&detached, "slot");
    detached.set_element_name("other");
    assert_eq!(detached.element_name().as_deref(), Some("slot"));
}

#[test]
fn test_inner_value() {
    let obj = Object::new().set_inner_value(true);
    assert_eq!(obj.inner_value(), Some(Scalar::Bool(true)));
    obj.clear_inner_value();
    assert_eq!(obj.inner_value(), None);
}

#[test]
fn test_deep_copy_is_independent() -> Result<(), Box<dyn std::error::Error>> {
    let original = Object::from_json(br#"{"a":{"b":[{"c":1},{"c":2}]},"d":"x"}"#)?;
    let copy = original.deep_copy();

    assert!(copy.structurally_eq(&original));
    assert!(!copy.ptr_eq(&original));
    assert!(copy.parent().is_none());

    for c in copy.filter_xpath("//b") {
        c.set_value("c", 99);
    }
    copy.delete_attribute("d");

    assert_eq!(original.to_json(), r#"{"a":{"b":[{"c":1},{"c":2}]},"d":"x"}"#);
    assert_eq!(copy.to_json(), r#"{"a":{"b":[{"c":99},{"c":99}]}}"#);
    assert_ne!(copy, original);
    Ok(())
}

#[test]
fn test_deep_copy_of_attached_node_is_detached() {
    let root = Object::new();
    let element = Object::new().set_value("k", "v");
    root.add_element(&element, "e");

    let copy = element.deep_copy();
    assert!(copy.parent().is_none());
    assert!(copy.structurally_eq(&element));
    assert!(root.contains("e"));
}

#[test]
fn test_structural_equality() -> Result<(), Box<dyn std::error::Error>> {
    let left = Object::from_json(br#"{"a":1,"b":[1,2]}"#)?;
    let right = Object::from_json(br#"{"a":1,"b":[1,2]}"#)?;
    let reordered = Object::from_json(br#"{"b":[1,2],"a":1}"#)?;
    let different = Object::from_json(br#"{"a":1,"b":[1,3]}"#)?;

    assert_eq!(left, right);
    assert_ne!(left, reordered);
    assert_ne!(left, different);
    Ok(())
}

#[test]
fn test_array_bulk_operations() -> Result<(), Box<dyn std::error::Error>> {
    let items = Array::from_json(br#"[{"id":1},{"id":2}]"#)?;

    items
        .set_value("tag", "x")
        .set_inner_value(0)
        .add_element(&Object::new().set_value("k", 1), "extra");
    assert_eq!(
        items.to_json(),
        r#"[{"innerValue":0,"id":1,"tag":"x","extra":{"k":1}},{"innerValue":0,"id":2,"tag":"x","extra":{"k":1}}]"#
    );

    let extras: Vec<Object> = items
        .elements()
        .iter()
        .filter_map(|m| m.attribute("extra"))
        .filter_map(|v| v.as_object().cloned())
        .collect();
    assert!(matches!(extras.as_slice(), [a, b] if !a.ptr_eq(b)));

    items
        .delete_attribute("tag")
        .clear_inner_value()
        .remove_element_named("extra");
    assert_eq!(items.to_json(), r#"[{"id":1},{"id":2}]"#);
    Ok(())
}

#[test]
fn test_array_push_and_remove() {
    let items = Array::new();
    let a = Object::new().set_value("n", 1);
    let b = Object::new().set_value("n", 2);
    items.push(&a).push(&b);
    assert_eq!(items.len(), 2);

    // pushing an existing member moves it to the end
    items.push(&a);
    assert!(items.get(1).is_some_and(|m| m.ptr_eq(&a)));
    assert_eq!(items.len(), 2);

    items.remove_element(&a);
    assert!(a.parent().is_none());
    assert_eq!(items.len(), 1);

    let owner = Object::new();
    owner.set_value("list", items.clone());
    assert!(items.parent().is_some_and(|p| p.ptr_eq(&owner)));
    assert!(items.remove_from_parent().is_some_and(|p| p.ptr_eq(&owner)));
    assert!(!owner.contains("list"));
}

#[test]
fn test_values_are_shared_handles() {
    let obj = Object::new();
    let nested = Object::new();
    obj.set_value("n", nested.clone());
    nested.set_value("later", 1);
    assert!(matches!(
        obj.attribute("n"),
        Some(Value::Object(o)) if o.contains("later")
    ));
}

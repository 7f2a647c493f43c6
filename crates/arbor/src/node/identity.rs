//! Structural equality and deep copy.
//!
//! Both walk the tree with an explicit work stack, so deeply nested documents
//! cannot exhaust the call stack, and both keep a visited set so that a cycle
//! smuggled into the tree ends the walk instead of looping forever.

use std::cell::RefCell;
use std::collections::HashSet;

use tracing::error;

use super::object::ObjectData;
use super::{Array, Object, Value};

pub(crate) fn objects_equal(left: &Object, right: &Object) -> bool {
    values_equal(
        &Value::Object(left.clone()),
        &Value::Object(right.clone()),
    )
}

pub(crate) fn arrays_equal(left: &Array, right: &Array) -> bool {
    values_equal(&Value::Array(left.clone()), &Value::Array(right.clone()))
}

fn values_equal(left: &Value, right: &Value) -> bool {
    let mut pending = vec![(left.clone(), right.clone())];
    let mut visited: HashSet<*const RefCell<ObjectData>> = HashSet::new();

    while let Some(pair) = pending.pop() {
        match pair {
            (Value::Scalar(l), Value::Scalar(r)) => {
                if l != r {
                    return false;
                }
            }
            (Value::Object(l), Value::Object(r)) => {
                if l.ptr_eq(&r) {
                    continue;
                }
                if !visited.insert(l.as_ptr()) {
                    error!("cycle detected while comparing objects");
                    return false;
                }
                if l.inner_value() != r.inner_value() {
                    return false;
                }
                let l_attrs = l.attributes();
                let r_attrs = r.attributes();
                if l_attrs.len() != r_attrs.len() {
                    return false;
                }
                for ((l_key, l_value), (r_key, r_value)) in l_attrs.into_iter().zip(r_attrs) {
                    if l_key != r_key {
                        return false;
                    }
                    pending.push((l_value, r_value));
                }
            }
            (Value::Array(l), Value::Array(r)) => {
                if l.ptr_eq(&r) {
                    continue;
                }
                let l_members = l.elements();
                let r_members = r.elements();
                if l_members.len() != r_members.len() {
                    return false;
                }
                pending.extend(
                    l_members
                        .into_iter()
                        .zip(r_members)
                        .map(|(a, b)| (Value::Object(a), Value::Object(b))),
                );
            }
            _ => return false,
        }
    }
    true
}

pub(crate) fn deep_copy_object(source: &Object) -> Object {
    let mut copier = DeepCopy::default();
    let copy = copier.object(source);
    copier.run();
    copy
}

pub(crate) fn deep_copy_array(source: &Array) -> Array {
    let mut copier = DeepCopy::default();
    let copy = copier.array(source);
    copier.run();
    copy
}

/// Work list of (source, blank copy) pairs still to be filled in
#[derive(Default)]
struct DeepCopy {
    pending: Vec<(Object, Object)>,
    visited: HashSet<*const RefCell<ObjectData>>,
}

impl DeepCopy {
    /// A detached copy carrying the name and inner value; attributes follow in
    /// [`DeepCopy::run`]
    fn object(&mut self, source: &Object) -> Object {
        let copy = Object::new();
        if let Some(name) = source.element_name() {
            copy.set_element_name(&name);
        }
        copy.set_inner_raw(source.inner_value());
        self.pending.push((source.clone(), copy.clone()));
        copy
    }

    fn array(&mut self, source: &Array) -> Array {
        let copy = Array::with_name(source.name());
        for member in source.elements() {
            let member_copy = self.object(&member);
            copy.push_unchecked(&member_copy);
        }
        copy
    }

    fn run(&mut self) {
        while let Some((source, copy)) = self.pending.pop() {
            if !self.visited.insert(source.as_ptr()) {
                error!("cycle detected during deep copy; skipping repeated subtree");
                continue;
            }
            for (key, value) in source.attributes() {
                let copied = match value {
                    Value::Scalar(s) => Value::Scalar(s),
                    Value::Object(o) => Value::Object(self.object(&o)),
                    Value::Array(a) => Value::Array(self.array(&a)),
                };
                copy.insert_raw(&key, copied);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Parent;

    fn sample() -> Object {
        let root = Object::new().set_value("title", "doc");
        let section = Object::new().set_inner_value("body");
        root.add_element(&section, "section");
        root.add_element(&Object::new().set_value("n", 1), "item");
        root.add_element(&Object::new().set_value("n", 2), "item");
        root
    }

    #[test]
    fn test_equality_checks_order_and_inner_values() {
        let a = Object::new().set_value("x", 1).set_value("y", 2);
        let b = Object::new().set_value("x", 1).set_value("y", 2);
        let reordered = Object::new().set_value("y", 2).set_value("x", 1);
        assert!(a.structurally_eq(&b));
        assert!(!a.structurally_eq(&reordered));

        b.set_inner_value("text");
        assert!(!a.structurally_eq(&b));
    }

    #[test]
    fn test_deep_copy_is_equal_and_independent() {
        let source = sample();
        let copy = source.deep_copy();
        assert!(copy.structurally_eq(&source));
        assert!(!copy.ptr_eq(&source));

        copy.delete_attribute("title");
        assert!(source.contains("title"));
        assert!(!copy.structurally_eq(&source));
    }

    #[test]
    fn test_deep_copy_reparents_within_copy() {
        let copy = sample().deep_copy();
        assert!(copy.parent().is_none());

        for (_, value) in copy.attributes() {
            match value {
                Value::Object(child) => {
                    assert!(matches!(child.parent(), Some(Parent::Object(p)) if p.ptr_eq(&copy)));
                }
                Value::Array(items) => {
                    assert!(items.parent().is_some_and(|p| p.ptr_eq(&copy)));
                    for member in items.elements() {
                        assert!(matches!(member.parent(), Some(Parent::Array(a)) if a.ptr_eq(&items)));
                    }
                }
                Value::Scalar(_) => {}
            }
        }
    }

    #[test]
    fn test_deep_copy_of_attached_subtree_is_detached() {
        let root = sample();
        let section = root
            .attribute("section")
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default();
        let copy = section.deep_copy();
        assert!(copy.parent().is_none());
        assert_eq!(copy.element_name().as_deref(), Some("section"));
        assert_eq!(copy.inner_value(), section.inner_value());
    }
}

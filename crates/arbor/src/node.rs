//! Ordered, parent-linked document tree.
//!
//! A document is made of [`Object`] nodes (an ordered attribute map, an
//! optional inner value and an element name), [`Array`] nodes (an ordered run
//! of Objects sharing one slot name) and [`Scalar`] leaves. Objects and Arrays
//! are reference-counted handles: cloning a handle yields the same node, while
//! [`Object::deep_copy`] builds an independent graph.
//!
//! Parent links are weak. Only attribute slots, array slots and caller-held
//! handles keep a node alive.

mod array;
mod identity;
mod object;
mod scalar;

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

pub use array::Array;
pub use object::Object;
pub use scalar::Scalar;
pub(crate) use scalar::parse_number;

use array::ArrayData;
use object::ObjectData;

/// The content of an attribute slot
#[derive(Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Object(Object),
    Array(Array),
}

impl Value {
    /// Returns the scalar if this is a scalar value
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object handle if this is an object value
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the array handle if this is an array value
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Independent copy: scalars are cloned, objects and arrays deep-copied
    pub fn deep_copy(&self) -> Self {
        match self {
            Self::Scalar(s) => Self::Scalar(s.clone()),
            Self::Object(o) => Self::Object(o.deep_copy()),
            Self::Array(a) => Self::Array(a.deep_copy()),
        }
    }

    /// Identity comparison for the handle variants, value comparison for scalars
    pub(crate) fn same_node(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Clear the parent link of an object or array that left its slot
    pub(crate) fn orphan(&self) {
        match self {
            Self::Scalar(_) => {}
            Self::Object(o) => o.clear_parent(),
            Self::Array(a) => a.clear_parent(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s:?}"),
            Self::Object(o) => write!(f, "{o:?}"),
            Self::Array(a) => write!(f, "{a:?}"),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

macro_rules! scalar_into_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

scalar_into_value!(bool, f64, i32, u32, String, &str);

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

/// A document root: JSON may produce either kind, XML always an Object
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Object(Object),
    Array(Array),
}

impl Node {
    /// Returns the object root, if this is one
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            Self::Array(_) => None,
        }
    }

    /// Returns the array root, if this is one
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            Self::Object(_) => None,
        }
    }

    pub fn into_object(self) -> Option<Object> {
        match self {
            Self::Object(o) => Some(o),
            Self::Array(_) => None,
        }
    }

    pub fn into_array(self) -> Option<Array> {
        match self {
            Self::Array(a) => Some(a),
            Self::Object(_) => None,
        }
    }

    pub fn deep_copy(&self) -> Self {
        match self {
            Self::Object(o) => Self::Object(o.deep_copy()),
            Self::Array(a) => Self::Array(a.deep_copy()),
        }
    }

    /// Evaluate an XPath-style query against this root
    pub fn filter_xpath(&self, expression: &str) -> Vec<Object> {
        match self {
            Self::Object(o) => o.filter_xpath(expression),
            Self::Array(a) => a.filter_xpath(expression),
        }
    }

    pub fn to_json(&self) -> String {
        match self {
            Self::Object(o) => o.to_json(),
            Self::Array(a) => a.to_json(),
        }
    }

    pub fn to_json_with_inner_value_key(&self, key: &str) -> String {
        match self {
            Self::Object(o) => o.to_json_with_inner_value_key(key),
            Self::Array(a) => a.to_json_with_inner_value_key(key),
        }
    }

    pub fn to_json_pretty(&self) -> String {
        match self {
            Self::Object(o) => o.to_json_pretty(),
            Self::Array(a) => a.to_json_pretty(),
        }
    }

    pub fn to_xml(&self) -> String {
        match self {
            Self::Object(o) => o.to_xml(),
            Self::Array(a) => a.to_xml(),
        }
    }
}

impl From<Object> for Node {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Array> for Node {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

/// The node that currently holds an Object or Array
#[derive(Clone, Debug)]
pub enum Parent {
    Object(Object),
    Array(Array),
}

impl Parent {
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            Self::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            Self::Object(_) => None,
        }
    }
}

/// Non-owning back-reference stored inside an Object
#[derive(Clone, Debug)]
pub(crate) enum ParentLink {
    Object(Weak<RefCell<ObjectData>>),
    Array(Weak<RefCell<ArrayData>>),
}

impl ParentLink {
    pub(crate) fn upgrade(&self) -> Option<Parent> {
        match self {
            Self::Object(weak) => weak.upgrade().map(|rc| Parent::Object(Object::from_rc(rc))),
            Self::Array(weak) => weak.upgrade().map(|rc| Parent::Array(Array::from_rc(rc))),
        }
    }
}

/// True when storing `value` somewhere below `start` would close a cycle,
/// i.e. `value` is `start` itself or one of its ancestors.
pub(crate) fn would_cycle(value: &Value, start: Parent) -> bool {
    let mut current = Some(start);
    while let Some(parent) = current {
        let hit = match (&parent, value) {
            (Parent::Object(p), Value::Object(v)) => p.ptr_eq(v),
            (Parent::Array(p), Value::Array(v)) => p.ptr_eq(v),
            _ => false,
        };
        if hit {
            return true;
        }
        current = match parent {
            Parent::Object(o) => o.parent(),
            Parent::Array(a) => a.parent().map(Parent::Object),
        };
    }
    false
}

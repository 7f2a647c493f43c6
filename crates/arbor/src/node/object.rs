//! Object nodes: JSON objects and XML elements

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::{trace, warn};

use super::identity;
use super::{would_cycle, Array, Parent, ParentLink, Scalar, Value};
use crate::error::{Error, Result};
use crate::json::{self, Config as JsonConfig};
use crate::xml;
use crate::xpath;

pub(crate) struct ObjectData {
    attributes: IndexMap<String, Value>,
    inner_value: Option<Scalar>,
    element_name: Option<String>,
    parent: Option<ParentLink>,
}

/// Handle to an object node.
///
/// Cloning the handle does not copy the node; use [`Object::deep_copy`] for
/// that. Equality (`==`) is structural, [`Object::ptr_eq`] is identity.
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

/// What an attribute slot holds, from the point of view of `add_element`
enum Slot {
    Absent,
    Scalar,
    Single(Object),
    Many(Array),
}

/// Where a child element sits inside its owner
enum Holder {
    Slot(String),
    Array(Array),
}

impl Slot {
    fn of(value: Option<Value>) -> Self {
        match value {
            None => Self::Absent,
            Some(Value::Scalar(_)) => Self::Scalar,
            Some(Value::Object(o)) => Self::Single(o),
            Some(Value::Array(a)) => Self::Many(a),
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Object {
    /// Creates a new empty, unnamed, detached object
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            attributes: IndexMap::new(),
            inner_value: None,
            element_name: None,
            parent: None,
        })))
    }

    /// Creates a detached object carrying an element name
    pub fn named(name: &str) -> Self {
        let object = Self::new();
        object.0.borrow_mut().element_name = Some(name.to_owned());
        object
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<ObjectData>>) -> Self {
        Self(rc)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<ObjectData>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn as_ptr(&self) -> *const RefCell<ObjectData> {
        Rc::as_ptr(&self.0)
    }

    /// Returns true if both handles refer to the same node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Parse a JSON document whose root must be an object
    pub fn from_json(input: &[u8]) -> Result<Self> {
        Self::from_json_with_config(input, JsonConfig::default())
    }

    /// Parse a JSON object with a custom inner-value key or limits
    pub fn from_json_with_config(input: &[u8], config: JsonConfig) -> Result<Self> {
        match json::parse(input, &config)? {
            super::Node::Object(o) => Ok(o),
            super::Node::Array(_) => Err(Error::shape("object", "array")),
        }
    }

    /// Parse an XML document into an unnamed container holding its
    /// top-level elements
    pub fn from_xml(input: &[u8]) -> Result<Self> {
        xml::parse(input, &xml::Config::default())
    }

    // ---- reading ----

    /// Number of attribute slots
    pub fn len(&self) -> usize {
        self.0.borrow().attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().attributes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().attributes.contains_key(name)
    }

    /// Attribute names in stored order
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().attributes.keys().cloned().collect()
    }

    /// The value stored under `name`
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.0.borrow().attributes.get(name).cloned()
    }

    /// The scalar stored under `name`, or the inner value of the object stored
    /// there
    pub fn scalar(&self, name: &str) -> Option<Scalar> {
        match self.attribute(name)? {
            Value::Scalar(s) => Some(s),
            Value::Object(o) => o.inner_value(),
            Value::Array(_) => None,
        }
    }

    /// All attribute slots in stored order
    pub fn attributes(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn inner_value(&self) -> Option<Scalar> {
        self.0.borrow().inner_value.clone()
    }

    /// The key or tag this object is stored under
    pub fn element_name(&self) -> Option<String> {
        self.0.borrow().element_name.clone()
    }

    /// The object or array currently holding this object
    pub fn parent(&self) -> Option<Parent> {
        let link = self.0.borrow().parent.clone();
        link.and_then(|link| link.upgrade())
    }

    /// Renames a detached object. An attached object takes its name from the
    /// slot it lives in, so renaming one is refused.
    pub fn set_element_name(&self, name: &str) -> Self {
        if self.parent().is_some() {
            warn!(name, "refusing to rename an attached element");
        } else {
            self.0.borrow_mut().element_name = Some(name.to_owned());
        }
        self.clone()
    }

    /// Structural equality: same keys in the same order, equal values, equal
    /// inner values
    pub fn structurally_eq(&self, other: &Self) -> bool {
        identity::objects_equal(self, other)
    }

    /// Copies the whole subtree into a new, detached graph
    pub fn deep_copy(&self) -> Self {
        identity::deep_copy_object(self)
    }

    // ---- mutation ----

    /// Overwrites the slot in place or appends a new one
    pub fn set_value(&self, attribute: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if let Some(existing) = self.attribute(attribute) {
            if existing.same_node(&value) {
                return self.clone();
            }
        }

        match &value {
            Value::Scalar(_) => {}
            Value::Object(o) => {
                if would_cycle(&value, Parent::Object(self.clone())) {
                    warn!(attribute, "refusing to store an object beneath itself");
                    return self.clone();
                }
                o.remove_from_parent();
            }
            Value::Array(a) => {
                if would_cycle(&value, Parent::Object(self.clone())) {
                    warn!(attribute, "refusing to store an array beneath itself");
                    return self.clone();
                }
                a.remove_from_parent();
            }
        }

        self.insert_raw(attribute, value);
        self.clone()
    }

    /// Removes the named slot; no-op if absent
    pub fn delete_attribute(&self, attribute: &str) -> Self {
        let removed = self.0.borrow_mut().attributes.shift_remove(attribute);
        if let Some(value) = removed {
            value.orphan();
        }
        self.clone()
    }

    pub fn set_inner_value(&self, value: impl Into<Scalar>) -> Self {
        self.0.borrow_mut().inner_value = Some(value.into());
        self.clone()
    }

    pub fn clear_inner_value(&self) -> Self {
        self.0.borrow_mut().inner_value = None;
        self.clone()
    }

    /// Adds `element` as a child named `name`.
    ///
    /// A second child under the same name turns the slot into an [`Array`]
    /// holding both, later ones are appended to it. The element is detached
    /// from wherever it was before.
    pub fn add_element(&self, element: &Self, name: &str) -> Self {
        let candidate = Value::Object(element.clone());
        if would_cycle(&candidate, Parent::Object(self.clone())) {
            warn!(name, "refusing to add an element beneath itself");
            return self.clone();
        }
        element.remove_from_parent();

        match Slot::of(self.attribute(name)) {
            Slot::Absent | Slot::Scalar => self.insert_raw(name, candidate),
            Slot::Single(existing) => {
                trace!(name, "promoting slot to array");
                let array = Array::new();
                self.insert_raw(name, Value::Array(array.clone()));
                array.push(&existing);
                array.push(element);
            }
            Slot::Many(array) => {
                array.push(element);
            }
        }
        self.clone()
    }

    /// Removes the child element (or array of elements) stored under `name`.
    /// Scalar attributes are left alone; use [`Object::delete_attribute`].
    pub fn remove_element_named(&self, name: &str) -> Self {
        let removed = {
            let mut data = self.0.borrow_mut();
            match data.attributes.get(name) {
                Some(Value::Object(_) | Value::Array(_)) => data.attributes.shift_remove(name),
                _ => None,
            }
        };
        if let Some(value) = removed {
            value.orphan();
        }
        self.clone()
    }

    /// Removes a specific child element, wherever it is stored in this object
    pub fn remove_element(&self, element: &Self) -> Self {
        let holder = self
            .attributes()
            .into_iter()
            .find_map(|(key, value)| match value {
                Value::Object(o) if o.ptr_eq(element) => Some(Holder::Slot(key)),
                Value::Array(a) if a.position_of(element).is_some() => Some(Holder::Array(a)),
                _ => None,
            });

        match holder {
            Some(Holder::Slot(key)) => {
                self.delete_attribute(&key);
            }
            Some(Holder::Array(array)) => {
                array.remove_element(element);
            }
            None => {}
        }
        self.clone()
    }

    /// Detaches this object from its parent. Returns the former parent.
    pub fn remove_from_parent(&self) -> Option<Parent> {
        let parent = self.parent()?;
        match &parent {
            Parent::Object(o) => {
                o.remove_element(self);
            }
            Parent::Array(a) => {
                a.remove_element(self);
            }
        }
        Some(parent)
    }

    // ---- queries ----

    /// Evaluate an XPath-style query with this object as context.
    ///
    /// A malformed expression matches nothing.
    pub fn filter_xpath(&self, expression: &str) -> Vec<Self> {
        xpath::filter(std::slice::from_ref(self), expression)
    }

    /// Direct children with exactly this name
    pub fn children_named(&self, name: &str) -> Vec<Self> {
        xpath::children_named(std::slice::from_ref(self), name)
    }

    /// All descendants with exactly this name, in document order
    pub fn descendants_named(&self, name: &str) -> Vec<Self> {
        xpath::descendants_named(std::slice::from_ref(self), name)
    }

    // ---- output ----

    pub fn to_json(&self) -> String {
        json::to_string(&Value::Object(self.clone()), json::DEFAULT_INNER_VALUE_KEY)
    }

    pub fn to_json_with_inner_value_key(&self, key: &str) -> String {
        json::to_string(&Value::Object(self.clone()), key)
    }

    pub fn to_json_pretty(&self) -> String {
        json::to_string_pretty(&Value::Object(self.clone()), json::DEFAULT_INNER_VALUE_KEY)
    }

    pub fn to_xml(&self) -> String {
        xml::object_to_string(self)
    }

    // ---- crate internals ----

    /// Stores `value` under `key`, wiring up parent links and names. Duplicate
    /// keys keep their first position.
    pub(crate) fn insert_raw(&self, key: &str, value: Value) {
        self.adopt(key, &value);
        let kept = value.clone();
        let previous = self.0.borrow_mut().attributes.insert(key.to_owned(), value);
        if let Some(previous) = previous {
            if !previous.same_node(&kept) {
                previous.orphan();
            }
        }
    }

    fn adopt(&self, key: &str, value: &Value) {
        match value {
            Value::Scalar(_) => {}
            Value::Object(o) => o.attach(ParentLink::Object(self.downgrade()), Some(key)),
            Value::Array(a) => a.attach(self, key),
        }
    }

    pub(crate) fn attach(&self, link: ParentLink, name: Option<&str>) {
        let mut data = self.0.borrow_mut();
        data.parent = Some(link);
        data.element_name = name.map(str::to_owned);
    }

    pub(crate) fn clear_parent(&self) {
        self.0.borrow_mut().parent = None;
    }

    pub(crate) fn set_inner_raw(&self, value: Option<Scalar>) {
        self.0.borrow_mut().inner_value = value;
    }

    /// Removes the slot that stores `array`, used when an array runs empty
    pub(crate) fn remove_array_slot(&self, array: &Array) {
        let key = self
            .0
            .borrow()
            .attributes
            .iter()
            .find(|(_, v)| matches!(v, Value::Array(a) if a.ptr_eq(array)))
            .map(|(k, _)| k.clone());
        if let Some(key) = key {
            self.delete_attribute(&key);
        }
    }

    /// Removes and returns the attribute stored under `key` without touching
    /// parent links. Used by the JSON parser to lift the inner value.
    pub(crate) fn take_attribute(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().attributes.shift_remove(key)
    }

    /// Index of the slot stored under `key`
    pub(crate) fn slot_index(&self, key: &str) -> Option<usize> {
        self.0.borrow().attributes.get_index_of(key)
    }

    /// 1-based index among same-named siblings, `None` for a root
    pub(crate) fn sibling_position(&self) -> Option<usize> {
        match self.parent()? {
            Parent::Object(_) => Some(1),
            Parent::Array(a) => a.position_of(self).map(|i| i + 1),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_eq(other)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(data) = self.0.try_borrow() else {
            return f.write_str("Object(<borrowed>)");
        };
        let mut out = f.debug_struct("Object");
        if let Some(name) = &data.element_name {
            out.field("name", name);
        }
        if let Some(inner) = &data.inner_value {
            out.field("inner_value", inner);
        }
        out.field("attributes", &data.attributes).finish()
    }
}

//! Array nodes: runs of same-named objects

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use super::identity;
use super::object::ObjectData;
use super::{would_cycle, Object, Parent, ParentLink, Scalar, Value};
use crate::error::{Error, Result};
use crate::json::{self, Config as JsonConfig};
use crate::xml;
use crate::xpath;

pub(crate) struct ArrayData {
    elements: Vec<Object>,
    name: Option<String>,
    parent: Option<Weak<RefCell<ObjectData>>>,
}

/// Handle to an array node. Members are always [`Object`]s.
///
/// Besides the container operations, an array mirrors the object mutation
/// surface: `set_value`, `add_element` and friends apply to every member.
#[derive(Clone)]
pub struct Array(Rc<RefCell<ArrayData>>);

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl Array {
    /// Creates a new empty, detached array
    pub fn new() -> Self {
        Self::with_name(None)
    }

    pub(crate) fn with_name(name: Option<String>) -> Self {
        Self(Rc::new(RefCell::new(ArrayData {
            elements: Vec::new(),
            name,
            parent: None,
        })))
    }

    pub(crate) fn from_rc(rc: Rc<RefCell<ArrayData>>) -> Self {
        Self(rc)
    }

    pub(crate) fn as_ptr(&self) -> *const RefCell<ArrayData> {
        Rc::as_ptr(&self.0)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<ArrayData>> {
        Rc::downgrade(&self.0)
    }

    /// Returns true if both handles refer to the same node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Parse a JSON document whose root must be an array
    pub fn from_json(input: &[u8]) -> Result<Self> {
        Self::from_json_with_config(input, JsonConfig::default())
    }

    /// Parse a JSON array with a custom inner-value key or limits
    pub fn from_json_with_config(input: &[u8], config: JsonConfig) -> Result<Self> {
        match json::parse(input, &config)? {
            super::Node::Array(a) => Ok(a),
            super::Node::Object(_) => Err(Error::shape("array", "object")),
        }
    }

    // ---- reading ----

    pub fn len(&self) -> usize {
        self.0.borrow().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Object> {
        self.0.borrow().elements.get(index).cloned()
    }

    /// Member handles in order
    pub fn elements(&self) -> Vec<Object> {
        self.0.borrow().elements.clone()
    }

    /// The slot name shared by the members, if the array is stored under a key
    pub fn name(&self) -> Option<String> {
        self.0.borrow().name.clone()
    }

    /// The object whose slot holds this array
    pub fn parent(&self) -> Option<Object> {
        let link = self.0.borrow().parent.clone();
        link.and_then(|weak| weak.upgrade()).map(Object::from_rc)
    }

    pub fn structurally_eq(&self, other: &Self) -> bool {
        identity::arrays_equal(self, other)
    }

    /// Copies the array and every member into a new, detached graph
    pub fn deep_copy(&self) -> Self {
        identity::deep_copy_array(self)
    }

    // ---- container mutation ----

    /// Appends `element`, detaching it from wherever it was before
    pub fn push(&self, element: &Object) -> Self {
        let candidate = Value::Object(element.clone());
        if would_cycle(&candidate, Parent::Array(self.clone())) {
            warn!("refusing to push an element beneath itself");
            return self.clone();
        }

        if let Some(index) = self.position_of(element) {
            self.0.borrow_mut().elements.remove(index);
        } else {
            element.remove_from_parent();
        }
        self.push_unchecked(element);
        self.clone()
    }

    /// Removes a member. An array left empty also leaves its parent's slot.
    pub fn remove_element(&self, element: &Object) -> Self {
        let Some(index) = self.position_of(element) else {
            return self.clone();
        };
        self.0.borrow_mut().elements.remove(index);
        element.clear_parent();

        if self.is_empty() {
            if let Some(owner) = self.parent() {
                trace!("removing emptied array from its parent");
                owner.remove_array_slot(self);
            }
        }
        self.clone()
    }

    /// Detaches this array from the object holding it. Returns that object.
    pub fn remove_from_parent(&self) -> Option<Object> {
        let owner = self.parent()?;
        owner.remove_array_slot(self);
        Some(owner)
    }

    // ---- per-member mutation ----

    /// Sets `attribute` on every member. Object and array values are deep
    /// copied so each member owns its own subtree.
    pub fn set_value(&self, attribute: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        for member in self.elements() {
            member.set_value(attribute, value.deep_copy());
        }
        self.clone()
    }

    pub fn delete_attribute(&self, attribute: &str) -> Self {
        for member in self.elements() {
            member.delete_attribute(attribute);
        }
        self.clone()
    }

    pub fn set_inner_value(&self, value: impl Into<Scalar>) -> Self {
        let value = value.into();
        for member in self.elements() {
            member.set_inner_value(value.clone());
        }
        self.clone()
    }

    pub fn clear_inner_value(&self) -> Self {
        for member in self.elements() {
            member.clear_inner_value();
        }
        self.clone()
    }

    /// Adds a deep copy of `element` under `name` to every member
    pub fn add_element(&self, element: &Object, name: &str) -> Self {
        for member in self.elements() {
            member.add_element(&element.deep_copy(), name);
        }
        self.clone()
    }

    /// Removes the element named `name` from every member
    pub fn remove_element_named(&self, name: &str) -> Self {
        for member in self.elements() {
            member.remove_element_named(name);
        }
        self.clone()
    }

    // ---- queries ----

    /// Evaluate an XPath-style query with the members as context
    pub fn filter_xpath(&self, expression: &str) -> Vec<Object> {
        xpath::filter(&self.elements(), expression)
    }

    /// Children of the members with exactly this name
    pub fn children_named(&self, name: &str) -> Vec<Object> {
        xpath::children_named(&self.elements(), name)
    }

    /// Descendants of the members with exactly this name
    pub fn descendants_named(&self, name: &str) -> Vec<Object> {
        xpath::descendants_named(&self.elements(), name)
    }

    // ---- output ----

    pub fn to_json(&self) -> String {
        json::to_string(&Value::Array(self.clone()), json::DEFAULT_INNER_VALUE_KEY)
    }

    pub fn to_json_with_inner_value_key(&self, key: &str) -> String {
        json::to_string(&Value::Array(self.clone()), key)
    }

    pub fn to_json_pretty(&self) -> String {
        json::to_string_pretty(&Value::Array(self.clone()), json::DEFAULT_INNER_VALUE_KEY)
    }

    pub fn to_xml(&self) -> String {
        xml::array_to_string(self)
    }

    // ---- crate internals ----

    pub(crate) fn position_of(&self, element: &Object) -> Option<usize> {
        self.0
            .borrow()
            .elements
            .iter()
            .position(|m| m.ptr_eq(element))
    }

    /// Appends without cycle checks or detaching; `element` must be free
    pub(crate) fn push_unchecked(&self, element: &Object) {
        let name = self.name();
        element.attach(ParentLink::Array(self.downgrade()), name.as_deref());
        self.0.borrow_mut().elements.push(element.clone());
    }

    pub(crate) fn attach(&self, owner: &Object, name: &str) {
        {
            let mut data = self.0.borrow_mut();
            data.parent = Some(owner.downgrade());
            data.name = Some(name.to_owned());
        }
        for member in self.elements() {
            member.attach(ParentLink::Array(self.downgrade()), Some(name));
        }
    }

    pub(crate) fn clear_parent(&self) {
        self.0.borrow_mut().parent = None;
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_eq(other)
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(data) = self.0.try_borrow() else {
            return f.write_str("Array(<borrowed>)");
        };
        let mut out = f.debug_struct("Array");
        if let Some(name) = &data.name {
            out.field("name", name);
        }
        out.field("elements", &data.elements).finish()
    }
}

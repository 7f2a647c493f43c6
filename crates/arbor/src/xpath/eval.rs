//! Tree-walking evaluation of compiled paths

use std::collections::HashSet;

use crate::node::{Object, Parent, Scalar, Value};
use crate::xpath::ast::{Axis, NameTest, Predicate, Segment, Step};

/// Something a name step can land on
enum Hit {
    Element(Object),
    /// A scalar attribute, matched like a text-only child element
    Leaf { owner: Object, value: Scalar },
}

/// Identity of a hit for de-duplication: the node itself, or the owner plus
/// the attribute name for a leaf
type HitKey = (*const (), Option<String>);

fn identity(node: &Object) -> *const () {
    node.as_ptr().cast()
}

impl Hit {
    fn key(&self, name: &str) -> HitKey {
        match self {
            Self::Element(o) => (identity(o), None),
            Self::Leaf { owner, .. } => (identity(owner), Some(name.to_string())),
        }
    }

    /// Where the hit sits in its document
    fn location(&self, name: &str) -> Location {
        match self {
            Self::Element(o) => Location::of(o),
            Self::Leaf { owner, .. } => {
                let mut location = Location::of(owner);
                location.path.push(owner.slot_index(name).unwrap_or(0));
                location
            }
        }
    }

    /// Leaves become detached snapshots named after their attribute
    fn into_object(self, name: &str) -> Object {
        match self {
            Self::Element(o) => o,
            Self::Leaf { value, .. } => Object::named(name).set_inner_value(value),
        }
    }
}

/// A node's root plus the slot/member indices leading down to it. Sorting by
/// path within one root gives document order.
struct Location {
    root: *const (),
    path: Vec<usize>,
}

impl Location {
    fn of(node: &Object) -> Self {
        let mut path = Vec::new();
        let mut current = node.clone();
        let root = loop {
            match current.parent() {
                None => break identity(&current),
                Some(Parent::Object(owner)) => {
                    let key = current.element_name().unwrap_or_default();
                    path.push(owner.slot_index(&key).unwrap_or(0));
                    current = owner;
                }
                Some(Parent::Array(array)) => {
                    path.push(array.position_of(&current).unwrap_or(0));
                    let Some(owner) = array.parent() else {
                        break array.as_ptr().cast::<()>();
                    };
                    let key = array.name().unwrap_or_default();
                    path.push(owner.slot_index(&key).unwrap_or(0));
                    current = owner;
                }
            }
        };
        path.reverse();
        Self { root, path }
    }
}

/// Stable sort into document order; separate trees keep the order in which
/// they first appear
fn into_document_order(located: Vec<(Location, Object)>) -> Vec<Object> {
    let mut roots: Vec<*const ()> = Vec::new();
    let mut keyed: Vec<((usize, Vec<usize>), Object)> = located
        .into_iter()
        .map(|(location, node)| {
            let rank = match roots.iter().position(|r| *r == location.root) {
                Some(rank) => rank,
                None => {
                    roots.push(location.root);
                    roots.len() - 1
                }
            };
            ((rank, location.path), node)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, node)| node).collect()
}

pub(crate) fn evaluate(segments: &[Segment], context: &[Object]) -> Vec<Object> {
    let mut current = context.to_vec();
    for segment in segments {
        current = match segment {
            Segment::Step(step) => apply_step(step, &current),
            Segment::Group { path, predicate } => {
                let grouped = evaluate(path, &current);
                match predicate {
                    Some(predicate) => filter_by_set_position(grouped, predicate),
                    None => grouped,
                }
            }
        };
        if current.is_empty() {
            break;
        }
    }
    current
}

fn apply_step(step: &Step, context: &[Object]) -> Vec<Object> {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    // a single context node already yields document order
    let reorder = context.len() > 1;

    for node in context {
        let candidates = match step.axis {
            Axis::Child => children(node),
            Axis::Descendant => descendants(node),
        };
        for (name, hit) in candidates {
            if !step.test.matches(&name) || !seen.insert(hit.key(&name)) {
                continue;
            }
            let location = reorder.then(|| hit.location(&name));
            let candidate = hit.into_object(&name);
            let keep = step.predicate.as_ref().is_none_or(|predicate| {
                let position = candidate.sibling_position().unwrap_or(1);
                predicate.matches(&candidate, position)
            });
            if keep {
                matched.push((location, candidate));
            }
        }
    }

    if !reorder {
        return matched.into_iter().map(|(_, node)| node).collect();
    }
    into_document_order(
        matched
            .into_iter()
            .filter_map(|(location, node)| location.map(|l| (l, node)))
            .collect(),
    )
}

fn filter_by_set_position(nodes: Vec<Object>, predicate: &Predicate) -> Vec<Object> {
    nodes
        .into_iter()
        .enumerate()
        .filter(|(i, node)| predicate.matches(node, i + 1))
        .map(|(_, node)| node)
        .collect()
}

/// Attribute slots of `node` in stored order; array slots contribute each
/// member
fn children(node: &Object) -> Vec<(String, Hit)> {
    let mut hits = Vec::new();
    for (key, value) in node.attributes() {
        match value {
            Value::Scalar(value) => hits.push((
                key,
                Hit::Leaf {
                    owner: node.clone(),
                    value,
                },
            )),
            Value::Object(o) => hits.push((key, Hit::Element(o))),
            Value::Array(a) => {
                hits.extend(a.elements().into_iter().map(|m| (key.clone(), Hit::Element(m))));
            }
        }
    }
    hits
}

/// Everything below `node` in document order
fn descendants(node: &Object) -> Vec<(String, Hit)> {
    let mut found = Vec::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<(String, Hit)> = children(node).into_iter().rev().collect();

    while let Some((name, hit)) = stack.pop() {
        if let Hit::Element(element) = &hit {
            if !visited.insert(identity(element)) {
                continue;
            }
            stack.extend(children(element).into_iter().rev());
        }
        found.push((name, hit));
    }
    found
}

/// Direct children with exactly `name`, across every context node
pub(crate) fn children_named(context: &[Object], name: &str) -> Vec<Object> {
    named(context, Axis::Child, name)
}

/// Descendants with exactly `name`, across every context node
pub(crate) fn descendants_named(context: &[Object], name: &str) -> Vec<Object> {
    named(context, Axis::Descendant, name)
}

fn named(context: &[Object], axis: Axis, name: &str) -> Vec<Object> {
    let step = Step {
        axis,
        test: NameTest::Exact(name.to_string()),
        predicate: None,
    };
    apply_step(&step, context)
}

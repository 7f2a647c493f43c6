//! Compiled form of an XPath expression

use std::cmp::Ordering;

use crate::node::{parse_number, Object, Value};
use crate::wildcard;

/// A path: steps applied left to right, possibly starting with a grouping
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Segment {
    Step(Step),
    /// `( path )[predicate]`; the predicate sees positions in the grouped set
    Group {
        path: Vec<Segment>,
        predicate: Option<Predicate>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Descendant,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Step {
    pub(crate) axis: Axis,
    pub(crate) test: NameTest,
    pub(crate) predicate: Option<Predicate>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NameTest {
    Exact(String),
    Pattern(String),
}

impl NameTest {
    pub(crate) fn new(name: &str) -> Self {
        if wildcard::is_pattern(name) {
            Self::Pattern(name.to_string())
        } else {
            Self::Exact(name.to_string())
        }
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == name,
            Self::Pattern(pattern) => wildcard::matches(pattern, name),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Predicate {
    /// `[3]`
    Position(usize),
    /// `[@id]`, `[title]`
    Exists(Operand),
    /// `[@age > 30]`, `[position() <= 2]`
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
}

impl Predicate {
    /// Test `node`, which sits at 1-based `position` in its candidate set
    pub(crate) fn matches(&self, node: &Object, position: usize) -> bool {
        match self {
            Self::Position(n) => position == *n,
            Self::Exists(operand) => operand.exists(node),
            Self::Compare { left, op, right } => {
                let left = left.values(node, position);
                let right = right.values(node, position);
                left.iter().any(|l| right.iter().any(|r| op.compare(l, r)))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Operand {
    Attribute(String),
    Child(String),
    Position,
    Literal(String),
}

impl Operand {
    fn exists(&self, node: &Object) -> bool {
        match self {
            Self::Attribute(name) | Self::Child(name) => node.contains(name),
            Self::Position | Self::Literal(_) => true,
        }
    }

    /// The text values this operand stands for on `node`. Several values come
    /// back for an array slot; comparison holds if any of them satisfies it.
    fn values(&self, node: &Object, position: usize) -> Vec<String> {
        match self {
            Self::Attribute(name) | Self::Child(name) => match node.attribute(name) {
                Some(Value::Scalar(s)) if !s.is_null() => vec![s.as_text()],
                Some(Value::Scalar(_)) | None => Vec::new(),
                Some(Value::Object(o)) => o.inner_value().map(|s| s.as_text()).into_iter().collect(),
                Some(Value::Array(a)) => a
                    .elements()
                    .iter()
                    .filter_map(Object::inner_value)
                    .map(|s| s.as_text())
                    .collect(),
            },
            Self::Position => vec![position.to_string()],
            Self::Literal(text) => vec![text.clone()],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Numeric comparison when both sides read as numbers, lexical otherwise
    pub(crate) fn compare(self, left: &str, right: &str) -> bool {
        let ordering = match (parse_number(left), parse_number(right)) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => Some(left.cmp(right)),
        };
        match (self, ordering) {
            (Self::Ne, Some(o)) => o != Ordering::Equal,
            (Self::Ne, None) => true,
            (Self::Eq, Some(Ordering::Equal))
            | (Self::Lt, Some(Ordering::Less))
            | (Self::Le, Some(Ordering::Less | Ordering::Equal))
            | (Self::Gt, Some(Ordering::Greater))
            | (Self::Ge, Some(Ordering::Greater | Ordering::Equal)) => true,
            _ => false,
        }
    }
}

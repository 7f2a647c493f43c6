//! XPath-style queries over the node tree.
//!
//! Supported: child (`/`) and descendant (`//`) steps, name tests with `*`
//! and `?` wildcards, one predicate per step (`[@attr]`, `[child]`,
//! `[@attr op value]`, `[position() op n]`, `[n]`), and a leading grouping
//! `( path )[predicate]` whose predicate sees positions within the grouped
//! set. Anything else is a malformed query.
//!
//! Results are in document order without duplicates. A step's position is
//! the node's 1-based index among same-named siblings.

mod ast;
mod eval;
mod parser;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::node::Object;

pub(crate) use eval::{children_named, descendants_named};

/// A compiled query that can be evaluated repeatedly
#[derive(Clone, Debug, PartialEq)]
pub struct XPath {
    source: String,
    segments: Vec<ast::Segment>,
}

impl XPath {
    /// Compile `expression`, reporting why it is malformed if it is
    pub fn parse(expression: &str) -> Result<Self> {
        let segments = parser::Parser::new(expression.as_bytes()).parse()?;
        Ok(Self {
            source: expression.to_string(),
            segments,
        })
    }

    /// Evaluate against a set of context objects
    pub fn evaluate(&self, context: &[Object]) -> Vec<Object> {
        eval::evaluate(&self.segments, context)
    }

    /// The expression this query was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for XPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile and evaluate in one go; a malformed expression matches nothing
pub(crate) fn filter(context: &[Object], expression: &str) -> Vec<Object> {
    match XPath::parse(expression) {
        Ok(query) => {
            let matches = query.evaluate(context);
            debug!(expression, matches = matches.len(), "evaluated xpath");
            matches
        }
        Err(err) => {
            debug!(expression, error = %err, "malformed xpath expression");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_reports_malformed() {
        let err = XPath::parse("//a[").err();
        assert!(matches!(
            err.as_ref().map(Error::kind),
            Some(ErrorKind::MalformedQuery)
        ));
        assert!("//a[@b]".parse::<XPath>().is_ok());
    }

    #[test]
    fn test_filter_swallows_malformed() {
        let root = Object::new();
        root.add_element(&Object::new(), "a");
        assert_eq!(filter(std::slice::from_ref(&root), "//a").len(), 1);
        assert!(filter(std::slice::from_ref(&root), "//a[").is_empty());
    }

    #[test]
    fn test_display_round_trips_source() -> Result<()> {
        let query = XPath::parse("//a/b[2]")?;
        assert_eq!(query.to_string(), "//a/b[2]");
        assert_eq!(query.as_str(), "//a/b[2]");
        Ok(())
    }
}

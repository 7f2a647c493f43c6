//! JSON codec
//!
//! JSON text is parsed straight into the [`crate::node`] tree. Two rules adapt
//! JSON to the XML-shaped model:
//!
//! - an attribute named after the configured inner-value key (default
//!   `"innerValue"`) holding a scalar becomes the object's inner value, and is
//!   written back under that key on output;
//! - array members must be objects, so a scalar member is wrapped in an object
//!   whose inner value is that scalar, and a nested array is wrapped in an
//!   object that stores it under the inner-value key.

mod parser;
mod writer;

use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result, Span};
use crate::node::Node;

pub(crate) use writer::{to_string, to_string_pretty};

/// Attribute name mapped to an object's inner value unless configured
/// otherwise
pub const DEFAULT_INNER_VALUE_KEY: &str = "innerValue";

/// Configuration for the JSON parser
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Attribute name that carries an object's inner value
    pub inner_value_key: String,
    /// Maximum nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inner_value_key: DEFAULT_INNER_VALUE_KEY.to_string(),
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
            ..Self::default()
        }
    }

    /// Create a new config with specific limits
    pub fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
            ..Self::default()
        }
    }

    /// Use a different attribute name for inner values
    pub fn with_inner_value_key(mut self, key: impl Into<String>) -> Self {
        self.inner_value_key = key.into();
        self
    }
}

/// Parse a JSON document into an object- or array-rooted tree.
///
/// Malformed input yields an error and never a partial tree. A document whose
/// root is a bare scalar is reported as a shape mismatch.
#[instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn parse(input: &[u8], config: &Config) -> Result<Node> {
    if config.max_size > 0 && input.len() > config.max_size {
        return Err(Error::new(
            ErrorKind::MaxSizeExceeded {
                max: config.max_size,
            },
            Span::empty(),
        ));
    }

    let node = parser::Parser::new(input, config).parse_document()?;
    let root = match &node {
        Node::Object(_) => "object",
        Node::Array(_) => "array",
    };
    debug!(root, "parsed json document");
    Ok(node)
}

//! XML codec
//!
//! Elements become [`Object`]s named after their tag. Tag attributes are
//! stored as string scalars, child elements are added with
//! [`Object::add_element`] (so repeated tags collapse into an
//! [`crate::Array`]), and text content becomes the inner value.

mod parser;
mod writer;

use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result, Span};
use crate::node::Object;

pub(crate) use writer::{array_to_string, object_to_string};

/// Tag used for array members that carry no name of their own
pub const DEFAULT_ELEMENT_NAME: &str = "item";

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// Parse an XML document.
///
/// The result is an unnamed container object whose children are the
/// document's top-level elements. Malformed input yields an error and never a
/// partial tree.
#[instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn parse(input: &[u8], config: &Config) -> Result<Object> {
    if config.max_size > 0 && input.len() > config.max_size {
        return Err(Error::new(
            ErrorKind::MaxSizeExceeded {
                max: config.max_size,
            },
            Span::empty(),
        ));
    }

    let document = parser::Parser::new(input, config).parse_document()?;
    debug!(elements = document.len(), "parsed xml document");
    Ok(document)
}

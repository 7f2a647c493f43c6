//! arbor - order-preserving JSON/XML document trees
//!
//! JSON and XML are parsed into one mutable tree of [`Object`]s, [`Array`]s
//! and [`Scalar`]s that keeps attribute order and parent links. The tree can
//! be queried with a subset of XPath, edited in place, and written back out
//! as either format.
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), arbor::Error> {
//! let doc = arbor::from_xml(br#"<shelf><book id="1">Dune</book><book id="2">Emma</book></shelf>"#)?;
//!
//! let second = doc.filter_xpath("//book[@id = 2]");
//! assert_eq!(second.len(), 1);
//!
//! for book in &second {
//!     book.set_value("read", true);
//! }
//! assert_eq!(
//!     doc.to_json(),
//!     r#"{"shelf":{"book":[{"innerValue":"Dune","id":"1"},{"innerValue":"Emma","id":"2","read":true}]}}"#
//! );
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod cursor;

pub mod node;
pub use node::{Array, Node, Object, Parent, Scalar, Value};

pub mod json;
pub mod xml;

pub mod xpath;
pub use xpath::XPath;

pub mod wildcard;

pub mod convert;
pub use convert::{convert, convert_with_options, ConvertOptions, Format};

/// Parse a JSON document with the default inner-value key and limits
pub fn from_json(input: &[u8]) -> Result<Node> {
    json::parse(input, &json::Config::default())
}

/// Parse a JSON document with custom configuration
pub fn from_json_with_config(input: &[u8], config: &json::Config) -> Result<Node> {
    json::parse(input, config)
}

/// Parse an XML document into an unnamed container of its top-level elements
pub fn from_xml(input: &[u8]) -> Result<Object> {
    xml::parse(input, &xml::Config::default())
}

/// Parse an XML document with custom limits
pub fn from_xml_with_config(input: &[u8], config: &xml::Config) -> Result<Object> {
    xml::parse(input, config)
}

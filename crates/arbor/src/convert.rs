//! Format conversion through the node tree

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::json::{self, Config as JsonConfig};
use crate::node::Node;
use crate::xml::{self, Config as XmlConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            other => Err(Error::with_message(
                ErrorKind::InvalidToken,
                Span::empty(),
                format!("unknown format: {other}"),
            )),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Xml => f.write_str("xml"),
        }
    }
}

/// Conversion options per format
#[derive(Clone, Debug, Default)]
pub struct ConvertOptions {
    pub json: JsonConfig,
    pub xml: XmlConfig,
}

/// Convert between JSON and XML
pub fn convert(input: &str, from: Format, to: Format) -> Result<String> {
    convert_with_options(input, from, to, &ConvertOptions::default())
}

/// Convert with custom parser limits and inner-value key.
///
/// The input is always parsed, so converting a format to itself validates and
/// normalizes it.
pub fn convert_with_options(
    input: &str,
    from: Format,
    to: Format,
    options: &ConvertOptions,
) -> Result<String> {
    let tree = parse(input, from, options)?;
    Ok(match to {
        Format::Json => tree.to_json_with_inner_value_key(&options.json.inner_value_key),
        Format::Xml => tree.to_xml(),
    })
}

/// Parse `input` in the given format
pub fn parse(input: &str, format: Format, options: &ConvertOptions) -> Result<Node> {
    match format {
        Format::Json => json::parse(input.as_bytes(), &options.json),
        Format::Xml => xml::parse(input.as_bytes(), &options.xml).map(Node::Object),
    }
}

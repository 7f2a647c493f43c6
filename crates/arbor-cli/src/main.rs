use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use arbor::{json, xml, ConvertOptions, Format, Node, Object, Scalar, XPath};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "arbor",
    version,
    about = "Query, edit and convert JSON/XML documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Input format (inferred from the file extension when omitted)
    #[arg(short, long, value_enum, global = true)]
    from: Option<FormatArg>,
    /// JSON attribute name that maps to an element's inner value
    #[arg(long, value_name = "KEY", global = true, default_value = json::DEFAULT_INNER_VALUE_KEY)]
    inner_value_key: String,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT", global = true)]
    output: Option<PathBuf>,
    /// Log parser and query activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a document between JSON and XML
    Convert {
        /// Output format
        #[arg(short, long, value_enum)]
        to: FormatArg,
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
    },
    /// Print every element matching an XPath expression
    Query {
        xpath: String,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Set an attribute on every matching element
    Set {
        xpath: String,
        attribute: String,
        /// `true`, `false`, `null` and numbers are typed; anything else is text
        value: String,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Delete an attribute from every matching element
    Delete {
        xpath: String,
        attribute: String,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Add a copy of a JSON object as a child of every matching element
    Add {
        xpath: String,
        name: String,
        /// The new element, as a JSON object
        element: String,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Remove the child elements with a name from every matching element
    Remove {
        xpath: String,
        name: String,
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(Debug, Args)]
struct IoArgs {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output format (defaults to the input format)
    #[arg(short, long, value_enum)]
    to: Option<FormatArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Json,
    Xml,
}

impl From<FormatArg> for Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Xml => Self::Xml,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let options = ConvertOptions {
        json: json::Config::default().with_inner_value_key(&cli.inner_value_key),
        xml: xml::Config::default(),
    };

    let (input, io, edit) = match cli.command {
        Command::Convert { to, input } => {
            let from = input_format(cli.from, &input)?;
            let data = read_input(&input)?;
            let output = arbor::convert_with_options(&data, from, to.into(), &options)?;
            return write_output(&cli.output, &output);
        }
        Command::Query { xpath, io } => {
            let from = input_format(cli.from, &io.input)?;
            let document = load(&io, from, &options)?;
            let matches = select(&document, &xpath)?;
            let to = io.to.map_or(from, Format::from);
            let rendered: Vec<String> = matches
                .iter()
                .map(|m| render_object(m, to, &options))
                .collect();
            return write_output(&cli.output, &rendered.join("\n"));
        }
        Command::Set {
            xpath,
            attribute,
            value,
            io,
        } => {
            let value = parse_scalar(&value);
            (xpath, io, Edit::Set(attribute, value))
        }
        Command::Delete {
            xpath,
            attribute,
            io,
        } => (xpath, io, Edit::Delete(attribute)),
        Command::Add {
            xpath,
            name,
            element,
            io,
        } => {
            let element = Object::from_json_with_config(element.as_bytes(), options.json.clone())
                .context("new element must be a JSON object")?;
            (xpath, io, Edit::Add(name, element))
        }
        Command::Remove { xpath, name, io } => (xpath, io, Edit::Remove(name)),
    };

    let from = input_format(cli.from, &io.input)?;
    let document = load(&io, from, &options)?;
    let matches = select(&document, &input)?;
    let (targets, snapshots): (Vec<Object>, Vec<Object>) = matches
        .into_iter()
        .partition(|m| m.parent().is_some() || is_root(&document, m));
    for snapshot in &snapshots {
        let name = snapshot.element_name().unwrap_or_default();
        warn!(%name, "match is a scalar attribute, not an element; skipping");
    }
    for target in &targets {
        edit.apply(target);
    }
    debug!(edited = targets.len(), skipped = snapshots.len(), "applied edit");

    let to = io.to.map_or(from, Format::from);
    write_output(&cli.output, &render(&document, to, &options))
}

/// One in-place change applied to every query match
enum Edit {
    Set(String, Scalar),
    Delete(String),
    Add(String, Object),
    Remove(String),
}

impl Edit {
    fn apply(&self, target: &Object) {
        match self {
            Self::Set(attribute, value) => {
                target.set_value(attribute, value.clone());
            }
            Self::Delete(attribute) => {
                target.delete_attribute(attribute);
            }
            Self::Add(name, element) => {
                target.add_element(&element.deep_copy(), name);
            }
            Self::Remove(name) => {
                target.remove_element_named(name);
            }
        }
    }
}

fn load(io: &IoArgs, from: Format, options: &ConvertOptions) -> Result<Node> {
    let data = read_input(&io.input)?;
    arbor::convert::parse(&data, from, options)
        .with_context(|| format!("failed to parse {from} input"))
}

fn select(document: &Node, expression: &str) -> Result<Vec<Object>> {
    let query = XPath::parse(expression)
        .with_context(|| format!("invalid xpath expression {expression:?}"))?;
    let context = match document {
        Node::Object(o) => vec![o.clone()],
        Node::Array(a) => a.elements(),
    };
    let matches = query.evaluate(&context);
    if matches.is_empty() {
        warn!(expression, "query matched nothing");
    }
    Ok(matches)
}

/// The document root is the only parentless match that is not a scalar snapshot
fn is_root(document: &Node, object: &Object) -> bool {
    matches!(document, Node::Object(root) if root.ptr_eq(object))
}

fn render(document: &Node, to: Format, options: &ConvertOptions) -> String {
    match to {
        Format::Json => document.to_json_with_inner_value_key(&options.json.inner_value_key),
        Format::Xml => document.to_xml(),
    }
}

fn render_object(object: &Object, to: Format, options: &ConvertOptions) -> String {
    match to {
        Format::Json => object.to_json_with_inner_value_key(&options.json.inner_value_key),
        Format::Xml => object.to_xml(),
    }
}

/// Read a command-line value as a typed scalar where it looks like one
fn parse_scalar(raw: &str) -> Scalar {
    match raw {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        "null" => Scalar::Null,
        _ => {
            let text = Scalar::from(raw);
            text.as_number().map_or(text, Scalar::Number)
        }
    }
}

fn input_format(from: Option<FormatArg>, input: &Option<PathBuf>) -> Result<Format> {
    if let Some(format) = from {
        return Ok(format.into());
    }
    match input.as_deref().and_then(Format::from_path) {
        Some(format) => Ok(format),
        None => {
            bail!("could not infer input format; pass --from or provide an input file with extension")
        }
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &str) -> Result<()> {
    let mut data = data.to_string();
    if !data.is_empty() && !data.ends_with('\n') {
        data.push('\n');
    }
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(data.as_bytes())
                .context("failed to write stdout")?;
            Ok(())
        }
    }
}

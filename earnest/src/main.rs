mod output;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use earnest_core::{
    DEFAULT_DELIMITER, Error as CoreError, Found, Key, KeyPath, MagicDict, Order, Segment,
    TypeTag, Value, lookup_path, walk,
};
use output::{
    GetOutput, KeysOutput, LookupData, LookupOutput, OutputWriter, WalkEntry, WalkOutput,
    render_text,
};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{Level, debug};

/// Earnest - Walk, query and filter nested JSON documents
#[derive(Parser)]
#[command(name = "earnest")]
#[command(about = "Path walking, path lookup and type-filtered access for JSON", long_about = None)]
#[command(version)]
struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log lookups to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path delimiter (defaults to EARNEST_DELIMITER env var or ".")
    #[arg(short, long, global = true)]
    delimiter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every node with its path
    Walk {
        /// Visit children before their parents
        #[arg(long)]
        post_order: bool,

        /// Input document (reads stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Resolve a delimited path in the document
    Get {
        /// Path such as `d.nested.1.foo`
        path: String,

        /// Value to print if the path does not resolve (JSON, or a bare string)
        #[arg(long)]
        default: Option<String>,

        /// Input document (reads stdin if omitted)
        file: Option<PathBuf>,
    },

    /// Look up a key expression with type checking, e.g. `d1.s1:str` or `:int`
    Lookup {
        /// Key expression
        key: String,

        /// Input document (reads stdin if omitted)
        file: Option<PathBuf>,
    },

    /// List top-level keys, optionally only those holding a given type
    Keys {
        /// Type filter (bool, int, float, str, dict, list)
        #[arg(short = 't', long = "type")]
        tag: Option<String>,

        /// Input document (reads stdin if omitted)
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let output = OutputWriter::new(cli.json);
    if let Err(err) = run(cli, &output) {
        let code = result_code(&err);
        output.write_error(&err, code);
        std::process::exit(code.into());
    }
}

fn run(cli: Cli, output: &OutputWriter) -> Result<()> {
    // Determine delimiter: CLI arg > EARNEST_DELIMITER env var > "." default
    let delimiter = cli
        .delimiter
        .or_else(|| std::env::var("EARNEST_DELIMITER").ok())
        .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());

    match cli.command {
        Commands::Walk { post_order, file } => {
            cmd_walk(output, file.as_deref(), post_order, &delimiter)
        }
        Commands::Get {
            path,
            default,
            file,
        } => cmd_get(output, file.as_deref(), &path, default.as_deref(), &delimiter),
        Commands::Lookup { key, file } => cmd_lookup(output, file.as_deref(), &key, &delimiter),
        Commands::Keys { tag, file } => cmd_keys(output, file.as_deref(), tag.as_deref()),
    }
}

/// Exit status for a failed command: 1 for a missing key, 2 for other
/// lookup errors, 3 for input and usage errors.
fn result_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CoreError>() {
        Some(core) if core.is_not_found() => 1,
        Some(_) => 2,
        None => 3,
    }
}

fn read_document(file: Option<&Path>) -> Result<serde_json::Value> {
    match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse JSON from {}", path.display()))
        }
        None => {
            if atty::is(atty::Stream::Stdin) {
                let _ = Cli::command().print_help();
                bail!("No input: pass a FILE or pipe a JSON document on stdin");
            }
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            serde_json::from_str(&text).context("Failed to parse JSON from stdin")
        }
    }
}

fn join_path(path: &[Segment], delimiter: &str) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Parse a `--default` argument, falling back to a string for non-JSON input.
fn parse_default(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn walk_entries(doc: &serde_json::Value, order: Order, delimiter: &str) -> Vec<WalkEntry> {
    walk(doc, order)
        .map(|(path, node)| WalkEntry {
            path: join_path(&path, delimiter),
            value: node.clone(),
        })
        .collect()
}

fn get_path(
    doc: &serde_json::Value,
    path: &str,
    default: Option<&str>,
    delimiter: &str,
) -> Result<GetOutput> {
    let key_path = KeyPath::parse_with(path, delimiter)?;
    let (value, defaulted) = match (lookup_path(doc, &key_path), default) {
        (Ok(node), _) => (node.clone(), false),
        (Err(err), Some(raw)) if err.is_not_found() => {
            debug!(path, "falling back to default");
            (parse_default(raw), true)
        }
        (Err(err), _) => return Err(err).with_context(|| format!("Failed to resolve {}", path)),
    };

    Ok(GetOutput {
        success: true,
        result_code: 0,
        path: path.to_string(),
        value,
        defaulted,
    })
}

fn lookup_key(doc: serde_json::Value, expr: &str, delimiter: &str) -> Result<LookupOutput> {
    let key = Key::parse(expr, delimiter)
        .with_context(|| format!("Invalid key expression: {}", expr))?;
    let root = Value::from(doc);
    let found = root
        .lookup(key.clone())
        .with_context(|| format!("Failed to look up {}", expr))?;

    let data = match found {
        Found::Value(value) => LookupData::Value {
            value: value.clone(),
        },
        Found::View(view) => LookupData::View {
            tag: view.tag().to_string(),
            keys: view.keys().map(str::to_string).collect(),
        },
    };

    Ok(LookupOutput {
        success: true,
        result_code: 0,
        key: key.to_string(),
        data,
    })
}

fn list_keys(doc: serde_json::Value, tag: Option<&str>) -> Result<KeysOutput> {
    let dict = MagicDict::try_from(doc).context("Document root must be an object")?;
    let (tag, keys) = match tag {
        Some(name) => {
            let tag = TypeTag::parse(name)?;
            let keys = dict.view(tag).keys().map(str::to_string).collect();
            (Some(tag.to_string()), keys)
        }
        None => (None, dict.keys().map(str::to_string).collect()),
    };

    Ok(KeysOutput {
        success: true,
        result_code: 0,
        tag,
        keys,
    })
}

fn cmd_walk(
    output: &OutputWriter,
    file: Option<&Path>,
    post_order: bool,
    delimiter: &str,
) -> Result<()> {
    let doc = read_document(file)?;
    let order = if post_order {
        Order::ParentLast
    } else {
        Order::ParentFirst
    };
    let entries = walk_entries(&doc, order, delimiter);

    let data = WalkOutput {
        success: true,
        result_code: 0,
        order: if post_order { "post" } else { "pre" }.to_string(),
        entries,
    };

    output.write(&data, || {
        let mut text = String::new();
        for entry in &data.entries {
            text.push_str(&format!("{}\t{}\n", entry.path, entry.value));
        }
        text
    })
}

fn cmd_get(
    output: &OutputWriter,
    file: Option<&Path>,
    path: &str,
    default: Option<&str>,
    delimiter: &str,
) -> Result<()> {
    let doc = read_document(file)?;
    let data = get_path(&doc, path, default, delimiter)?;
    output.write(&data, || format!("{}\n", render_text(&data.value)))
}

fn cmd_lookup(
    output: &OutputWriter,
    file: Option<&Path>,
    expr: &str,
    delimiter: &str,
) -> Result<()> {
    let doc = read_document(file)?;
    let data = lookup_key(doc, expr, delimiter)?;
    output.write(&data, || match &data.data {
        LookupData::Value { value } => format!("{}\n", render_text(&value.to_json())),
        LookupData::View { keys, .. } => keys.iter().map(|k| format!("{}\n", k)).collect(),
    })
}

fn cmd_keys(output: &OutputWriter, file: Option<&Path>, tag: Option<&str>) -> Result<()> {
    let doc = read_document(file)?;
    let data = list_keys(doc, tag)?;
    output.write(&data, || data.keys.iter().map(|k| format!("{}\n", k)).collect())
}

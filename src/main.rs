use clap::{Parser, Subcommand};
use node_interpolate::node::JsonNode;
use node_interpolate::parser::tokenize;
use node_interpolate::{Components, Interpolation, Options, Tags, interpolate};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "interpolate")]
#[command(about = "Interpolate {{marker}} placeholders with JSON nodes")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpolate a string and print the resulting tree as JSON
    Render {
        /// The mixed string
        #[arg(required_unless_present = "stdin")]
        text: Option<String>,

        /// Read the mixed string from stdin
        #[arg(long)]
        stdin: bool,

        /// JSON file mapping marker names to nodes
        #[arg(long)]
        nodes: PathBuf,

        /// JSON file with custom tag delimiters
        #[arg(long)]
        tags: Option<PathBuf>,

        /// Fail on malformed input instead of printing the original string
        #[arg(long)]
        strict: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the tokens of a string as JSON
    Tokens {
        /// The mixed string
        #[arg(required_unless_present = "stdin")]
        text: Option<String>,

        /// Read the mixed string from stdin
        #[arg(long)]
        stdin: bool,

        /// JSON file with custom tag delimiters
        #[arg(long)]
        tags: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render { text, stdin, nodes, tags, strict, pretty } => {
            let (source, label) = read_source(text, stdin);
            let tags = tags.map(|path| read_tags(&path));
            render(&source, &label, &nodes, tags, strict, pretty);
        }
        Commands::Tokens { text, stdin, tags, pretty } => {
            let (source, label) = read_source(text, stdin);
            let tags = tags.map(|path| read_tags(&path)).unwrap_or_default();
            match tokenize(&source, &tags) {
                Ok(tokens) => print_json(&tokens, pretty),
                Err(e) => fail(&e.render(&source, &label)),
            }
        }
    }
}

/// RUST_LOG wins; otherwise `-v` flags pick the level, defaulting to warn
fn init_tracing(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

fn render(source: &str, label: &str, nodes: &Path, tags: Option<Tags>, strict: bool, pretty: bool) {
    let components = read_components(nodes);
    let options = Options {
        mixed_string: source.to_string(),
        components,
        tags,
        throw_errors: strict,
    };

    match interpolate(options) {
        Ok(Interpolation::Tree(tree)) => print_json(&tree, pretty),
        Ok(Interpolation::Original(original)) => print_json(&original, pretty),
        Err(e) => fail(&e.render(source, label)),
    }
}

fn read_source(text: Option<String>, stdin: bool) -> (String, String) {
    if stdin {
        let mut source = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut source) {
            fail(&format!("Error: failed to read stdin: {}", e));
        }
        // Keep a trailing newline from `echo` out of the output tree
        let trimmed = source.strip_suffix('\n').unwrap_or(&source).to_string();
        (trimmed, "<stdin>".to_string())
    } else {
        (text.unwrap_or_default(), "<arg>".to_string())
    }
}

fn read_components(path: &Path) -> Option<Components<JsonNode>> {
    let value = read_json(path);
    match Components::from_json(value) {
        Ok(components) => components,
        Err(e) => fail(&format!("Error: invalid node in {}: {}", path.display(), e)),
    }
}

fn read_tags(path: &Path) -> Tags {
    match serde_json::from_value(read_json(path)) {
        Ok(tags) => tags,
        Err(e) => fail(&format!("Error: invalid tags in {}: {}", path.display(), e)),
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail(&format!("Error: cannot read {}: {}", path.display(), e)),
    };
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(&format!("Error: {} is not valid JSON: {}", path.display(), e)),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => fail(&format!("Error: failed to serialize output: {}", e)),
    }
}

fn fail(message: &str) -> ! {
    eprint!("{}", message);
    if !message.ends_with('\n') {
        eprintln!();
    }
    std::process::exit(1);
}

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use modelview::model::{ModelTree, NodeId};
use modelview::{FsSource, ModelReader, ReaderOptions};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// ASCII tree per view
    Tree,
    /// Nested JSON per view
    Json,
    /// One line per entity with an id
    Entities,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Read a folder of model-view XML files and print their entity trees", long_about = None)]
struct Cli {
    /// Folder containing the model-view files
    #[arg(value_name = "MODEL_DIR")]
    model_dir: Utf8PathBuf,

    /// Only print this view (file name inside MODEL_DIR)
    #[arg(long)]
    view: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// JSON file with reader options
    #[arg(long, value_name = "OPTIONS_JSON")]
    config: Option<Utf8PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match &cli.config {
        Some(path) => ReaderOptions::from_json_file(path)?,
        None => ReaderOptions::default(),
    };
    let mut reader = ModelReader::with_options(&cli.model_dir, FsSource, options)
        .with_context(|| format!("Failed to index {}", cli.model_dir))?;

    let trees: Vec<Arc<ModelTree>> = match &cli.view {
        Some(view) => reader.read_file(view)?.into_iter().collect(),
        None => reader.read_all(),
    };

    match cli.format {
        Format::Tree => {
            for tree in &trees {
                println!("{}: {}", tree.view(), label(tree, tree.root()));
                print_tree(tree, tree.root(), "");
            }
        }
        Format::Json => {
            let nested: Vec<_> = trees.iter().map(|t| t.to_nested()).collect();
            println!("{}", serde_json::to_string_pretty(&nested)?);
        }
        Format::Entities => {
            for tree in &trees {
                for e in tree.referenceable() {
                    println!(
                        "{}\t{}\t{}\t{}",
                        e.view(),
                        e.id().unwrap_or_default(),
                        e.entity_type().unwrap_or_default(),
                        e.name().unwrap_or_default()
                    );
                }
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "modelview=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_tree(tree: &ModelTree, id: NodeId, prefix: &str) {
    let children = tree.children(id);
    for (i, &child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let branch = if last { "└─" } else { "├─" };
        println!("{}{} {}", prefix, branch, label(tree, child));
        let new_prefix = format!("{}{}", prefix, if last { "   " } else { "│  " });
        print_tree(tree, child, &new_prefix);
    }
}

fn label(tree: &ModelTree, id: NodeId) -> String {
    let Some(e) = tree.entity(id) else {
        return String::new();
    };
    let mut s = e.element_name().to_string();
    if let Some(t) = e.entity_type() {
        s.push_str(&format!(" [{}]", t));
    }
    if let Some(n) = e.name() {
        s.push_str(&format!(" {}", n));
    }
    if let Some(i) = e.id() {
        s.push_str(&format!(" ({})", i));
    }
    s
}

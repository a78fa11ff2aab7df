use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablekit::{parse_document, run_graph, validate, DirectoryResolver};

#[derive(Parser, Debug)]
#[command(name = "tablekit", about = "Run declarative tabular DAG pipelines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a graph document without executing it.
    Validate(GraphArgs),
    /// Execute a graph document and print its run report as JSON.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct GraphArgs {
    /// Path to the graph document (JSON).
    #[arg(long = "graph")]
    graph: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    #[command(flatten)]
    graph_args: GraphArgs,

    /// Directory source/source_csv nodes resolve file_id against, and
    /// output/output_csv nodes write into.
    #[arg(long = "upload-dir")]
    upload_dir: PathBuf,

    /// Pretty-print the JSON run report.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Validate(args) => {
            let doc = load_document(&args.graph)?;
            validate(&doc)?;
            println!("graph is valid: {} node(s), {} edge(s)", doc.nodes.len(), doc.edges.len());
            Ok(())
        }
        Command::Run(args) => {
            let doc = load_document(&args.graph_args.graph)?;
            let resolver = DirectoryResolver::new(&args.upload_dir);
            let report = run_graph(&doc, &resolver, &args.upload_dir, None);
            let json = if args.pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{json}");
            if !report.success {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn load_document(path: &std::path::Path) -> Result<tablekit::GraphDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading graph document at {}", path.display()))?;
    parse_document(&text).map_err(|e| anyhow::anyhow!("{e}"))
}

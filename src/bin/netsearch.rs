//! netsearch CLI: run network searches against graph snapshots.
//!
//! Usage:
//!   netsearch --graph g.json [--signed-graph sg.json] search request.json
//!   netsearch --graph g.json subgraph request.json
//!   netsearch --graph g.json multi-interactors request.json
//!
//! A request path of `-` reads the request from stdin. Results are printed
//! as JSON on stdout; logs go to stderr (`RUST_LOG`, default `info`).

use clap::{Parser, Subcommand};
use netsearch::search::{InMemoryOntology, OntologyFile};
use netsearch::{
    GraphSnapshot, InteractionGraph, MultiInteractorsRequest, NetworkSearchApi, NetworkSearchQuery,
    SearchConfig, SubgraphRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "netsearch",
    version,
    about = "Mechanistic path and neighbor search over interaction graphs"
)]
struct Cli {
    /// Unsigned graph snapshot (JSON)
    #[arg(long, global = true)]
    graph: Option<PathBuf>,
    /// Signed graph snapshot (JSON); signed queries find nothing without it
    #[arg(long, global = true)]
    signed_graph: Option<PathBuf>,
    /// Service configuration (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Ontology parent links (JSON)
    #[arg(long, global = true)]
    ontology: Option<PathBuf>,
    /// Statement hashes to exclude (JSON array)
    #[arg(long, global = true)]
    blacklist: Option<PathBuf>,
    /// Pretty-print the output
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Path search between or out from entities
    Search {
        /// Network search query (JSON), or - for stdin
        request: PathBuf,
    },
    /// Edges among a set of entities
    Subgraph {
        /// Subgraph request (JSON), or - for stdin
        request: PathBuf,
    },
    /// Common up- or downstream neighbors of a set of entities
    MultiInteractors {
        /// Multi-interactors request (JSON), or - for stdin
        request: PathBuf,
    },
}

fn read_text(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid JSON in '{}': {}", path.display(), e))
}

fn load_graph(path: &Path) -> Result<InteractionGraph, String> {
    let snapshot = GraphSnapshot::load(path)
        .map_err(|e| format!("Failed to load graph '{}': {}", path.display(), e))?;
    let graph = snapshot.into_graph();
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        signed = graph.is_signed(),
        "loaded graph"
    );
    Ok(graph)
}

fn open_api(cli: &Cli) -> Result<NetworkSearchApi, String> {
    let graph_path = cli
        .graph
        .as_deref()
        .ok_or_else(|| "--graph is required".to_string())?;
    let unsigned = load_graph(graph_path)?;
    let signed = match &cli.signed_graph {
        Some(path) => load_graph(path)?,
        None => InteractionGraph::signed(),
    };
    let mut api = NetworkSearchApi::new(Arc::new(unsigned), Arc::new(signed));

    if let Some(path) = &cli.config {
        let config = SearchConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {}", path.display(), e))?;
        api = api.with_config(config);
    }
    if let Some(path) = &cli.blacklist {
        let hashes: HashSet<i64> = read_json(path)?;
        info!(hashes = hashes.len(), "loaded hash blacklist");
        api = api.with_hash_blacklist(hashes);
    }
    if let Some(path) = &cli.ontology {
        let file: OntologyFile = read_json(path)?;
        api = api.with_ontology(Arc::new(InMemoryOntology::from_file(file)));
    }
    Ok(api)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> i32 {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match out {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_search(api: &NetworkSearchApi, request: &Path, pretty: bool) -> i32 {
    let query: NetworkSearchQuery = match read_json(request) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match api.handle_query(&query) {
        Ok(results) => print_json(&results, pretty),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_subgraph(api: &NetworkSearchApi, request: &Path, pretty: bool) -> i32 {
    let request: SubgraphRequest = match read_json(request) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match api.handle_subgraph_query(&request) {
        Ok(results) => print_json(&results, pretty),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_multi_interactors(api: &NetworkSearchApi, request: &Path, pretty: bool) -> i32 {
    let request: MultiInteractorsRequest = match read_json(request) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match api.handle_multi_interactors_query(&request) {
        Ok(results) => print_json(&results, pretty),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let api = match open_api(&cli) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let code = match &cli.command {
        Commands::Search { request } => cmd_search(&api, request, cli.pretty),
        Commands::Subgraph { request } => cmd_subgraph(&api, request, cli.pretty),
        Commands::MultiInteractors { request } => cmd_multi_interactors(&api, request, cli.pretty),
    };
    std::process::exit(code);
}

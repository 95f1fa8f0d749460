use clap::{Parser, Subcommand};
use leadpath::prelude::*;
use serde_json::Value;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect lead paths and build transition payloads against a status catalog
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Separator for namespaced keys (overrides the catalog default)
    #[arg(long, global = true)]
    separator: Option<String>,

    /// Deepest branch level the catalog may declare
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Log engine decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the catalog and print its status tree
    Check { catalog: String },
    /// Print the path detected for a lead
    Path { catalog: String, lead: String },
    /// Print the fields of a lead's path with their current values
    Fields { catalog: String, lead: String },
    /// Apply a JSON object of edits and print the resulting payload
    Transition {
        catalog: String,
        lead: String,
        edits: String,
    },
    /// Write a bincode snapshot of the catalog
    Snapshot {
        catalog: String,
        #[arg(short, long, default_value = "catalog.bin")]
        output: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Check { catalog } => run_check(&load_catalog(&cli, catalog)),
        Command::Path { catalog, lead } => {
            let catalog = load_catalog(&cli, catalog);
            run_path(&catalog, &load_lead(lead));
        }
        Command::Fields { catalog, lead } => {
            let catalog = load_catalog(&cli, catalog);
            run_fields(&catalog, &load_lead(lead));
        }
        Command::Transition {
            catalog,
            lead,
            edits,
        } => {
            let catalog = load_catalog(&cli, catalog);
            run_transition(&catalog, load_lead(lead), edits);
        }
        Command::Snapshot { catalog, output } => {
            let catalog = load_catalog(&cli, catalog);
            catalog
                .snapshot()
                .save(output)
                .unwrap_or_else(|e| exit_with_error(&format!("Snapshot failed: {}", e)));
            println!("Snapshot of {} statuses written to '{}'", catalog.statuses().len(), output);
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "leadpath=debug" } else { "leadpath=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(cli: &Cli, path: &str) -> Catalog {
    let start = Instant::now();
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read catalog file '{}': {}", path, e)));

    let mut builder = Catalog::builder(json.as_str());
    if let Some(separator) = &cli.separator {
        builder = builder.with_separator(separator);
    }
    if let Some(max_depth) = cli.max_depth {
        builder = builder.with_max_depth(max_depth);
    }
    let catalog = builder
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid catalog: {}", e)));
    tracing::debug!(elapsed = ?start.elapsed(), "catalog loaded");
    catalog
}

fn load_lead(path: &str) -> Lead {
    let json = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read lead file '{}': {}", path, e)));
    serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse lead JSON: {}", e)))
}

fn lead_path(catalog: &Catalog, lead: &Lead) -> Path {
    lead.path(catalog)
        .unwrap_or_else(|e| exit_with_error(&format!("Path detection failed: {}", e)))
}

fn run_check(catalog: &Catalog) {
    println!("Catalog OK: {} statuses", catalog.statuses().len());
    for root in catalog.roots() {
        print_status(catalog, root, 0);
    }
}

fn print_status(catalog: &Catalog, status: &StatusDefinition, indent: usize) {
    let mut marks = Vec::new();
    if status.is_default_status {
        marks.push("default");
    }
    if status.is_final_status {
        marks.push("final");
    }
    let marks = if marks.is_empty() {
        String::new()
    } else {
        format!(" ({})", marks.join(", "))
    };
    println!("{}{} [{}]{}", "  ".repeat(indent), status.name, status.id, marks);

    for field in status.branching_fields() {
        for option in &field.options {
            let Some(child) = field.child_for(option).and_then(|id| catalog.status(id)) else {
                continue;
            };
            println!("{}  {} = {}:", "  ".repeat(indent), field.name, option);
            print_status(catalog, child, indent + 2);
        }
    }
}

fn run_path(catalog: &Catalog, lead: &Lead) {
    let root = lead_path(catalog, lead);
    let report = PathDetector::new(catalog, &lead.data)
        .detect_with_report(root.root_id())
        .unwrap_or_else(|e| exit_with_error(&format!("Path detection failed: {}", e)));

    println!("{}", DisplayPath::new(&report.path, catalog));
    println!("Effective status: {}", report.path.effective_status());
    if report.path.effective_status() != lead.current_status_id {
        println!(
            "  -> Stored status '{}' is not where the data leads",
            lead.current_status_id
        );
    }
    for ambiguous in &report.ambiguous {
        println!("  -> Ambiguous: {}", ambiguous);
    }
}

fn run_fields(catalog: &Catalog, lead: &Lead) {
    let path = lead_path(catalog, lead);
    println!("{}", DisplayPath::new(&path, catalog));
    for field in resolve_fields(&path, catalog) {
        let key = catalog.namespacer().encode(&field.key);
        let value = lead
            .data
            .get(&key)
            .map_or_else(|| "-".to_string(), Value::to_string);
        println!(
            "{}{}{} [{}] = {}",
            "  ".repeat(field.depth + 1),
            field.display_name,
            if field.required { " *" } else { "" },
            key,
            value
        );
    }

    let drift = catalog.unrecognized_keys(&lead.data);
    if !drift.is_empty() {
        println!("Unrecognized keys: {}", drift.keys.join(", "));
    }
}

fn run_transition(catalog: &Catalog, lead: Lead, edits_path: &str) {
    let json = fs::read_to_string(edits_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read edits file '{}': {}", edits_path, e))
    });
    let edits: serde_json::Map<String, Value> = serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Edits must be a JSON object: {}", e)));

    let mut session = EditSession::new(catalog, lead)
        .unwrap_or_else(|e| exit_with_error(&format!("Path detection failed: {}", e)));
    for (raw, value) in edits {
        let key = catalog
            .namespacer()
            .parse(&raw)
            .unwrap_or_else(|e| exit_with_error(&format!("Bad edit key: {}", e)));
        session
            .set(key, value)
            .unwrap_or_else(|e| exit_with_error(&format!("Edit '{}' failed: {}", raw, e)));
    }

    match session.payload() {
        Ok(payload) => {
            let out = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode payload: {}", e)));
            println!("{}", out);
        }
        Err(SessionError::Transition(TransitionError::Validation(violations))) => {
            eprintln!("Transition to '{}' blocked:", session.path().effective_status());
            for (status, fields) in violations.by_status() {
                eprintln!("  {}: {}", status, fields.join(", "));
            }
            std::process::exit(2);
        }
        Err(e) => exit_with_error(&format!("Transition failed: {}", e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

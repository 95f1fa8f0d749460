use clap::Parser;
use leadpath::prelude::*;
use rand::Rng;
use rand::rngs::ThreadRng;
use serde_json::{Value, json};
use std::fs;
use std::result::Result;

/// A CLI tool to generate random status catalogs and sample leads
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// How many branch levels below the root
    #[arg(long, default_value_t = 3)]
    depth: usize,

    /// Options per branching select, each opening a child status
    #[arg(long, default_value_t = 2)]
    fanout: usize,

    /// Plain fields per status
    #[arg(long, default_value_t = 3)]
    fields: usize,

    /// The path to write the generated catalog to
    #[arg(short, long, default_value = "generated_catalog.json")]
    output: String,

    /// Optional path to write a lead that walks a random branch
    #[arg(long)]
    lead_output: Option<String>,
}

const FIELD_TYPES: [FieldType; 5] = [
    FieldType::Text,
    FieldType::Number,
    FieldType::Date,
    FieldType::Email,
    FieldType::Checkbox,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.fanout == 0 {
        eprintln!("Error: --fanout must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating catalog (depth {}, fanout {}, {} fields per status)...",
        cli.depth, cli.fanout, cli.fields
    );

    let mut statuses = Vec::new();
    generate_status(&mut rng, &cli, "S0", 0, &mut statuses);
    if let Some(root) = statuses.first_mut() {
        root.is_default_status = true;
    }

    // Refuse to write anything the engine itself would reject.
    let catalog = Catalog::builder(statuses.clone()).build()?;
    fs::write(&cli.output, serde_json::to_string_pretty(&statuses)?)?;
    println!(
        "Successfully generated {} statuses and saved them to '{}'",
        statuses.len(),
        cli.output
    );

    if let Some(lead_output) = &cli.lead_output {
        let lead = generate_lead(&mut rng, &catalog)?;
        fs::write(lead_output, serde_json::to_string_pretty(&lead)?)?;
        println!(
            "-> Generated lead at '{}' with {} keys.",
            lead.current_status_id,
            lead.data.len()
        );
    }

    Ok(())
}

/// Pushes the status `id` and, below `cli.depth`, every child it opens.
fn generate_status(
    rng: &mut ThreadRng,
    cli: &Cli,
    id: &str,
    level: usize,
    out: &mut Vec<StatusDefinition>,
) {
    let mut status = StatusDefinition::new(id, &format!("Status {}", id));
    for i in 0..cli.fields {
        let field_type = FIELD_TYPES[rng.random_range(0..FIELD_TYPES.len())];
        let mut field = FieldDefinition::new(&format!("Field {}", i + 1), field_type);
        if rng.random_bool(0.3) {
            field = field.required();
        }
        status = status.with_field(field);
    }

    let leaf = level >= cli.depth;
    if leaf {
        status.is_final_status = rng.random_bool(0.5);
        out.push(status);
        return;
    }

    let options: Vec<String> = (1..=cli.fanout).map(|i| format!("Option {}", i)).collect();
    let option_refs: Vec<&str> = options.iter().map(String::as_str).collect();
    let mut branch = FieldDefinition::new(&format!("Stage {}", level + 1), FieldType::Select)
        .with_options(&option_refs);
    let children: Vec<String> = (1..=cli.fanout).map(|i| format!("{}.{}", id, i)).collect();
    for (option, child) in options.iter().zip(&children) {
        branch = branch.with_child(option, child);
    }
    out.push(status.with_field(branch));

    for child in &children {
        generate_status(rng, cli, child, level + 1, out);
    }
}

/// A lead that takes random options all the way down, filling every field it passes.
fn generate_lead(rng: &mut ThreadRng, catalog: &Catalog) -> Result<Lead, PathError> {
    let mut lead = Lead::new("generated-lead", catalog);
    let mut path = Path::root(&catalog.default_status().id);

    loop {
        let depth = path.len() - 1;
        let status = catalog.require(path.effective_status())?;
        for field in status.fields.iter().filter(|f| !f.is_branching()) {
            let key = catalog.namespacer().key_at(&path, depth, &field.name);
            lead.data.insert(key, random_value(rng, field.field_type));
        }

        let Some(branch) = status.branching_fields().next() else {
            break;
        };
        let option = &branch.options[rng.random_range(0..branch.options.len())];
        let key = catalog.namespacer().key_at(&path, depth, &branch.name);
        lead.data.insert(key, Value::String(option.clone()));

        let next = path.select(catalog, depth, &branch.name, option)?;
        if next.len() == path.len() {
            break;
        }
        path = next;
    }

    lead.current_status_id = path.effective_status().to_string();
    Ok(lead)
}

fn random_value(rng: &mut ThreadRng, field_type: FieldType) -> Value {
    match field_type {
        FieldType::Number => json!(rng.random_range(1..10_000)),
        FieldType::Date => json!(format!(
            "2026-{:02}-{:02}",
            rng.random_range(1..=12),
            rng.random_range(1..=28)
        )),
        FieldType::Email => json!(format!("lead{}@example.com", rng.random_range(100..1000))),
        FieldType::Checkbox => json!(rng.random_bool(0.5)),
        _ => json!(format!("Note {}", rng.random_range(1..100))),
    }
}

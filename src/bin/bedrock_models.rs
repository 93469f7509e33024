//! `bedrock-models`: list the compiled-in model catalog.
//!
//! Usage:
//!
//! ```text
//! bedrock-models [--capability <name>] [--catalog <aliases.json>]
//! ```
//!
//! With `--catalog`, the alias file is validated against the registry and its
//! aliases are printed next to the models they resolve to.

use std::collections::BTreeMap;
use std::process;
use uni_bedrock::api::catalog_from_file;
use uni_bedrock::registry::{self, Capability, Model};

fn print_usage() {
    eprintln!("Usage: bedrock-models [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --capability <name>    Only list models supporting <name>");
    eprintln!("                         (text, image, text-to-image, image-variation, converse)");
    eprintln!("  --catalog <path>       Validate an alias catalog and show its aliases");
    eprintln!("  --help                 Show this message");
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let mut capability: Option<Capability> = None;
    let mut catalog_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--capability" => {
                let name = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--capability requires a name"))?;
                capability = Some(name.parse()?);
            }
            "--catalog" => {
                catalog_path = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("--catalog requires a path argument"))?,
                );
            }
            _ => {
                print_usage();
                anyhow::bail!("Unexpected argument: {arg}");
            }
        }
    }

    let mut aliases: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    let catalog = match &catalog_path {
        Some(path) => catalog_from_file(path)?,
        None => Vec::new(),
    };
    for entry in &catalog {
        if let Some(model) = registry::lookup(&entry.model_id) {
            aliases.entry(model.id).or_default().push(entry.alias.clone());
        }
    }

    let models: Vec<&Model> = match capability {
        Some(cap) => registry::models_with(cap).collect(),
        None => registry::models().iter().collect(),
    };

    for model in &models {
        let caps: Vec<&str> = model.capabilities().iter().map(|c| c.as_str()).collect();
        println!(
            "{:<48} {:<12} {:<28} [{}]",
            model.id,
            model.family.to_string(),
            model.name,
            caps.join(", ")
        );
        if let Some(names) = aliases.get(model.id) {
            println!("{:<48} aliases: {}", "", names.join(", "));
        }
    }

    println!();
    println!("{} model(s)", models.len());
    if catalog_path.is_some() {
        println!("{} alias(es) validated", catalog.len());
    }
    Ok(())
}

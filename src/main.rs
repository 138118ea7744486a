//! opvet CLI binary entry point.
//! Delegates to modules for validation and scaffolding and prints results.

mod checks;
mod cli;
mod config;
mod create;
mod inherit;
mod models;
mod output;
mod utils;
mod validate;

use clap::Parser;
use cli::{Cli, Commands};
use create::{ScaffoldRequest, Scaffolder, TemplateKind};
use models::schema::SchemaDocument;
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Validate {
            operator,
            all,
            info,
            schema,
            operators_dir,
            repo_root,
            output,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                schema.as_deref(),
                operators_dir.as_deref(),
                output.as_deref(),
                if info { Some(true) } else { None },
            );
            // Friendly note if no opvet config was found
            if eff.output != "json" && config::load_config(&eff.repo_root).is_none() {
                eprintln!(
                    "{} {}",
                    utils::note_prefix(),
                    "No opvet.toml found; using defaults."
                );
            }
            let schema = load_schema_or_exit(&eff);

            if all {
                let operators_path = eff.operators_path();
                if !operators_path.is_dir() {
                    eprintln!(
                        "{} {}",
                        utils::error_prefix(),
                        format!(
                            "Operators directory not found: {}",
                            operators_path.to_string_lossy()
                        )
                    );
                    std::process::exit(2);
                }
                let reports = validate::validate_all(&schema, &operators_path);
                if reports.is_empty() {
                    eprintln!(
                        "{} {}",
                        utils::note_prefix(),
                        format!(
                            "No operators found under {}",
                            operators_path.to_string_lossy()
                        )
                    );
                }
                output::print_batch(&reports, &eff.repo_root, &eff.output, eff.show_info);
                if reports.iter().any(|r| r.summary.is_failure()) {
                    std::process::exit(1);
                }
            } else if let Some(operator) = operator {
                // A path argument is used as-is; a bare name resolves to
                // <operators_dir>/<name>/vars.yml.
                let file = if operator.contains('/') {
                    PathBuf::from(&operator)
                } else {
                    eff.operators_path().join(&operator).join("vars.yml")
                };
                if !file.exists() {
                    eprintln!(
                        "{} {}",
                        utils::error_prefix(),
                        format!("Operator file not found: {}", file.to_string_lossy())
                    );
                    std::process::exit(2);
                }
                let locator = inherit::locator_for(&file);
                let report = validate::validate_file(&schema, &file, &locator);
                output::print_report(&report, &eff.repo_root, &eff.output, eff.show_info);
                if report.summary.is_failure() {
                    std::process::exit(1);
                }
            } else {
                eprintln!(
                    "{} {}",
                    utils::error_prefix(),
                    "Pass an operator name or --all."
                );
                std::process::exit(2);
            }
        }
        Commands::Create {
            name,
            parent,
            template,
            version,
            description,
            author,
            tags,
            schema,
            operators_dir,
            repo_root,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                schema.as_deref(),
                operators_dir.as_deref(),
                None,
                None,
            );
            let schema = load_schema_or_exit(&eff);

            let template_name = template.as_deref().unwrap_or("standard");
            let Some(template) = TemplateKind::parse(template_name) else {
                eprintln!(
                    "{} {}",
                    utils::error_prefix(),
                    format!("Unknown template '{template_name}' (expected minimal|standard|advanced)")
                );
                std::process::exit(2);
            };
            let tags: Vec<String> = match tags {
                Some(tags) => tags
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
                None => vec!["development".to_string()],
            };
            let request = ScaffoldRequest {
                description: description
                    .unwrap_or_else(|| format!("{name} operator configuration")),
                version: version.unwrap_or_else(|| "1.0.0".to_string()),
                name: name.clone(),
                author,
                parent,
                tags,
                template,
            };

            let scaffolder = Scaffolder::new(eff.operators_path(), &schema);
            match scaffolder.create(&request) {
                Ok(dir) => {
                    println!("✅ Operator created: {}", dir.to_string_lossy());
                    println!("🔍 Validate with: opvet validate {name}");
                }
                Err(e) => {
                    eprintln!("{} {}", utils::error_prefix(), e);
                    std::process::exit(2);
                }
            }
        }
        Commands::Templates => {
            println!("Available templates:");
            for kind in TemplateKind::ALL {
                println!(
                    "  {}: {}",
                    kind.name(),
                    create::template_sections(kind).join(", ")
                );
            }
        }
        Commands::Parents {
            operators_dir,
            repo_root,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                None,
                operators_dir.as_deref(),
                None,
                None,
            );
            let parents = create::available_parents(&eff.operators_path());
            if parents.is_empty() {
                println!("No parent operators found");
            } else {
                println!("Available parent operators:");
                for parent in parents {
                    println!("  {parent}");
                }
            }
        }
    }
}

fn load_schema_or_exit(eff: &config::Effective) -> SchemaDocument {
    match SchemaDocument::load(&eff.schema_path()) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    }
}

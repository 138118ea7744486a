//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "opvet",
    version,
    about = "Operator configuration validator",
    long_about = "opvet — validate operator configuration files against the declarative schema,\nresolve operator inheritance, and scaffold new operators from templates.\n\nConfiguration precedence: CLI > opvet.toml > defaults.",
    after_help = "Examples:\n  opvet validate base\n  opvet validate --all --output json\n  opvet create myop --parent base --template standard\n  opvet parents",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for validating and scaffolding operators.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current opvet version.")]
    Version,
    /// Validate operator configurations
    #[command(
        about = "Run validation checks",
        long_about = "Validate one operator (by name or path) or all operators against the schema.\nErrors drive a non-zero exit; warnings and infos are advisory.",
        after_help = "Examples:\n  opvet validate base\n  opvet validate operators/base/vars.yml\n  opvet validate --all --info"
    )]
    Validate {
        #[arg(help = "Operator name or path to its vars.yml")]
        operator: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Validate all operators")]
        all: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show info-level findings")]
        info: bool,
        #[arg(long, help = "Path to the schema file (default: schema/operator_schema.yml)")]
        schema: Option<String>,
        #[arg(long, help = "Operators directory (default: operators)")]
        operators_dir: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Create a new operator from a template
    #[command(
        about = "Scaffold a new operator",
        long_about = "Create an operator directory with vars.yml and README.md from a template.\nThe name is checked against the schema's operator_name rule.",
        after_help = "Examples:\n  opvet create myop\n  opvet create myop --parent base --template advanced --tags development,devops"
    )]
    Create {
        #[arg(help = "New operator name (lowercase, alphanumeric + underscore)")]
        name: String,
        #[arg(long, help = "Parent operator to extend")]
        parent: Option<String>,
        #[arg(long, help = "Template: minimal|standard|advanced (default: standard)")]
        template: Option<String>,
        #[arg(long, help = "Operator version (default: 1.0.0)")]
        version: Option<String>,
        #[arg(long, help = "Operator description")]
        description: Option<String>,
        #[arg(long, help = "Operator author")]
        author: Option<String>,
        #[arg(long, help = "Comma-separated tags (default: development)")]
        tags: Option<String>,
        #[arg(long, help = "Path to the schema file (default: schema/operator_schema.yml)")]
        schema: Option<String>,
        #[arg(long, help = "Operators directory (default: operators)")]
        operators_dir: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
    /// List scaffolding templates
    #[command(
        about = "List templates",
        long_about = "List available scaffolding templates and the sections each one includes."
    )]
    Templates,
    /// List operators usable as parents
    #[command(
        about = "List parent operators",
        long_about = "List existing operators that can be referenced via 'extends'."
    )]
    Parents {
        #[arg(long, help = "Operators directory (default: operators)")]
        operators_dir: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
}

//! Formsmith CLI
//!
//! Command-line interface for saved forms, validation and derived fields.
//!
//! # Usage
//!
//! ```bash
//! formsmith forms list
//! formsmith forms import -f signup.json
//! formsmith validate --form 3k9x2ab --values answers.yaml
//! formsmith derive --form signup.json --values answers.json --format json
//! formsmith eval "price * qty" --var price=12.5 --var qty=4
//! formsmith lint --form 3k9x2ab
//! ```

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "formsmith")]
#[command(author = "Formsmith")]
#[command(version)]
#[command(about = "Formsmith Command Line Interface", long_about = None)]
struct Cli {
    /// Saved-forms file
    #[arg(long, env = "FORMSMITH_STORE")]
    store: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short)]
    profile: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(long, short, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage saved forms
    Forms {
        #[command(subcommand)]
        action: FormCommands,
    },
    /// Validate a set of values against a form
    Validate {
        /// Saved form id or schema file
        #[arg(long)]
        form: String,
        /// JSON or YAML object of values by field key
        #[arg(long)]
        values: PathBuf,
    },
    /// Compute derived fields for a set of values
    Derive {
        /// Saved form id or schema file
        #[arg(long)]
        form: String,
        /// JSON or YAML object of values by field key
        #[arg(long)]
        values: PathBuf,
    },
    /// Evaluate a single formula
    Eval {
        formula: String,
        /// Variable binding; the value is read as JSON, else as text
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = commands::eval::parse_var)]
        vars: Vec<(String, serde_json::Value)>,
    },
    /// Check a form's formulas for problems
    Lint {
        /// Saved form id or schema file
        #[arg(long)]
        form: String,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum FormCommands {
    /// List saved forms
    List,
    /// Show one form
    Show { id: String },
    /// Delete a saved form
    Delete { id: String },
    /// Delete every saved form
    Clear,
    /// Save forms from a schema file
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

fn init_tracing(verbose: u8, configured: Option<&str>) {
    let directive = match verbose {
        0 => std::env::var("RUST_LOG")
            .ok()
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| "warn".into()),
        1 => "debug".into(),
        _ => "trace".into(),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli, config: config::Config) -> anyhow::Result<()> {
    let format = cli.format.or_else(|| config.format()).unwrap_or_default();
    let ctx = commands::Context::new(config.store_path(cli.store)?, format);
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Forms { action } => commands::forms::handle(action, &ctx),
        Commands::Validate { form, values } => commands::validate::handle(&form, &values, &ctx),
        Commands::Derive { form, values } => commands::derive::handle(&form, &values, &ctx),
        Commands::Eval { formula, vars } => commands::eval::handle(&formula, vars, &ctx),
        Commands::Lint { form } => commands::lint::handle(&form, &ctx),
        Commands::Config { action } => commands::config::handle(action, profile),
    }
}

fn main() {
    let cli = Cli::parse();

    let loaded = config::Config::load(cli.profile.as_deref());
    let configured_filter = loaded.as_ref().ok().and_then(|c| c.log_filter.clone());
    init_tracing(cli.verbose, configured_filter.as_deref());
    tracing::debug!("formsmith v{}", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config not usable, using defaults: {:#}", e);
        config::Config::default()
    });

    if let Err(e) = run(cli, config) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

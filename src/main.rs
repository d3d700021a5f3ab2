use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use unitwise::core::features::unit_converter::{
    categories, convert, find_category, format_number, parse_quantity, resolve_unit,
};
use unitwise::shared::settings::AppSettings;

#[derive(Parser)]
#[command(name = "unitwise", about = "Unit conversion engine and HTTP API")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, env = "UNITWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overrides settings and UNITWISE_BIND
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve,

    /// Convert a quantity, e.g. `convert Length "5 km" Miles`
    Convert {
        /// Category name
        category: String,

        /// Number, optionally followed by a unit name or symbol
        quantity: String,

        /// Target unit name or symbol
        to: String,

        /// Source unit, when the quantity has no suffix
        #[arg(long)]
        from: Option<String>,
    },

    /// List categories and their units
    Categories,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve => cmd_serve(&cli).await,
        Commands::Convert {
            category,
            quantity,
            to,
            from,
        } => cmd_convert(category, quantity, to, from.as_deref()),
        Commands::Categories => cmd_categories(),
    }
}

async fn cmd_serve(cli: &Cli) -> Result<()> {
    let mut settings = AppSettings::load(cli.config.as_deref())
        .await
        .context("failed to load settings")?;
    if let Some(bind) = &cli.bind {
        settings.server.bind = bind.clone();
    }
    unitwise::run(settings).await
}

fn cmd_convert(category: &str, quantity: &str, to: &str, from: Option<&str>) -> Result<()> {
    let Some(category) = find_category(category) else {
        bail!("unknown category: {}", category);
    };

    let Some(parsed) = parse_quantity(quantity, category) else {
        bail!("could not parse quantity: {}", quantity);
    };

    let from_unit = match (parsed.unit, from) {
        (Some(unit), _) => unit,
        (None, Some(name)) => resolve_unit(category, name)
            .with_context(|| format!("unknown unit in {}: {}", category.name, name))?,
        (None, None) => bail!("no source unit: add a suffix to the quantity or pass --from"),
    };
    let to_unit = resolve_unit(category, to)
        .with_context(|| format!("unknown unit in {}: {}", category.name, to))?;

    let result = convert(parsed.value, from_unit, to_unit, category);
    println!(
        "{} {} = {} {}",
        format_number(parsed.value),
        from_unit.symbol,
        format_number(result),
        to_unit.symbol
    );
    Ok(())
}

fn cmd_categories() -> Result<()> {
    for category in categories() {
        println!("{} ({}, base: {})", category.name, category.strategy.as_str(), category.base_unit);
        for unit in &category.units {
            println!("  {:<28} {}", unit.name, unit.symbol);
        }
    }
    Ok(())
}

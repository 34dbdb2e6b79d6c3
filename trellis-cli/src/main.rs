//! Trellis CLI - Command line interface for Trellis
//!
//! Dependency analysis, metrics and priorities for GitHub Projects.

mod commands;

use clap::{Parser, Subcommand};
use trellis_core::{Config, Token};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{DepsArgs, ItemArgs, MetricsArgs, PriorityArgs, ProjectArgs, ViewArgs};

/// Trellis: dependency and metrics analysis for GitHub Projects
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Name of the status field (overrides config and env)
    #[arg(long, global = true, env = "TRELLIS_STATUS_FIELD")]
    status_field: Option<String>,

    /// Name of the priority field (overrides config and env)
    #[arg(long, global = true, env = "TRELLIS_PRIORITY_FIELD")]
    priority_field: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// List, create and inspect projects
    #[command(visible_alias = "p")]
    Project(ProjectArgs),

    /// Add, remove and list project items
    Item(ItemArgs),

    /// Manage project views
    View(ViewArgs),

    /// Manage and analyze item dependencies
    #[command(visible_alias = "d")]
    Deps(DepsArgs),

    /// Compute project metrics
    #[command(visible_alias = "m")]
    Metrics(MetricsArgs),

    /// Score and write item priorities
    Priority(PriorityArgs),

    /// Show current configuration
    Config {
        /// Also authenticate against GitHub and show the login
        #[arg(long)]
        check: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load configuration with overrides
    let config =
        Config::load_with_overrides(cli.status_field.clone(), cli.priority_field.clone())?;

    if cli.verbose {
        tracing::info!(
            status_field = %config.analysis.status_field,
            priority_field = %config.metrics.priority_field,
            graphql_url = %config.github.graphql_url,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("trellis {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Project(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Item(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::View(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Deps(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Metrics(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Priority(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config { check }) => {
            print_config(&config)?;
            if check {
                let login = commands::get_client(&config)?.test_connection().await?;
                println!("Authenticated as: {}", login);
            }
        }
        None => {
            println!("Trellis - Dependency and metrics analysis for GitHub Projects");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    println!("Trellis Configuration");
    println!("=====================");
    println!();
    println!("Analysis Settings:");
    println!("  status_field: {}", config.analysis.status_field);
    println!("  max_cycles: {}", config.analysis.max_cycles);
    println!();
    println!("Metrics Settings:");
    println!("  priority_field: {}", config.metrics.priority_field);
    println!(
        "  required_fields: {}",
        config
            .metrics
            .required_fields_for(&config.analysis.status_field)
            .join(", ")
    );
    println!(
        "  stale_after: {}",
        humanize_days(config.metrics.stale_after)
    );
    println!(
        "  trend_window: {}",
        humanize_days(config.metrics.trend_window)
    );
    println!("  trend_tolerance: {}", config.metrics.trend_tolerance);
    println!();
    println!("GitHub Settings:");
    println!("  graphql_url: {}", config.github.graphql_url);
    println!("  page_size: {}", config.github.page_size);
    match Token::resolve()? {
        Some(token) => println!("  token: found ({})", token.source()),
        None => println!("  token: not found"),
    }
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }

    Ok(())
}

fn humanize_days(duration: std::time::Duration) -> String {
    format!("{}d", duration.as_secs() / (24 * 60 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_check_flag() {
        let cli = Cli::try_parse_from(["trellis", "config", "--check"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { check: true })));

        let cli = Cli::try_parse_from(["trellis", "config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { check: false })));
    }
}

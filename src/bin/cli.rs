//! CLI binary for product-search.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use product_search::{AppConfig, output};
use tracing_subscriber::EnvFilter;

/// Hybrid keyword + semantic product search.
#[derive(Parser)]
#[command(name = "product-search", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run one fused search and print the ranked results.
    Search {
        /// Free-text query.
        query: String,

        /// Number of results to return (1-50).
        #[arg(short, default_value_t = 10)]
        k: usize,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only results.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("product_search=info,hybrid_search=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_user_error() => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}

async fn run(cli: Cli) -> product_search::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Search { query, k, json } => {
            let results = product_search::run_search(&config, &query, k).await?;
            if json {
                println!("{}", output::render_json(&query, &results)?);
            } else {
                print!("{}", output::render_text(&results));
            }
        }
        Command::Config => print!("{}", config.to_toml()?),
    }

    Ok(())
}

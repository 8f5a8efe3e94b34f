//! redliner-query - CLI tool for the analysis backend's query endpoints
//!
//! This tool provides commands for:
//! - Checking backend health and model load state
//! - Semantic search over ingested contract clauses
//! - Classifying a single clause of text
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/redliner/config.toml (~/.config/redliner/config.toml)
//! - Logs: $XDG_STATE_HOME/redliner/ (~/.local/state/redliner/)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use redliner_core::{AnalysisClient, Config};

#[derive(Parser)]
#[command(name = "redliner-query")]
#[command(about = "Query the contract analysis backend")]
#[command(version)]
struct Args {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show backend health and model load state
    Status,

    /// Semantic search over ingested clauses
    Search {
        /// Search query text
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Classify a single clause of text
    Classify {
        /// Clause text to classify
        text: String,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging if verbose
    let _log_guard = if args.verbose {
        Some(
            redliner_core::logging::init(&config.logging)
                .context("failed to initialize logging")?,
        )
    } else {
        None
    };

    let client =
        AnalysisClient::new(&config.backend).context("failed to create backend client")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create runtime")?;

    match args.command {
        Command::Status => {
            println!("Backend: {}", client.base_url());
            match runtime.block_on(client.health()) {
                Ok(health) => {
                    println!("Status:  {}", health.status);
                    if !health.models_loaded.is_empty() {
                        println!("Models:");
                        for (model, loaded) in &health.models_loaded {
                            let state = if *loaded { "loaded" } else { "not loaded" };
                            println!("  {:<24} {}", model, state);
                        }
                    }
                }
                Err(e) => {
                    // Health is advisory: report and exit cleanly
                    println!("Status:  unreachable ({})", e);
                }
            }
            Ok(())
        }

        Command::Search {
            query,
            limit,
            format,
        } => {
            if query.trim().is_empty() {
                anyhow::bail!("search query cannot be empty");
            }

            let response = runtime
                .block_on(client.search_clauses(&query, limit))
                .context("search failed")?;

            if format == "json" {
                let out = serde_json::json!({
                    "query": response.query,
                    "results": response
                        .results
                        .iter()
                        .map(|hit| serde_json::json!({
                            "id": hit.id,
                            "distance": hit.distance,
                            "text": hit.text,
                            "metadata": hit.metadata,
                        }))
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            if response.results.is_empty() {
                println!("No results for '{}'", response.query);
                return Ok(());
            }

            println!(
                "{} result(s) for '{}':\n",
                response.results.len(),
                response.query
            );
            for (rank, hit) in response.results.iter().enumerate() {
                println!(
                    "{:>3}. [distance {:.4}] {}",
                    rank + 1,
                    hit.distance,
                    truncate(&hit.text, 100)
                );
            }
            Ok(())
        }

        Command::Classify { text, format } => {
            if text.trim().is_empty() {
                anyhow::bail!("text cannot be empty");
            }

            let response = runtime
                .block_on(client.classify_text(&text))
                .context("classification failed")?;
            let classification = response.classification;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&classification)?);
                return Ok(());
            }

            println!("Risk level:  {}", classification.risk_level);
            println!("Confidence:  {:.0}%", classification.confidence * 100.0);
            println!("Explanation: {}", classification.explanation);
            if !classification.recommendations.is_empty() {
                println!("Recommendations:");
                for rec in &classification.recommendations {
                    println!("  - {}", rec);
                }
            }
            Ok(())
        }
    }
}

/// Truncate a string for single-line display.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

//! Resource Allocation Controller CLI
//!
//! Classifies utilization snapshots, recommends scaling actions from a
//! snapshot and its history, and sizes connection pools and cache budgets.

mod commands;
mod config;
mod input;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{advisors, assess, decide, CommandContext};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resource Allocation Controller CLI
#[derive(Parser)]
#[command(name = "rac")]
#[command(author, version, about = "CLI for the Adaptive Resource Allocation Controller", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ~/.config/rac/config.toml when present)
    #[arg(long, global = true, env = "RAC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Write Prometheus metrics to this file after the command runs
    #[arg(long, global = true)]
    pub textfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify the utilization of a single metrics snapshot
    Assess {
        /// JSON snapshot file, or - for stdin
        #[arg(long, short)]
        metrics: String,
    },

    /// Recommend a scaling action from a snapshot and its history
    Decide {
        /// JSON snapshot file, or - for stdin
        #[arg(long, short)]
        metrics: String,

        /// Earlier snapshots as a JSON array or JSON Lines
        #[arg(long)]
        history: Option<String>,

        /// Current instance count; prints the target count when given
        #[arg(long)]
        current_instances: Option<u32>,

        /// Reject out-of-range metrics and invalid options instead of deciding
        #[arg(long)]
        strict: bool,
    },

    /// Size a database connection pool
    Pool {
        /// Expected concurrent users
        #[arg(long, short)]
        users: Option<u32>,

        /// Average in-flight queries per user
        #[arg(long)]
        queries_per_user: Option<f64>,
    },

    /// Split a memory budget across cache categories
    Cache {
        /// Total memory in megabytes
        #[arg(long)]
        total_mb: Option<f64>,

        /// Comma-separated cache categories
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Rescale weights so the plan fits the available memory
        #[arg(long)]
        normalize: bool,

        /// Reject blank or duplicate categories and non-positive budgets
        #[arg(long)]
        strict: bool,
    },

    /// Show the effective configuration
    Config,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::ControllerConfig::load(cli.config.as_deref())?;
    let ctx = CommandContext::new(config, cli.format);

    match cli.command {
        Commands::Assess { metrics } => assess::run(&ctx, &metrics)?,
        Commands::Decide {
            metrics,
            history,
            current_instances,
            strict,
        } => decide::run(
            &ctx,
            decide::DecideArgs {
                metrics_path: &metrics,
                history_path: history.as_deref(),
                current_instances,
                strict,
            },
        )?,
        Commands::Pool {
            users,
            queries_per_user,
        } => advisors::run_pool(&ctx, users, queries_per_user)?,
        Commands::Cache {
            total_mb,
            types,
            normalize,
            strict,
        } => advisors::run_cache(
            &ctx,
            advisors::CacheArgs {
                total_mb,
                types,
                normalize,
                strict,
            },
        )?,
        Commands::Config => output::print_json(&ctx.config)?,
    }

    if let Some(path) = &cli.textfile {
        output::write_textfile(path)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

mod commands;
mod output;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use quality_core::Layer;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dwq")]
#[command(version, about = "Data warehouse quality checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a rule catalog against the source extracts
    Run {
        /// Path to a catalog file (YAML or TOML); the standard catalog is used when absent
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Directory holding the source_crm/ and source_erp/ extracts
        #[arg(short, long, env = "DWQ_DATA_DIR", default_value = "datasets")]
        data_dir: PathBuf,

        /// Reference date for time-dependent rules (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Layer of the extracts: bronze, silver, gold
        #[arg(short, long)]
        layer: Option<Layer>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Prepend the standard catalog to the catalog's rules
        #[arg(short, long)]
        standard: bool,
    },

    /// Check a catalog file without reading any data
    Check {
        /// Path to the catalog file (YAML or TOML)
        catalog: PathBuf,
    },

    /// List the rules of the standard catalog
    Rules {
        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            catalog,
            data_dir,
            as_of,
            layer,
            format,
            output,
            standard,
        } => {
            let options = commands::run::RunOptions {
                catalog,
                data_dir,
                as_of,
                layer,
                format,
                output,
                standard,
            };
            commands::run::execute(options).await
        }

        Commands::Check { catalog } => commands::check::execute(&catalog),

        Commands::Rules { format } => commands::rules::execute(&format),
    }
}

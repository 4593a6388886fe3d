//! # hatewatch: Hate Speech Analysis from the Command Line
//!
//! This is the main entry point for the `hatewatch` command-line interface. It loads the
//! configuration, builds the model and moderation clients once, and runs the analysis
//! pipeline for every given message.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hatewatch::{aggregate, factory, render, AnalysisRun, PipelineComposer, Report};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse messages for hate speech and right-wing extremist rhetoric
    Analyse(AnalyseArgs),
}

#[derive(Parser, Debug)]
struct AnalyseArgs {
    /// A message to analyse. Can be given several times
    #[arg(long = "message", short = 'm')]
    messages: Vec<String>,
    /// A file with one message per line. Empty lines are skipped
    #[arg(long)]
    input_file: Option<PathBuf>,
    /// The output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Path to the configuration file (defaults to ./hatewatch.yml if present)
    #[arg(long)]
    config: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// One JSON report per line
    Json,
    /// Plain-text flag and explanation tables
    Table,
}

/// One line of JSON output.
#[derive(Serialize)]
struct ReportLine<'a> {
    run_id: Uuid,
    message: &'a str,
    cancelled: bool,
    #[serde(flatten)]
    report: Report,
}

// --- Main Application Logic ---

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Analyse(args) => handle_analyse(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn collect_messages(args: &AnalyseArgs) -> Result<Vec<String>> {
    let mut messages: Vec<String> = args
        .messages
        .iter()
        .filter(|m| !m.trim().is_empty())
        .cloned()
        .collect();

    if let Some(path) = &args.input_file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
        messages.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    if messages.is_empty() {
        bail!("No messages to analyse. Use --message or --input-file.");
    }
    Ok(messages)
}

async fn handle_analyse(args: AnalyseArgs) -> Result<()> {
    dotenvy::dotenv().ok();
    let messages = collect_messages(&args)?;
    let config = config::get_config(args.config.as_deref())?;

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let model = factory::create_model_client(&config.model, timeout)
        .context("Failed to configure the model client")?;
    let moderation = factory::create_moderation_client(&config.moderation, timeout)
        .context("Failed to configure the moderation client")?;
    let composer = PipelineComposer::new(model, moderation).with_timeout(timeout);

    info!(
        "Analysing {} message(s) with '{}'",
        messages.len(),
        config.model.model_name
    );
    let cancel = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => warn!("Received Ctrl-C, cancelling the analysis"),
            // Without a signal handler the run can only complete.
            Err(_) => std::future::pending::<()>().await,
        }
    };
    let runs = composer
        .run_batch_with_cancel(&messages, config.concurrency, cancel)
        .await;

    for run in &runs {
        print_run(run, args.format)?;
    }
    Ok(())
}

fn print_run(run: &AnalysisRun, format: OutputFormat) -> Result<()> {
    let report = aggregate(run);
    match format {
        OutputFormat::Json => {
            let line = ReportLine {
                run_id: run.run_id,
                message: &run.input_message,
                cancelled: run.cancelled,
                report,
            };
            println!("{}", serde_json::to_string(&line)?);
        }
        OutputFormat::Table => {
            println!("Message: {}", run.input_message);
            if run.cancelled {
                println!("(cancelled)");
            }
            println!("\n{}", render::render_text(&report));
        }
    }
    Ok(())
}

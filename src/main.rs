use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use scenegen::cli::Cli;
use scenegen::cli::commands::Commands;
use scenegen::config::Config;
use scenegen::domain::OutcomeStatus;
use scenegen::llm::GeminiClient;
use scenegen::pipeline::{Pipeline, Planner};
use scenegen::render::ManimRenderer;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scenegen")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("scenegen.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_client(config: &Config) -> Result<Arc<GeminiClient>> {
    let client = GeminiClient::new(config.llm.clone())
        .context("Failed to create LLM client (is GEMINI_API_KEY set?)")?;
    Ok(Arc::new(client))
}

async fn run_application(cli: &Cli, config: Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Generate { topic, max_attempts } => {
            handle_generate_command(topic, *max_attempts, config).await
        }
        Commands::Plan { topic } => handle_plan_command(topic, config).await,
    }
}

async fn handle_generate_command(
    topic: &str,
    max_attempts: Option<u32>,
    mut config: Config,
) -> Result<()> {
    if let Some(attempts) = max_attempts {
        config.pipeline.max_attempts = attempts;
    }

    info!(
        "Generating animation for topic: {} (max_attempts: {})",
        topic, config.pipeline.max_attempts
    );
    println!("{} {}", "Generating:".green(), topic);

    let llm = build_client(&config)?;
    let renderer = Arc::new(ManimRenderer::new(config.render.clone()));
    let pipeline = Pipeline::new(llm, renderer, &config.pipeline);

    let outcome = pipeline.generate(topic).await.context("Generation failed")?;

    match outcome.status {
        OutcomeStatus::Success => {
            println!(
                "{} {} (after {} correction cycle(s))",
                "Rendered:".green(),
                outcome.entry_point_id,
                outcome.attempts_used
            );
            match outcome.video_path() {
                Some(path) => println!("  Video: {}", path.display()),
                None => println!("{}", "  Render succeeded but no video file was found".yellow()),
            }
        }
        OutcomeStatus::ExhaustedRetries => {
            println!(
                "{} gave up after {} correction cycle(s)",
                "Failed:".red(),
                outcome.attempts_used
            );
            println!("  Last error:\n{}", outcome.last_execution.diagnostic());
        }
    }

    Ok(())
}

async fn handle_plan_command(topic: &str, config: Config) -> Result<()> {
    info!("Planning scenes for topic: {}", topic);
    println!("{} {}", "Planning:".green(), topic);

    let llm = build_client(&config)?;
    let planner = Planner::new(llm);
    let plan = planner.plan(topic).await.context("Planning failed")?;

    println!("{} {}", "Scene class:".cyan(), plan.entry_point_id);
    println!("{}", plan.narrative);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, config).await.context("Application failed")?;

    Ok(())
}

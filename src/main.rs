//! Latency Probe - Main Application
//!
//! Serves the sampling API over HTTP, or runs a single batch with `--url`.

use clap::Parser;
use latency_probe::{
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, Result},
    executor::SamplingExecutor,
    logging::LoggerFactory,
    models::Config,
    server::{self, AppState},
    PKG_NAME, VERSION,
};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        let error = AppError::validation(message);
        eprintln!("{}", error.format_for_console(cli.use_colors()));
        process::exit(error.exit_code());
    }

    let use_color = cli.use_colors();
    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{} ({})", PKG_NAME, VERSION, env!("GIT_COMMIT"));
        eprintln!("Debug mode enabled");
    }

    // Env file commands run before the environment is loaded so a broken
    // file can still be inspected
    if let Some(ref path) = cli.create_env {
        EnvManager::save_example_env_file(path)?;
        eprintln!("Wrote example configuration to {}", path.display());
        return Ok(());
    }
    if let Some(ref path) = cli.check_env {
        return check_env(path);
    }
    if cli.env_help {
        println!("{}", EnvManager::display_env_help());
        return Ok(());
    }

    let config = load_config(cli.clone())?;

    if config.debug {
        eprintln!("{}", display_config_summary(&config));
    }

    if cli.is_one_shot() {
        run_once(&config, &cli).await
    } else {
        run_server(&config).await
    }
}

fn check_env(path: &Path) -> Result<()> {
    let warnings = EnvManager::check_env_file(path)?
        .ok_or_else(|| AppError::config(format!("No env file found at {}", path.display())))?;

    if warnings.is_empty() {
        println!("{}: no problems found", path.display());
        return Ok(());
    }

    for warning in &warnings {
        eprintln!("{}", warning);
    }
    Err(AppError::config(format!(
        "{} invalid entries in {}",
        warnings.len(),
        path.display()
    )))
}

/// Sample the `--url` target once and print the results object to stdout
async fn run_once(config: &Config, cli: &Cli) -> Result<()> {
    let url = cli
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation("--url is required in one-shot mode"))?;

    let factory = LoggerFactory::new(config.clone());
    let logger = factory.create_probe_logger().await;

    let executor = SamplingExecutor::from_config(config, logger)?;
    let results = executor.run(url, cli.sample_count(), config.sample_timeout()).await?;

    println!("{}", serde_json::to_string(&results)?);
    Ok(())
}

async fn run_server(config: &Config) -> Result<()> {
    let factory = LoggerFactory::new(config.clone());
    let logger = factory.create_probe_logger().await;

    let state = AppState::from_config(config, logger)?;
    server::serve(config, state).await
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - BIND_ADDRESS must look like 0.0.0.0:8080");
            eprintln!("  - REQUEST_TIMEOUT_MS must not be shorter than SAMPLE_TIMEOUT_MS");
        }
        AppError::TimedOut => {
            eprintln!();
            eprintln!("Increase the per-sample deadline with --timeout <MS>");
        }
        AppError::UnreachableTarget { .. } => {
            eprintln!();
            eprintln!("The target must answer GET with status 200");
        }
        _ => {}
    }
}

// armtc/src/main.rs
use std::fs;
use std::process;
use std::time::{Duration, Instant};

use armtc_common::config::Config;
use armtc_common::error::{Result, ToolchainError};
use clap::Parser;
use colored::Colorize;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{CliArgs, Command};

fn main() {
    let started = Instant::now();
    let cli_args = CliArgs::parse();

    let config = match Config::load().and_then(|config| cli_args.apply(config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            process::exit(e.exit_code());
        }
    };

    init_logging(&config, cli_args.verbose);

    if let Err(e) = run(&cli_args, &config) {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(e.exit_code());
    }

    let elapsed = Duration::from_secs(started.elapsed().as_secs());
    println!();
    println!("Done in {}", humantime::format_duration(elapsed));
}

fn run(cli_args: &CliArgs, config: &Config) -> Result<()> {
    let command = cli_args.command();
    if cli_args.clean && !matches!(command, Command::Clean(_)) {
        armtc_core::clean(config)?;
    }
    println!("Using prefix: {}", config.dist_dir().display());
    debug!("Running command: {:?}", command);
    command.run(config)
}

fn init_logging(config: &Config, verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let max_log_level = level_filter.into_level().unwrap_or(tracing::Level::INFO);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("ARMTC_LOG")
        .from_env_lossy();

    if verbose == 0 {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
        return;
    }

    let log_dir = config.logs_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!(
            "{} Failed to create log directory {}: {}",
            "Warning:".yellow().bold(),
            log_dir.display(),
            ToolchainError::from(e)
        );
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .without_time()
            .try_init();
        return;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "armtc.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_writer = std::io::stderr.with_max_level(max_log_level);
    let file_writer = non_blocking_appender.with_max_level(max_log_level);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr_writer.and(file_writer))
        .without_time()
        .try_init();

    // Keep guard alive
    Box::leak(Box::new(guard));

    debug!(
        "Verbose logging enabled. Writing logs to: {}/armtc.log",
        log_dir.display()
    );
}

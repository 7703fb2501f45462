//! Schemantic CLI - check JSON schemas and validate documents against them
//!
//! Copyright (c) 2025 Schemantic Team
//! Licensed under the Apache-2.0 license

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    // Configuration is read before logging is set up so its `logging`
    // section can take part; load failures surface again in `run`
    let file_config = Config::load_with_file(cli.config.as_deref()).unwrap_or_default();
    if let Err(e) = init_logging(&cli, &file_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            if !e.is_reported() {
                eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));
            }
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
fn run(cli: Cli) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut config = {
        let _config_timer = Timer::new("config_loading");
        tracing::info!("Loading configuration");
        Config::load_with_file(cli.config.as_deref())?
    };
    config.apply_cli(&cli);

    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);
    let mut output = OutputWriter::new(config.output_format()?, use_color, cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output),
        Commands::Check(args) => handlers::handle_check(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_file(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

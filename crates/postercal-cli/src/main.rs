//! postercal CLI entry point.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use postercal_cli::cli::{Cli, Command, ConfigAction};
use postercal_cli::commands::serve::ServeOverrides;
use postercal_cli::commands::{calendar, config as config_cmd, serve};
use postercal_cli::config::{ClientConfig, resolve_feed_location};
use postercal_cli::error::{ClientError, ClientResult};
use postercal_cli::feed::build_source;
use postercal_core::{OutputFormatter, TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = match cli.command {
        Some(Command::Serve { json_logs, .. }) => TracingConfig::server(json_logs),
        _ => TracingConfig::from_verbosity(cli.verbose),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    match cli.command_or_default() {
        Command::Config { action } => match action {
            ConfigAction::Dump => config_cmd::dump(&config, &config_path),
            ConfigAction::Validate => config_cmd::validate(&config),
            ConfigAction::Path => config_cmd::path(&config_path),
        },
        command => run_feed_command(command, &cli, &config).await,
    }
}

async fn run_feed_command(command: Command, cli: &Cli, config: &ClientConfig) -> ClientResult<()> {
    let location =
        resolve_feed_location(cli.feed_url.as_deref(), cli.file.as_deref(), &config.feed)
            .map_err(ClientError::Config)?;
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.feed.timeout_secs));
    let source = build_source(&location, timeout)?;

    let mut options = config.display.to_format_options();

    match command {
        Command::Show(args) => {
            if args.max_title_length.is_some() {
                options.max_title_length = args.max_title_length;
            }
            let formatter = OutputFormatter::new(options);
            calendar::show(source.as_ref(), &formatter, &args).await
        }
        Command::Events { json } => {
            let formatter = OutputFormatter::new(options);
            calendar::events(source.as_ref(), &formatter, json).await
        }
        Command::Detail { date, title, json } => {
            let formatter = OutputFormatter::new(options);
            calendar::detail(source.as_ref(), &formatter, date, title.as_deref(), json).await
        }
        Command::Serve { bind, max_age, .. } => {
            let server_config =
                serve::server_config(&config.server, ServeOverrides { bind, max_age })?;
            serve::run(server_config, source).await
        }
        Command::Config { .. } => Ok(()),
    }
}

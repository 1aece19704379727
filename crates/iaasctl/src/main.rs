use anyhow::Result;
use clap::Parser;
use iaasctl_core::{Client, Config};
use std::path::PathBuf;
use tracing::{debug, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};
use error::CliError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    if let Err(e) = execute_command(&cli).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "iaasctl=warn,iaasctl_core=warn",
            1 => "iaasctl=info,iaasctl_core=info",
            2 => "iaasctl=debug,iaasctl_core=debug",
            _ => "iaasctl=trace,iaasctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

/// Load configuration from the explicit path or the default location
fn load_config(cli: &Cli) -> Result<(Config, Option<PathBuf>), CliError> {
    match &cli.config_file {
        Some(config_file) => {
            let path = PathBuf::from(config_file);
            debug!("Loading config from explicit path: {:?}", path);
            let mut config = Config::load_from_path(&path)?;
            config.apply_env_overrides();
            Ok((config, Some(path)))
        }
        None => {
            debug!("Loading config from default location");
            Ok((Config::load()?, None))
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<(), CliError> {
    trace!("Executing command: {:?}", cli.command);
    let (config, config_path) = load_config(cli)?;
    let start = std::time::Instant::now();

    let result = match &cli.command {
        Commands::Config(command) => {
            commands::handle_config(
                command,
                &config,
                config_path.as_deref(),
                cli.zone.as_deref(),
                cli.output,
            )
        }
        Commands::Call {
            action,
            params,
            post,
        } => {
            let client = Client::new(config)?;
            commands::handle_call(&client, cli.zone.clone(), action, params, *post, cli.output)
                .await
        }
        Commands::Sign {
            action,
            params,
            post,
            timestamp,
        } => {
            let client = Client::new(config)?;
            commands::handle_sign(
                &client,
                cli.zone.clone(),
                action,
                params,
                *post,
                timestamp.as_deref(),
                cli.output,
            )
        }
        Commands::WaitJob {
            job_id,
            timeout,
            interval,
        } => {
            let client = Client::new(config)?;
            commands::handle_wait_job(
                &client,
                cli.zone.clone(),
                job_id,
                *timeout,
                *interval,
                cli.output,
            )
            .await
        }
    };

    info!("Command finished in {:?}", start.elapsed());
    result
}

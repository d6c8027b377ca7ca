use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

use adapter_config::{AdapterConfig, ConfigError, TelemetryConfig};
use clap::{Parser, Subcommand};
use messaging_templates::{DocumentError, OutboundTemplate, TemplateDocument};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "messaging-templates")]
#[command(about = "Render Skype message templates and check adapter configs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a template document and print the wire message.
    Render {
        #[arg(long, value_name = "TEMPLATE_JSON")]
        template: PathBuf,
        /// Print on one line instead of pretty-printing.
        #[arg(long)]
        compact: bool,
    },
    /// Validate an adapter config file and print it with secrets redacted.
    Config {
        #[arg(long, value_name = "CONFIG_JSON")]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    };
    process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render { template, compact } => {
            init_tracing(TelemetryConfig::from_env().log_filter.as_deref());
            handle_render(&template, compact)
        }
        Command::Config { file } => {
            let config = load_config(&file)?;
            init_tracing(config.telemetry.log_filter.as_deref());
            info!(path = %file.display(), "adapter config is valid");
            print_json(&config.redacted(), false)
        }
    }
}

fn handle_render(path: &Path, compact: bool) -> Result<(), CliError> {
    let raw =
        fs::read_to_string(path).map_err(|err| CliError::TemplateFile(path.to_path_buf(), err))?;
    let document = TemplateDocument::from_json_str(&raw)
        .map_err(|err| CliError::Template(path.to_path_buf(), err))?;
    let template = document
        .build()
        .map_err(|err| CliError::Template(path.to_path_buf(), err))?;
    debug!(path = %path.display(), "template built");
    print_json(&template.get(), compact)
}

fn load_config(path: &Path) -> Result<AdapterConfig, CliError> {
    let raw =
        fs::read_to_string(path).map_err(|err| CliError::ConfigFile(path.to_path_buf(), err))?;
    AdapterConfig::from_json_str(&raw).map_err(|err| CliError::Config(path.to_path_buf(), err))
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr so stdout
/// stays pure JSON.
fn init_tracing(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<(), CliError> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .map_err(|err| CliError::Output(err.into()))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").map_err(|err| CliError::Output(err.into()))
}

#[derive(Debug, Error)]
enum CliError {
    #[error("template file failed ({0}): {1}")]
    TemplateFile(PathBuf, #[source] io::Error),
    #[error("template rejected ({0}): {1}")]
    Template(PathBuf, #[source] DocumentError),
    #[error("config file failed ({0}): {1}")]
    ConfigFile(PathBuf, #[source] io::Error),
    #[error("config rejected ({0}): {1}")]
    Config(PathBuf, #[source] ConfigError),
    #[error("failed to write output: {0}")]
    Output(#[source] anyhow::Error),
}

//! generate typescript types from the targets declared in a config file
//!
//! ```text
//! recodegen [--config <path>] [-v|--version] [--verbose]
//! ```

use clap::Parser;
use recodegen::{Codegen, CodegenConfig, WriteOutcome, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_LOG_LEVEL: tracing::Level = tracing::Level::INFO;

#[derive(Debug, Parser)]
#[command(version, about, disable_version_flag = true)]
struct Cli {
    /// path to the json config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// print the version and exit
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// log at debug level
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logger(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.is_parse_error() {
                tracing::error!("invalid graphql: {err}");
            } else {
                tracing::error!("codegen failed: {err}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> recodegen::Result<()> {
    let config = CodegenConfig::load(&cli.config)?;
    let root = cli
        .config
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let reports = Codegen::new(config, root).run()?;
    let written = reports
        .iter()
        .filter(|report| report.outcome == WriteOutcome::Written)
        .count();
    tracing::debug!(targets = reports.len(), written, "done");
    Ok(())
}

fn setup_logger(cli: &Cli) {
    let mut log_level_warnings: Vec<String> = vec![];
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        let env_val = std::env::var("LOG_LEVEL").map(|s| s.trim().to_string());

        match env_val.as_deref() {
            Ok("DEBUG" | "debug") => tracing::Level::DEBUG,
            Ok("INFO" | "info") => tracing::Level::INFO,
            Ok("TRACE" | "trace") => tracing::Level::TRACE,
            Ok("VERBOSE" | "verbose") => tracing::Level::DEBUG,
            Ok(other) => {
                log_level_warnings.push(format!(
                    "invalid `LOG_LEVEL` environment variable value: `{other}`"
                ));
                DEFAULT_LOG_LEVEL
            }
            Err(_) => DEFAULT_LOG_LEVEL,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
    tracing::trace!("initial logging level set to `{log_level}`");

    for warning in log_level_warnings.drain(..) {
        tracing::warn!("{warning}");
    }
}

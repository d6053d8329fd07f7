//! Command line entry point for running a bridge locally.

mod replay;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use xchain_bridge::BridgeConfig;
use xchain_utils::LogFormat;

#[derive(Parser)]
#[command(name = "xchain", about = "Cross-chain bridge toolkit")]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, env = "XCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "XCHAIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format override: "human" or "json".
    #[arg(long, env = "XCHAIN_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a JSON script of calls and print one result line per step.
    Replay {
        /// Script file: a JSON array of steps.
        #[arg(long)]
        script: PathBuf,
    },
    /// Print the persisted bridge state as JSON.
    State,
    /// Print the default configuration as TOML.
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            BridgeConfig::from_toml_file(&path).with_context(|| format!("loading {path}"))?
        }
        None => BridgeConfig::default(),
    };

    let format: LogFormat = cli
        .log_format
        .as_deref()
        .unwrap_or(&config.log_format)
        .parse()?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    xchain_utils::init_logging(format, level);

    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    match cli.command {
        Command::Replay { script } => {
            let raw = std::fs::read_to_string(&script)
                .with_context(|| format!("reading {}", script.display()))?;
            let steps = replay::parse_script(&raw)?;
            let mut out = std::io::stdout().lock();
            let summary = replay::run(&config, steps, &mut out)?;
            tracing::info!(
                committed = summary.committed,
                rejected = summary.rejected,
                "replay finished"
            );
        }
        Command::State => {
            let bridge = replay::open(&config)?;
            println!("{}", serde_json::to_string_pretty(bridge.state())?);
        }
        Command::InitConfig => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

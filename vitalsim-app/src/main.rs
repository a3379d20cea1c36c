use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use vitalsim_schemas::profile::Condition;

mod config;
mod workflow;

use config::AppConfig;
use workflow::{RunArgs, ScenarioArgs};

#[derive(Parser)]
#[command(name = "vitalsim", version, about = "Synthetic pediatric health-event simulator")]
struct Cli {
    /// YAML config file (defaults to ./vitalsim.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose diagnostics on stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate, classify and persist events continuously
    Run {
        #[arg(long)]
        subject: Option<String>,
        /// Seconds between events
        #[arg(long)]
        interval: Option<f64>,
        /// Stop after this many events
        #[arg(long)]
        cycles: Option<u64>,
        #[arg(long)]
        seed: Option<u64>,
        /// Only print the final statistics
        #[arg(long)]
        quiet: bool,
    },
    /// Stream a scripted scenario
    Scenario {
        id: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        events: Option<usize>,
        #[arg(long)]
        interval: Option<f64>,
        /// Do not write the events to history
        #[arg(long)]
        no_save: bool,
    },
    /// List available scenarios
    Scenarios {
        #[arg(long)]
        condition: Option<Condition>,
    },
    /// Show recently persisted events
    History {
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Summarize the state time-series log
    Report {
        #[arg(long)]
        subject: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    println!("--- VitalSim ---");
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            subject,
            interval,
            cycles,
            seed,
            quiet,
        } => {
            let args = RunArgs {
                subject,
                interval,
                cycles,
                seed,
                quiet,
            };
            workflow::run_continuous(&config, args, shutdown_on_ctrl_c()).await?;
        }
        Command::Scenario {
            id,
            subject,
            events,
            interval,
            no_save,
        } => {
            let args = ScenarioArgs {
                id,
                subject,
                events,
                interval,
                no_save,
            };
            workflow::run_scenario(&config, args, shutdown_on_ctrl_c()).await?;
        }
        Command::Scenarios { condition } => workflow::show_scenarios(condition),
        Command::History { subject, limit } => workflow::show_history(&config, subject, limit)?,
        Command::Report { subject } => workflow::report(&config, subject)?,
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("vitalsim=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vitalsim=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A receiver that flips to true on the first Ctrl-C.
fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nStopping after the current event...");
            let _ = tx.send(true);
        }
    });
    rx
}

//! evac-sim - drive the evacuation engine from a config and a step script.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{error, info};

use evac_core::{Engine, EngineConfig};
use site_model::{ObservationPatch, SiteId};

#[derive(Parser)]
#[command(name = "evac-sim", about = "Site risk escalation and evacuation routing simulator")]
struct Cli {
    /// Engine config (TOML)
    #[arg(long, short, default_value = "config/sites.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every site's score and band
    Scores,
    /// Apply a JSON array of steps and print the events of each
    Replay {
        /// Step script (JSON)
        #[arg(long)]
        script: PathBuf,
    },
}

/// Exit status for a config that cannot be loaded (sysexits `EX_CONFIG`).
const EXIT_CONFIG: i32 = 78;

/// One scripted operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Update {
        site: SiteId,
        #[serde(default)]
        patch: ObservationPatch,
    },
    External {
        site: SiteId,
        probability: Option<f64>,
    },
    Confirm {},
    Reset {},
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evac_core=info,site_model=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut engine = match EngineConfig::load(&cli.config).and_then(Engine::new) {
        Ok(engine) => engine,
        Err(err) if err.is_config_error() => {
            error!(config = %cli.config.display(), error = %err, "invalid configuration");
            std::process::exit(EXIT_CONFIG);
        }
        Err(err) => return Err(err).context("building engine"),
    };

    match cli.command {
        Commands::Scores => {
            for report in engine.site_report() {
                println!(
                    "{:<12} sri={:>5.2} effective={:>5.2} band={}",
                    report.site, report.risk.sri, report.effective_score, report.band
                );
            }
        }
        Commands::Replay { script } => {
            let content = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps: Vec<Step> = serde_json::from_str(&content).context("parsing script")?;
            info!(steps = steps.len(), "replaying script");

            for (n, step) in steps.into_iter().enumerate() {
                let events = match step {
                    Step::Update { site, patch } => engine.update(&site, &patch),
                    Step::External { site, probability } => {
                        engine.set_external_probability(&site, probability)
                    }
                    Step::Confirm {} => engine.confirm_hop(),
                    Step::Reset {} => Ok(engine.reset()),
                }
                .with_context(|| format!("step {}", n))?;

                println!("{}", serde_json::json!({ "step": n, "events": events }));
            }

            println!("{}", serde_json::to_string_pretty(&engine.view())?);
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use crashsim_autopilot::{run_realtime, run_virtual, Config};
use std::{path::PathBuf, str::FromStr};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play the crash round engine with an auto-cashout strategy.")]
struct Args {
    /// YAML session config (see config.example.yaml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wagered rounds to play.
    #[arg(long)]
    rounds: Option<u64>,

    /// Stake per round, in whole units.
    #[arg(long)]
    stake: Option<f64>,

    /// Auto-cashout multiplier.
    #[arg(long)]
    threshold: Option<f64>,

    /// Seed for the outcome source.
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock speed-up factor.
    #[arg(long)]
    time_scale: Option<f64>,

    /// Run on simulated time instead of wall-clock timers.
    #[arg(long = "virtual")]
    virtual_time: bool,

    #[arg(long)]
    log_level: Option<String>,

    /// Emit structured JSON logs.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(stake) = self.stake {
            config.stake = stake;
        }
        if let Some(threshold) = self.threshold {
            config.cashout_threshold = threshold;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(time_scale) = self.time_scale {
            config.time_scale = time_scale;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        config.virtual_time |= self.virtual_time;
        Ok((config, self.json))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments
    let (config, json) = Args::parse().into_config()?;

    // Setup logging
    let level = Level::from_str(&config.log_level)
        .with_context(|| format!("invalid log level {}", config.log_level))?;
    if json {
        tracing_subscriber::fmt().json().with_max_level(level).init();
    } else {
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    // Play
    let summary = if config.virtual_time {
        run_virtual(&config)?
    } else {
        run_realtime(&config).await?
    };
    info!(
        rounds = summary.rounds,
        balance = summary.balance,
        actual_edge = summary.actual_house_edge_percent,
        expected_edge = summary.expected_house_edge_percent,
        "session complete"
    );

    // Report
    let report = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
    println!("{report}");
    Ok(())
}

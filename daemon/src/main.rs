//! Rebase daemon: entry point for running the two-chain ledger.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use rebase_ledger::accrual;
use rebase_node::{ChainNode, NodeConfig, NodeStatus, Relay, ShutdownController};
use rebase_nullables::{NullClock, NullReserve};
use rebase_types::{AccountId, Amount, AmountSpec, Rate, Timestamp};
use rebase_utils::{format_duration, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "rebase-daemon", about = "Interest-accruing ledger daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "REBASE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "REBASE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "REBASE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Relay finality delay in milliseconds.
    #[arg(long, env = "REBASE_FINALITY_DELAY_MS")]
    finality_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a deposit → accrue → bridge → accrue → redeem scenario across two
    /// chains on a simulated clock, then print both chains' status as JSON.
    Simulate {
        /// Reserve deposited on the source chain, in whole tokens.
        #[arg(long, default_value_t = 1_000)]
        deposit: u128,

        /// Tokens bridged to the remote chain, in whole tokens.
        #[arg(long, default_value_t = 400)]
        bridge: u128,

        /// Simulated hours between each step.
        #[arg(long, default_value_t = 24)]
        hours: u64,

        /// Lower the source chain's global rate to this value after the
        /// deposit (1e-18 per second).
        #[arg(long)]
        rate_cut: Option<u128>,

        /// Print Prometheus metrics for both chains after the run.
        #[arg(long)]
        metrics: bool,
    },

    /// Project a balance forward without touching any ledger.
    Project {
        /// Principal in raw units.
        #[arg(long)]
        principal: u128,

        /// Rate in 1e-18 per second (defaults to the initial global rate).
        #[arg(long)]
        rate: Option<u128>,

        /// Seconds to project.
        #[arg(long)]
        seconds: u64,
    },

    /// Print the effective configuration as TOML.
    Config,
}

/// Printed at the end of `simulate`.
#[derive(Serialize)]
struct SimulationReport {
    source: NodeStatus,
    destination: NodeStatus,
    bridged_rate: Rate,
    redeemed: Option<Amount>,
}

fn parse_log_format(s: &str) -> LogFormat {
    match s.to_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Human,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            NodeConfig::from_toml_file(path_str)
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => NodeConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = parse_log_format(format);
    }
    if let Some(delay) = cli.finality_delay_ms {
        config.finality_delay_ms = delay;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Simulate {
            deposit,
            bridge,
            hours,
            rate_cut,
            metrics,
        } => simulate(config, deposit, bridge, hours, rate_cut, metrics).await?,
        Command::Project {
            principal,
            rate,
            seconds,
        } => {
            let rate = Rate::new(rate.unwrap_or(u128::from(config.initial_global_rate)));
            let projected = accrual::effective_balance(Amount::new(principal), rate, seconds)
                .context("projection overflowed")?;
            println!(
                "{}",
                serde_json::json!({
                    "principal": principal.to_string(),
                    "rate": rate.raw().to_string(),
                    "elapsed": format_duration(seconds),
                    "effective_balance": projected.raw().to_string(),
                })
            );
        }
        Command::Config => print!("{}", config.to_toml_string()?),
    }

    Ok(())
}

async fn simulate(
    config: NodeConfig,
    deposit: u128,
    bridge: u128,
    hours: u64,
    rate_cut: Option<u128>,
    show_metrics: bool,
) -> anyhow::Result<()> {
    let step = hours.saturating_mul(3_600);
    let clock = Arc::new(NullClock::new(Timestamp::now().as_secs()));
    let alice = AccountId::new("rbt_alice");
    let bob = AccountId::new("rbt_bob");

    let reserve_a = Arc::new(NullReserve::new());
    reserve_a.fund(&alice, Amount::tokens(deposit));
    let remote_config = config.mirrored(format!("0x{}", "00".repeat(32)));
    let finality_delay = config.finality_delay();

    let source = Arc::new(ChainNode::new(config, clock.clone(), reserve_a.clone())?);
    let dest = Arc::new(ChainNode::new(
        remote_config,
        clock.clone(),
        Arc::new(NullReserve::new()),
    )?);

    let shutdown = Arc::new(ShutdownController::new());
    let signals = {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move { shutdown.wait_for_signal().await })
    };
    let relay = Relay::spawn(Arc::clone(&dest), finality_delay, shutdown.subscribe());

    source.deposit(&alice, Amount::tokens(deposit))?;
    if let Some(rate) = rate_cut {
        let previous = source.set_global_rate(Rate::new(rate))?;
        tracing::info!(%previous, current = rate, "source global rate lowered");
    }

    clock.advance(step);
    tracing::info!(elapsed = %format_duration(step), balance = %source.balance_of(&alice)?, "accrued on source");

    let message = source.lock(&alice, bob.as_str(), Amount::tokens(bridge))?;
    relay.send(message).await?;
    let report = relay.finish().await?;
    tracing::info!(
        delivered = report.delivered.len(),
        failed = report.failed.len(),
        undelivered = report.undelivered,
        "relay finished"
    );

    clock.advance(step);
    tracing::info!(elapsed = %format_duration(step), balance = %dest.balance_of(&bob)?, "accrued on destination");

    // Accrued interest is not backed by custody, so only the remaining
    // deposited principal can be redeemed against this reserve.
    let remaining = Amount::tokens(deposit.saturating_sub(bridge));
    let redeemed = if remaining.is_zero() {
        None
    } else {
        match source.redeem(&alice, AmountSpec::Exact(remaining)) {
            Ok(amount) => {
                tracing::info!(%amount, "source holder redeemed");
                Some(amount)
            }
            Err(e) => {
                tracing::warn!(error = %e, "source redemption failed");
                None
            }
        }
    };

    let report = SimulationReport {
        source: source.status()?,
        destination: dest.status()?,
        bridged_rate: dest.get_rate(&bob)?,
        redeemed,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    if show_metrics {
        print!("{}", source.metrics().encode()?);
        print!("{}", dest.metrics().encode()?);
    }

    signals.abort();
    tracing::info!("simulation finished");
    Ok(())
}

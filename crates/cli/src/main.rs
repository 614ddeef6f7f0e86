//! pf-replay CLI
//!
//! A command-line front end for the deterministic provable-fairness replay
//! engine.
//!
//! # Commands
//!
//! - `scan` - scan a nonce range for metrics matching a predicate
//! - `verify` - evaluate a single nonce and print full details
//! - `games` - list registered games
//! - `seed-hash` - print the SHA-256 hex of a server seed

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pf_replay_core::{
    games_list, scan, seed_hash, verify, CancellationToken, EngineConfig, ScanRequest, VerifyRequest,
};

#[derive(Parser)]
#[command(name = "pf-replay")]
#[command(author = "pf-replay contributors")]
#[command(version)]
#[command(about = "Deterministic provable-fairness replay engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Worker thread count (default: number of CPU cores)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Caps nonceEnd - nonceStart for any single scan
    #[arg(long, global = true)]
    max_nonce_range: Option<u64>,

    /// Default scan deadline in milliseconds, used when --timeout-ms is 0
    #[arg(long, global = true)]
    default_timeout_ms: Option<u64>,

    /// Upper bound on hits returned even when --limit asks for more
    #[arg(long, global = true)]
    max_hit_limit: Option<u64>,

    /// Suppress informational logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a nonce range for metrics matching a predicate
    Scan {
        /// Game id: limbo, dice, or roulette
        #[arg(long)]
        game: String,

        /// Server seed (opaque ASCII, never hex-decoded)
        #[arg(long)]
        server: String,

        /// Client seed
        #[arg(long)]
        client: String,

        /// Inclusive start of the nonce range
        #[arg(long)]
        nonce_start: u64,

        /// Exclusive end of the nonce range
        #[arg(long)]
        nonce_end: u64,

        /// Game-specific parameter as key=value; repeatable
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Predicate operator: ge, gt, eq, le, lt, between, outside
        #[arg(long)]
        op: String,

        /// Predicate comparison value
        #[arg(long)]
        val: f64,

        /// Second comparison value, required for between/outside
        #[arg(long)]
        val2: Option<f64>,

        /// Predicate tolerance; defaults per game if omitted
        #[arg(long)]
        tolerance: Option<f64>,

        /// Maximum hits to return (0 = unlimited, subject to --max-hit-limit)
        #[arg(long, default_value_t = 0)]
        limit: u64,

        /// Scan deadline in milliseconds (0 = use --default-timeout-ms)
        #[arg(long, default_value_t = 0)]
        timeout_ms: u64,
    },

    /// Evaluate a single nonce and print the full game details
    Verify {
        #[arg(long)]
        game: String,

        #[arg(long)]
        server: String,

        #[arg(long)]
        client: String,

        #[arg(long)]
        nonce: u64,

        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// List every registered game
    Games,

    /// Print SHA-256(server_seed) as hex, without disclosing the seed
    SeedHash {
        #[arg(long)]
        server: String,
    },
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected key=value, got `{raw}`")),
    }
}

fn build_config(cli: &Cli) -> EngineConfig {
    let mut config = EngineConfig::default();
    if let Some(workers) = cli.workers {
        config = config.with_max_workers(workers);
    }
    if let Some(max_nonce_range) = cli.max_nonce_range {
        config = config.with_max_nonce_range(max_nonce_range);
    }
    if let Some(ms) = cli.default_timeout_ms {
        config = config.with_default_timeout(Duration::from_millis(ms));
    }
    if let Some(max_hit_limit) = cli.max_hit_limit {
        config = config.with_max_hit_limit(max_hit_limit);
    }
    config
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = build_config(&cli);

    let result = match &cli.command {
        Commands::Scan {
            game,
            server,
            client,
            nonce_start,
            nonce_end,
            params,
            op,
            val,
            val2,
            tolerance,
            limit,
            timeout_ms,
        } => cmd_scan(
            &config, game, server, client, *nonce_start, *nonce_end, params, op, *val, *val2,
            *tolerance, *limit, *timeout_ms,
        ),
        Commands::Verify {
            game,
            server,
            client,
            nonce,
            params,
        } => cmd_verify(game, server, client, *nonce, params),
        Commands::Games => cmd_games(),
        Commands::SeedHash { server } => cmd_seed_hash(server),
    };

    if let Err(err) = &result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn cmd_scan(
    config: &EngineConfig,
    game: &str,
    server: &str,
    client: &str,
    nonce_start: u64,
    nonce_end: u64,
    params: &[(String, String)],
    op: &str,
    val: f64,
    val2: Option<f64>,
    tolerance: Option<f64>,
    limit: u64,
    timeout_ms: u64,
) -> Result<()> {
    let request = ScanRequest {
        game: game.to_string(),
        server_seed: server.to_string(),
        client_seed: client.to_string(),
        nonce_start,
        nonce_end,
        params: params.iter().cloned().collect::<BTreeMap<_, _>>(),
        target_op: op.to_string(),
        target_val: val,
        target_val2: val2,
        tolerance,
        limit,
        timeout_ms,
    };

    // No standing cancellation mechanism is wired up at the CLI's outer
    // surface yet; a fresh, never-cancelled token is threaded through so
    // library callers that do have one (e.g. a future signal handler) use
    // the same path.
    let cancellation = CancellationToken::new();
    let result = scan(&request, config, &cancellation).context("scan failed")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_verify(game: &str, server: &str, client: &str, nonce: u64, params: &[(String, String)]) -> Result<()> {
    let request = VerifyRequest {
        game: game.to_string(),
        server_seed: server.to_string(),
        client_seed: client.to_string(),
        nonce,
        params: params.iter().cloned().collect::<BTreeMap<_, _>>(),
    };

    let result = verify(&request).context("verify failed")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_games() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&games_list())?);
    Ok(())
}

fn cmd_seed_hash(server: &str) -> Result<()> {
    if server.is_empty() {
        bail!("server seed must not be empty");
    }
    println!("{}", seed_hash(server.as_bytes()));
    Ok(())
}

//! TradeScore CLI: score trades and inspect the scoring catalog.
//!
//! Commands:
//! - `score`: score one trade request (JSON file) and print the result
//! - `batch`: score a JSONL file of requests in parallel, as JSONL or CSV
//! - `catalog show`: print the effective catalog as TOML
//! - `catalog check`: validate a catalog config and print its fingerprint

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tradescore_core::{Catalog, FinalScoreResult, ScoreRequest, ScoringEngine};

#[derive(Parser)]
#[command(
    name = "tradescore",
    about = "TradeScore CLI: 100-point trade quality scoring"
)]
struct Cli {
    /// Catalog config (TOML). Defaults to the built-in catalog.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `tradescore_core=debug`. Falls back to RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single trade request.
    Score {
        /// JSON file holding one request: trade, indicators, history, params.
        #[arg(long)]
        request: PathBuf,

        /// Print compact JSON instead of pretty JSON.
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
    /// Score many requests in parallel.
    Batch {
        /// JSONL file, one request per line.
        #[arg(long)]
        requests: PathBuf,

        /// Write a CSV summary instead of JSONL results.
        #[arg(long, default_value_t = false)]
        csv: bool,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Catalog inspection commands.
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Print the effective catalog as TOML.
    Show,
    /// Validate the catalog config given by `--config` and print its fingerprint.
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Score { request, compact } => {
            let engine = load_engine(cli.config.as_deref())?;
            run_score(&engine, &request, compact)
        }
        Commands::Batch {
            requests,
            csv,
            output,
        } => {
            let engine = load_engine(cli.config.as_deref())?;
            run_batch(&engine, &requests, csv, output.as_deref())
        }
        Commands::Catalog { action } => match action {
            CatalogAction::Show => {
                let catalog = load_catalog(cli.config.as_deref())?;
                print!("{}", catalog.to_config().to_toml()?);
                println!("# fingerprint: {}", catalog.fingerprint());
                Ok(())
            }
            CatalogAction::Check => {
                let Some(config) = cli.config else {
                    bail!("catalog check needs --config <toml>");
                };
                let catalog = Catalog::from_file(&config)
                    .with_context(|| format!("Invalid catalog config {}", config.display()))?;
                println!("OK {}", catalog.fingerprint());
                Ok(())
            }
        },
    }
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let env = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(level, env.as_deref())?)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// `--log-level` wins and must parse; an unusable `RUST_LOG` falls back to `warn`.
fn log_filter(flag: Option<&str>, env: Option<&str>) -> Result<EnvFilter> {
    match (flag, env) {
        (Some(directives), _) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid --log-level '{directives}'")),
        (None, Some(directives)) => {
            Ok(EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("warn")))
        }
        (None, None) => Ok(EnvFilter::new("warn")),
    }
}

fn load_catalog(config: Option<&Path>) -> Result<Catalog> {
    let catalog = match config {
        Some(path) => Catalog::from_file(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => Catalog::builtin()?,
    };
    Ok(catalog)
}

fn load_engine(config: Option<&Path>) -> Result<ScoringEngine> {
    Ok(ScoringEngine::new(load_catalog(config)?))
}

fn run_score(engine: &ScoringEngine, path: &Path, compact: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))?;
    let request: ScoreRequest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse request {}", path.display()))?;

    let result = engine.score_request(&request)?;
    info!(
        trade = %request.trade.id,
        final_score = result.final_score,
        grade = %result.grade,
        "scored"
    );

    let json = if compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");
    Ok(())
}

/// Input line number, the parsed request, and its score or error.
type Outcome = (usize, Option<ScoreRequest>, Result<FinalScoreResult, String>);

/// One JSONL output line: the result, or why the request failed.
#[derive(Serialize)]
struct BatchLine {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<FinalScoreResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// One CSV summary row.
#[derive(Serialize)]
struct BatchRow {
    line: usize,
    trade_id: String,
    symbol: String,
    strategy: String,
    strategy_score: Option<f64>,
    forbidden_penalty: Option<u32>,
    compliance_score: Option<u32>,
    final_score: Option<f64>,
    grade: String,
    violations: String,
    error: String,
}

fn run_batch(
    engine: &ScoringEngine,
    path: &Path,
    as_csv: bool,
    output: Option<&Path>,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read requests {}", path.display()))?;
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .collect();
    if lines.is_empty() {
        bail!("No requests found in {}", path.display());
    }

    // A bad line is reported in place; it never aborts the batch.
    let outcomes: Vec<Outcome> = lines
        .par_iter()
        .map(|&(line, text)| match serde_json::from_str::<ScoreRequest>(text) {
            Ok(request) => {
                let scored = engine.score_request(&request).map_err(|e| e.to_string());
                (line, Some(request), scored)
            }
            Err(e) => (line, None, Err(format!("parse error: {e}"))),
        })
        .collect();

    let failed = outcomes.iter().filter(|(_, _, r)| r.is_err()).count();
    if failed > 0 {
        warn!(failed, total = outcomes.len(), "some requests could not be scored");
    }
    info!(total = outcomes.len(), failed, "batch scored");

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    if as_csv {
        write_csv(writer, outcomes)
    } else {
        write_jsonl(writer, outcomes)
    }
}

fn write_jsonl(
    mut writer: Box<dyn Write>,
    outcomes: Vec<Outcome>,
) -> Result<()> {
    for (line, _, scored) in outcomes {
        let entry = match scored {
            Ok(result) => BatchLine {
                line,
                result: Some(result),
                error: None,
            },
            Err(error) => BatchLine {
                line,
                result: None,
                error: Some(error),
            },
        };
        writeln!(writer, "{}", serde_json::to_string(&entry)?)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_csv(
    writer: Box<dyn Write>,
    outcomes: Vec<Outcome>,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (line, request, scored) in outcomes {
        let (trade_id, symbol, strategy) = match &request {
            Some(r) => (
                r.trade.id.to_string(),
                r.trade.symbol.clone(),
                r.trade.strategy.to_string(),
            ),
            None => Default::default(),
        };
        let row = match scored {
            Ok(result) => BatchRow {
                line,
                trade_id,
                symbol,
                strategy,
                strategy_score: Some(result.strategy_score),
                forbidden_penalty: Some(result.forbidden_penalty),
                compliance_score: Some(result.compliance_score),
                final_score: Some(result.final_score),
                grade: result.grade.to_string(),
                violations: result
                    .violations
                    .iter()
                    .map(|v| v.rule_code.as_str())
                    .collect::<Vec<_>>()
                    .join(";"),
                error: String::new(),
            },
            Err(error) => BatchRow {
                line,
                trade_id,
                symbol,
                strategy,
                strategy_score: None,
                forbidden_penalty: None,
                compliance_score: None,
                final_score: None,
                grade: String::new(),
                violations: String::new(),
                error,
            },
        };
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

//! scam-risk — classify one artifact from the command line.
//!
//! Prints the presentation hand-off (tier, confidence, details, sources) as
//! JSON on stdout. Ctrl-C cancels the evaluation.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scam_risk_engine::metrics::Metrics;
use scam_risk_engine::{codec, Artifact, ArtifactKind, CancellationToken, EngineConfig, RiskEngine};

#[derive(Parser, Debug)]
#[command(name = "scam-risk")]
#[command(about = "Classify a URL, message or contact as dangerous, suspicious or benign")]
struct Args {
    /// Artifact kind: url, message or contact
    kind: ArtifactKind,

    /// The URL, message text or contact handle
    value: String,

    /// Engine config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-source timeout in milliseconds (overrides the config)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Pretty-print the hand-off JSON
    #[arg(long)]
    pretty: bool,

    /// Print Prometheus metrics to stderr after the evaluation
    #[arg(long)]
    print_metrics: bool,
}

/// Compact logs on stderr; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scam_risk_engine=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "scam-risk failed");
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let metrics = if args.print_metrics {
        Some(Metrics::init()?)
    } else {
        None
    };

    let cfg = EngineConfig::load(args.config.as_deref()).context("loading engine config")?;
    let mut engine = RiskEngine::from_config(&cfg);
    if let Some(ms) = args.timeout_ms {
        engine = engine.timeout(Duration::from_millis(ms.max(1)));
    }

    let artifact = Artifact::new(args.kind, &args.value);
    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    let outcome = engine.evaluate(&artifact, &token).await;

    if let Some(m) = &metrics {
        eprintln!("{}", m.render());
    }

    match outcome {
        Ok(verdict) => {
            let handoff = codec::encode(&verdict);
            let out = if args.pretty {
                handoff.to_json_pretty()
            } else {
                handoff.to_json()
            };
            println!("{out}");
            tracing::debug!(route = verdict.tier.route(), "done");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::warn!(error = %e, "no verdict");
            Ok(ExitCode::from(130))
        }
    }
}

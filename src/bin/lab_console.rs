use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use telemetry_lab::drivers::render::FramePacer;
use telemetry_lab::kernel::event::Mode;
use telemetry_lab::{PipelineConfig, PipelineController};

const HELP: &str = "Commands: start <load> | stop | load <n> | mode <normal|power-save> | status | quit";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    // 2. Setup Pipeline + render observer
    let config = PipelineConfig::from_env().context("loading pipeline config")?;
    let controller = Arc::new(PipelineController::new(config)?);
    let token = CancellationToken::new();
    let pacer = FramePacer::new(60).spawn(controller.clone(), token.clone());

    // 3. Result feed printer
    let mut results = controller.subscribe_results();
    let printer = tokio::spawn(async move {
        loop {
            match results.recv().await {
                Ok(record) => println!("[RESULT] {record} mean={:.2} std={:.2}", record.mean, record.stddev),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Result feed lagged, {} records skipped", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // 4. Command loop (stdin)
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let outcome = match (parts.next(), parts.next()) {
            (None, _) => continue,
            (Some("start"), arg) => parse_load(arg, controller.config().default_load)
                .and_then(|load| controller.start(load).map_err(Into::into)),
            (Some("stop"), _) => {
                controller.stop();
                Ok(())
            }
            (Some("load"), arg) => parse_load(arg, controller.state().configured_load)
                .and_then(|load| controller.set_load(load).map_err(Into::into)),
            (Some("mode"), Some(mode)) => mode
                .parse::<Mode>()
                .map(|mode| controller.on_mode_changed(mode))
                .map_err(anyhow::Error::msg),
            (Some("status"), _) => {
                let state = controller.state();
                let snap = controller.snapshot();
                println!(
                    "{:?} mode={:?} load={} frames={} avg={:.1}ms jank={:.1}% dropped={}",
                    controller.status(),
                    state.mode,
                    state.configured_load,
                    snap.total_frames_processed,
                    snap.average_latency_ms,
                    snap.jank_percentage,
                    snap.dropped_units
                );
                Ok(())
            }
            (Some("quit"), _) | (Some("exit"), _) => break,
            _ => {
                println!("{HELP}");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            tracing::error!("Command '{}' failed: {}", line.trim(), e);
        }
    }

    token.cancel();
    let _ = pacer.await;
    controller.shutdown().await;
    printer.abort();
    Ok(())
}

fn parse_load(arg: Option<&str>, fallback: u32) -> Result<u32> {
    match arg {
        Some(raw) => raw.parse().with_context(|| format!("invalid load '{raw}'")),
        None => Ok(fallback),
    }
}

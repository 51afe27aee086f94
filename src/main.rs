use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use telemetry_lab::drivers::mode::{spawn_mode_poller, PowerSaveFlag, DEFAULT_POLL_PERIOD};
use telemetry_lab::drivers::render::FramePacer;
use telemetry_lab::{PipelineConfig, PipelineController};

const DISPLAY_REFRESH_HZ: u32 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let run_for = match std::env::args().nth(1) {
        Some(arg) => Duration::from_secs(arg.parse().with_context(|| format!("invalid seconds '{arg}'"))?),
        None => Duration::from_secs(20),
    };

    // 2. Setup Pipeline
    let config = PipelineConfig::from_env().context("loading pipeline config")?;
    let load = config.default_load;
    let controller = Arc::new(PipelineController::new(config)?);
    tracing::info!("Telemetry lab booting for {}s", run_for.as_secs());

    // 3. Bind external collaborators
    let token = CancellationToken::new();
    let power_save = PowerSaveFlag::new(false);
    let poller = spawn_mode_poller(controller.clone(), power_save.clone(), DEFAULT_POLL_PERIOD, token.clone());
    let pacer = FramePacer::new(DISPLAY_REFRESH_HZ).spawn(controller.clone(), token.clone());

    let mut telemetry = controller.subscribe_telemetry();
    let reporter = {
        let token = token.clone();
        tokio::spawn(async move {
            let mut cadence = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = cadence.tick() => {}
                }
                let snap = telemetry.borrow_and_update().clone();
                tracing::info!(
                    "frames={} latency={}ms avg={:.1}ms jank={:.1}% ({}) dropped={}",
                    snap.total_frames_processed,
                    snap.current_latency_ms,
                    snap.average_latency_ms,
                    snap.jank_percentage,
                    snap.jank_count,
                    snap.dropped_units
                );
            }
        })
    };

    // 4. Run: normal half, power-save half
    controller.start(load)?;
    tokio::time::sleep(run_for / 2).await;
    power_save.set(true);
    tokio::time::sleep(run_for / 2).await;
    controller.stop();

    // 5. Teardown
    token.cancel();
    let _ = tokio::join!(poller, pacer, reporter);
    controller.shutdown().await;

    let summary = serde_json::to_string_pretty(&*controller.snapshot()).context("serializing summary")?;
    println!("{summary}");
    Ok(())
}

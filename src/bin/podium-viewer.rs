//! Passive podium display: follows the winners socket and prints the overlay
//! it would draw as JSON lines on stdout.

use std::{
    fs,
    io::{self, Write},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podium_back::{
    config::AppConfig,
    dto::{phase::ShowcaseStatus, public::ShowcaseResponse},
    services::{
        showcase_runtime::{ShowcaseHandle, ViewerSnapshot},
        viewer_client,
    },
};

#[derive(Parser)]
#[command(name = "podium-viewer")]
#[command(about = "Headless podium display following a winners socket")]
#[command(version)]
struct Cli {
    /// Winners WebSocket of the server
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws/winners")]
    url: String,

    /// JSON config providing themes and carousel size
    #[arg(long)]
    config: Option<String>,

    /// Minimum delay between two animation frames on stdout, in milliseconds
    #[arg(long, default_value_t = 100)]
    frame_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => {
            let contents =
                fs::read_to_string(path).with_context(|| format!("reading config `{path}`"))?;
            AppConfig::from_json(&contents).with_context(|| format!("parsing config `{path}`"))?
        }
        None => AppConfig::default(),
    };

    let (handle, runtime) = ShowcaseHandle::spawn(config.showcase().clone());
    let client = tokio::spawn(viewer_client::run(cli.url.clone(), handle.clone()));
    info!(url = %cli.url, "viewer started");

    let throttle = Duration::from_millis(cli.frame_interval_ms);
    let mut snapshots = handle.watch();
    let mut last_status: Option<ShowcaseStatus> = None;
    let mut last_frame: Option<Instant> = None;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let status = ShowcaseStatus::from(&snapshot.showcase);
                let phase_changed = last_status.as_ref().is_none_or(|last| {
                    last.phase != status.phase || last.revealed_place != status.revealed_place
                });
                let frame_due = last_frame.is_none_or(|at| at.elapsed() >= throttle);
                if phase_changed || frame_due {
                    emit(&snapshot, status.clone())?;
                    last_frame = Some(Instant::now());
                }
                last_status = Some(status);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; shutting down");
                break;
            }
        }
    }

    handle.shutdown();
    client.abort();
    let _ = runtime.await;
    Ok(())
}

fn emit(snapshot: &ViewerSnapshot, status: ShowcaseStatus) -> Result<()> {
    let line = serde_json::to_string(&ShowcaseResponse {
        status,
        overlay: snapshot.overlay.clone(),
    })
    .context("serializing overlay frame")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}").context("writing to stdout")?;
    stdout.flush().context("flushing stdout")
}

fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

use anyhow::Context;
use chroma_seek::core_modules::mask::Mask;
use chroma_seek::core_modules::pixel::pixel::Pixel;
use chroma_seek::core_modules::pointer_actuator::PointerInjector;
use chroma_seek::core_modules::region_capturer::{DisplaySource, RegionCapturer, SyntheticDisplay};
use chroma_seek::core_modules::utils::image_helper::image_helper;
use chroma_seek::{AcquisitionConfig, AcquisitionLoop, TargetMarker, TargetReader, target_slot};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const GREEN: Pixel = Pixel::rgb(0, 255, 0);

/// Runs the acquisition loop until Ctrl-C, logging the target marker whenever it moves.
#[derive(Parser)]
#[command(name = "chroma_seek")]
#[command(about = "Real-time color target acquisition")]
struct Cli {
    /// Use an in-memory display with a drifting green square instead of the screen
    #[arg(long)]
    synthetic: bool,
    /// Capture one region, write it and its segmentation mask as PNGs, then exit
    #[arg(long, value_name = "DIR")]
    dump: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Cli { synthetic, dump } = Cli::parse();
    let config = AcquisitionConfig::from_env()?;

    if synthetic {
        let display = Arc::new(
            SyntheticDisplay::new(1920, 1080, Pixel::rgb(24, 24, 32)).with_rect(900, 480, 24, 24, GREEN),
        );
        if let Some(dir) = dump {
            return dump_once(display, &config, dir);
        }
        let drift = tokio::spawn(drift_square(display.clone()));
        let result = run(display, &config).await;
        drift.abort();
        return result;
    }

    let display = screen_source()?;
    match dump {
        Some(dir) => dump_once(display, &config, dir),
        None => run(display, &config).await,
    }
}

#[cfg(feature = "screen")]
fn screen_source() -> anyhow::Result<chroma_seek::core_modules::screen::ScreenSource> {
    Ok(chroma_seek::core_modules::screen::ScreenSource::primary()?)
}

#[cfg(not(feature = "screen"))]
fn screen_source() -> anyhow::Result<SyntheticDisplay> {
    anyhow::bail!("built without the `screen` feature; pass --synthetic or rebuild with --features screen")
}

#[cfg(feature = "input")]
fn injector() -> anyhow::Result<chroma_seek::core_modules::input::EnigoInjector> {
    Ok(chroma_seek::core_modules::input::EnigoInjector::new()?)
}

#[cfg(not(feature = "input"))]
fn injector() -> anyhow::Result<chroma_seek::core_modules::pointer_actuator::NoopInjector> {
    Ok(chroma_seek::core_modules::pointer_actuator::NoopInjector)
}

async fn run<S: DisplaySource + 'static>(display: S, config: &AcquisitionConfig) -> anyhow::Result<()> {
    let injector = injector()?;
    if config.auto_move.enabled && !cfg!(feature = "input") {
        tracing::warn!("auto-move enabled but built without the `input` feature; moves are discarded");
    }
    start(display, injector, config).await
}

async fn start<S, I>(display: S, injector: I, config: &AcquisitionConfig) -> anyhow::Result<()>
where
    S: DisplaySource + 'static,
    I: PointerInjector + 'static,
{
    let (publisher, reader) = target_slot();
    let handle = AcquisitionLoop::new(display, injector, publisher, config.clone()).spawn();
    let consumer = tokio::spawn(log_markers(reader, config.marker_size));

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    tracing::info!("shutting down");

    let summary = handle.shutdown().await?;
    consumer.await.ok();
    tracing::info!(
        cycles = summary.cycles,
        detections = summary.detections,
        capture_failures = summary.capture_failures,
        moves = summary.moves,
        injection_failures = summary.injection_failures,
        "acquisition summary"
    );
    Ok(())
}

/// Headless stand-in for an overlay: logs the marker each time it changes.
async fn log_markers(mut reader: TargetReader, marker_size: f32) {
    let mut last = None;
    while let Some(target) = reader.next().await {
        let marker = TargetMarker::for_target(&target, marker_size);
        if marker == last {
            continue;
        }
        match marker {
            Some(marker) => tracing::info!(
                x = target.x,
                y = target.y,
                top_left = ?marker.top_left,
                bottom_right = ?marker.bottom_right,
                "target acquired"
            ),
            None => tracing::info!("target lost"),
        }
        last = marker;
    }
}

fn dump_once<S: DisplaySource>(display: S, config: &AcquisitionConfig, dir: PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let capture = RegionCapturer::new(display).try_capture(config.radius)?;
    let mask = Mask::from_buffer(&capture.buffer, &config.color_range);

    let buffer_path = dir.join("capture.png");
    let mask_path = dir.join("mask.png");
    image_helper::save_buffer(&buffer_path, &capture.buffer)?;
    image_helper::save_mask(&mask_path, &mask)?;
    tracing::info!(
        origin = ?capture.origin(),
        matched = mask.count(),
        buffer = %buffer_path.display(),
        mask = %mask_path.display(),
        "debug dump written"
    );
    Ok(())
}

/// Moves a green square around the synthetic display, vanishing now and then.
async fn drift_square(display: Arc<SyntheticDisplay>) {
    let mut tick: i32 = 0;
    loop {
        display.clear();
        if tick % 40 < 30 {
            let x = 900 + (tick % 30) * 4;
            let y = 480 + (tick % 20) * 3;
            display.add_rect(x, y, 24, 24, GREEN);
        }
        tick = tick.wrapping_add(1);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

//! Binary entrypoint for fbframe.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use fbframe::config::{self, TransitionEffect};
use fbframe::engine::{DisplayBackend, FramebufferEngine};
use fbframe::source::{self, SourceOptions};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "fbframe", about = "Framebuffer-backed photo frame")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Override per-photo dwell time (seconds)
    #[arg(long, value_name = "SECONDS")]
    interval: Option<u64>,

    /// Override the transition effect (fade or cut)
    #[arg(long, value_name = "EFFECT")]
    transition: Option<String>,

    /// Disable shuffling
    #[arg(long, action = ArgAction::SetTrue)]
    no_shuffle: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("fbframe={}", level).parse().unwrap());
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = config::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Command-line options override the config file values.
    if let Some(secs) = cli.interval {
        cfg.slideshow_interval = Duration::from_secs(secs);
    }
    if let Some(effect) = cli.transition.as_deref() {
        cfg.transition.effect = match effect {
            "fade" => TransitionEffect::Fade,
            "cut" => TransitionEffect::Cut,
            other => bail!("unknown transition effect {other:?} (expected fade or cut)"),
        };
    }
    if cli.no_shuffle {
        cfg.shuffle = false;
    }
    cfg.validate().context("validating configuration")?;

    let cancel = CancellationToken::new();
    let mut engine = FramebufferEngine::new(&cfg, cancel.clone());
    engine
        .initialize()
        .context("initializing framebuffer display")?;
    engine.show_splash();

    let photos = source::scan(&cfg.photo_dirs)?;
    info!(count = photos.len(), "scanned photos");
    engine.set_photos(photos.clone());

    let mailbox = engine.photo_updates();
    let source_task = tokio::task::spawn_blocking({
        let opts = SourceOptions {
            roots: cfg.photo_dirs.clone(),
            poll_interval: cfg.rescan_interval,
        };
        let cancel = cancel.clone();
        move || source::run(mailbox, opts, Some(photos), cancel)
    });

    let mut show = tokio::task::spawn_blocking(move || {
        let result = engine.run_slideshow();
        engine.shutdown();
        result
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            cancel.cancel();
        }
        res = &mut show => {
            cancel.cancel();
            res.context("render thread panicked")??;
            let _ = source_task.await;
            info!("slideshow stopped");
            return Ok(());
        }
    }

    show.await.context("render thread panicked")??;
    let _ = source_task.await;
    info!("slideshow stopped");
    Ok(())
}

use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use emulog::config::{self, LogConfig};
use emulog::logging::{LogHost, LogLevel, LogManager, LogType, WorkerNameGuard};
use emulog::{debug_log, info_log, notice_log, warn_log};

/// Route the core's own diagnostics to stderr
fn init_diagnostics() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "emulog=info".into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

/// Emulated CPU thread: logs under its own worker name
fn run_worker(manager: Arc<LogManager>) {
    let _name = WorkerNameGuard::new("cpu");
    for frame in 0..3 {
        debug_log!(manager, LogType::Cpu, "frame {} executed", frame);
    }
    warn_log!(manager, LogType::Jit, "block cache flushed");
}

fn main() -> Result<()> {
    init_diagnostics();

    // Ensure config directory exists (creates logs dir too)
    config::ensure_directories()?;

    let mut config = LogConfig::load()?;
    let debug_levels = std::env::args().any(|arg| arg == "--debug-log");

    let mut host = LogHost::new();
    let manager = host.init(&config);
    if debug_levels {
        manager.set_all_levels(LogLevel::Debug);
    }

    if let Some(file) = manager.file_sink() {
        tracing::info!("Logging to: {}", file.path().display());
    }
    notice_log!(manager, LogType::System, "emulog {}", env!("CARGO_PKG_VERSION"));
    info_log!(manager, LogType::Boot, "{} channels registered", manager.channels().len());

    let worker = {
        let manager = Arc::clone(&manager);
        thread::Builder::new()
            .name("emu-cpu".into())
            .spawn(move || run_worker(manager))
            .context("Failed to spawn worker thread")?
    };
    worker
        .join()
        .map_err(|_| anyhow!("Worker thread panicked"))?;

    let ring = manager.ring_buffer();
    println!(
        "-- {} of {} records in scrollback --",
        ring.len(),
        ring.total_count()
    );
    for entry in ring.entries() {
        print!("{} {}", entry.level.glyph(), entry.msg);
    }

    manager.save_config(&mut config.channels);
    config.save()?;

    host.shutdown();
    Ok(())
}

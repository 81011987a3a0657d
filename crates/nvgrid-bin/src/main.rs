//! nvgrid entrypoint.
use anyhow::Result;
use clap::Parser;
use core_config::{Settings, load_from};
use core_events::{Event, EventSourceRegistry, NoopEventHooks};
use core_input::KeyTranslator;
use core_session::{DispatchStats, Session, SessionOptions, run};
use core_transport::{BatchSource, TraceReplay};
use std::io::Write;
use std::path::Path;
use std::sync::Once;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod cli;
mod dump;

use cli::{Args, Command};
use dump::ReplaySurface;

const LOG_FILE: &str = "nvgrid.log";

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReplayReport {
    stats: DispatchStats,
    repaints: u64,
    full_repaints: u64,
    stopped: bool,
}

impl ReplayReport {
    fn summary_line(&self) -> String {
        format!(
            "batches={} events={} unknown={} malformed={} repaints={} full={}",
            self.stats.batches,
            self.stats.events,
            self.stats.unknown,
            self.stats.malformed,
            self.repaints,
            self.full_repaints
        )
    }
}

/// Replay `trace` into a fresh session and write its final grid to `out`.
async fn replay<W: Write>(
    settings: &Settings,
    trace: &Path,
    ansi: bool,
    out: &mut W,
) -> Result<ReplayReport> {
    let source = TraceReplay::open(trace).await?;
    let mut registry = EventSourceRegistry::new();
    registry.register(BatchSource::new("trace", source));

    let (tx, mut rx) = mpsc::channel::<Event>(settings.queue_capacity);
    let handles = registry.spawn_all(&tx);
    drop(tx);

    let mut session = Session::new(SessionOptions::from_settings(settings));
    let mut surface = ReplaySurface::default();
    let summary = run(&mut session, &mut rx, &mut surface, &NoopEventHooks).await;
    // The reader may be parked on a full channel once the loop stops early.
    drop(rx);
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(target: "runtime", error = %e, "event_source_join_failed");
        }
    }

    if ansi {
        dump::ansi(&session, out)?;
    } else {
        out.write_all(dump::plain(&session).as_bytes())?;
    }
    let report = ReplayReport {
        stats: session.stats(),
        repaints: surface.repaints,
        full_repaints: surface.full_repaints,
        stopped: summary.stopped,
    };
    info!(
        target: "runtime",
        batches = report.stats.batches,
        unknown = report.stats.unknown,
        malformed = report.stats.malformed,
        repaints = report.repaints,
        "replay_finished"
    );
    Ok(report)
}

fn keys(settings: &Settings, key: &str, text: Option<&str>, mods: &str) -> Result<String> {
    let input = cli::key_input(key, text, mods)?;
    Ok(KeyTranslator::new(settings.platform).translate(&input))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let settings = config.settings();
    info!(
        target: "runtime.startup",
        config_override = args.config.is_some(),
        config_loaded = config.path.is_some(),
        platform = settings.platform.as_str(),
        "bootstrap_complete"
    );

    match args.command {
        Command::Replay { trace, ansi } => {
            let mut stdout = std::io::stdout().lock();
            let report = replay(&settings, &trace, ansi, &mut stdout).await?;
            writeln!(stdout, "{}", report.summary_line())?;
        }
        Command::Keys { key, text, mods } => {
            let notation = keys(&settings, &key, text.as_deref(), &mods)?;
            if notation.is_empty() {
                println!("(suppressed)");
            } else {
                println!("{notation}");
            }
        }
    }
    Ok(())
}

use std::fs;
use std::sync::Arc;

use anyhow::Context;
use crossbeam_channel::unbounded;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use spat_bridge::error::AppResult;
use spat_bridge::registry::RegistryTables;
use spat_bridge::sinks::{OscPlaybackSink, OscSpatialSink};
use spat_bridge::{Config, Dispatcher, OscListener, SoundRegistry};

/// Batches between periodic stats reports in live mode
const REPORT_EVERY_BATCHES: u64 = 500;

fn main() {
    println!("===========================================");
    println!("  spat-bridge - OSC sound event router");
    println!("===========================================\n");

    if let Err(err) = run() {
        eprintln!("✗ {err:#}");
        std::process::exit(1);
    }
}

fn run() -> AppResult<()> {
    let config = Config::load()
        .with_context(|| format!("config file: {}", Config::config_path_display()))?;
    println!("✓ Configuration loaded");
    println!("  Listening on:    {}", config.listen_addr);
    println!("  Spatial sink:    {}", config.spatial_addr);
    println!("  Playback sink:   {}\n", config.playback_addr);

    let _log_guard = init_logging(&config);

    let registry = build_registry(&config)?;
    tracing::info!("Registry holds {} sound identifiers", registry.len());

    let spatial = OscSpatialSink::new(&config.spatial_addr)
        .with_context(|| format!("spatial sink at {}", config.spatial_addr))?;
    let playback = OscPlaybackSink::new(&config.playback_addr)
        .with_context(|| format!("playback sink at {}", config.playback_addr))?;

    let mut dispatcher = Dispatcher::new(registry, Arc::new(spatial), Arc::new(playback));

    if config.stop_players_on_start {
        dispatcher.stop_all_players();
    }

    // Replay mode: drain one batch from a file instead of the network.
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 && args[1] == "--replay" {
        return replay(&mut dispatcher, &args[2]);
    }

    let listener = OscListener::bind(&config.listen_addr)
        .with_context(|| format!("listener on {}", config.listen_addr))?;
    tracing::info!("Listening for OSC on {}", config.listen_addr);

    let (tx, rx) = unbounded();
    let _listener_thread = listener.spawn(tx);

    let mut batches: u64 = 0;
    while let Ok(batch) = rx.recv() {
        dispatcher.process_batch(&batch);

        batches += 1;
        if batches % REPORT_EVERY_BATCHES == 0 {
            dispatcher.stats().report();
        }
    }

    dispatcher.stats().report();
    Ok(())
}

/// Process newline-delimited records from a file, then report and exit
fn replay(dispatcher: &mut Dispatcher, path: &str) -> AppResult<()> {
    let content = fs::read_to_string(path).with_context(|| format!("replay file: {path}"))?;

    let records: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    tracing::info!("Replaying {} records from {path}", records.len());

    dispatcher.process_batch(records);
    dispatcher.stats().report();
    Ok(())
}

fn build_registry(config: &Config) -> AppResult<SoundRegistry> {
    let tables = match &config.registry_path {
        Some(path) => {
            let tables = RegistryTables::load(path)?;
            tracing::info!("Loaded registry tables from {}", path.display());
            tables
        }
        None => RegistryTables::default(),
    };

    Ok(SoundRegistry::from_tables(tables)?)
}

/// Console logging always; daily-rotating file log when configured.
/// The returned guard must stay alive for the file writer to flush.
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "spat-bridge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            base.with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
            Some(guard)
        }
        None => {
            base.init();
            None
        }
    }
}

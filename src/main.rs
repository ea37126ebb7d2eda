//! Viewer State - headless driver
//!
//! Reads path commands from stdin, applies them to a registry, and prints
//! every bridged event as a JSON line.

use std::{
    error::Error,
    io::{BufRead, stdin},
    sync::Arc,
};

use {
    tokio::task::spawn_blocking,
    tracing::{info, warn},
    tracing_subscriber::EnvFilter,
};

use viewer_state::{
    ChannelSink, CommandError, PathEventBridge, PathStateRegistry, SettingsManager,
    driver::{Command, Outcome, apply},
    error::{ErrorReporter, ResultExt},
};

/// Main entry point for the headless driver.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let manager = SettingsManager::new().add_contextf("Loading bridge settings")?;
    info!(path = ?manager.get_config_path(), "Bridge settings loaded");
    let settings = manager.get_settings().clone();

    let registry = PathStateRegistry::new();
    let (sink, events) = ChannelSink::new(settings.event_channel_capacity);
    let bridge = PathEventBridge::connect(&registry, Arc::new(sink.clone()), &settings)?;

    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event.to_json().add_contextf("Encoding bridged event") {
                Ok(line) => println!("{line}"),
                Err(error) => ErrorReporter::warn(&error, "printer"),
            }
        }
    });

    let reader_registry = registry.clone();
    spawn_blocking(move || read_commands(&reader_registry)).await??;

    bridge.disconnect();
    sink.close();
    printer.await?;

    info!(
        forwarded = bridge.forwarded(),
        failed = bridge.failed(),
        "Driver finished"
    );
    Ok(())
}

/// Applies stdin commands until `quit` or end of input.
fn read_commands(registry: &PathStateRegistry) -> Result<(), CommandError> {
    for line in stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                warn!(error = %error, "Ignoring input line");
                continue;
            }
        };

        match apply(registry, command) {
            Outcome::Continue => {}
            Outcome::Report(snapshot) => info!(
                image = ?snapshot.image,
                histogram = ?snapshot.histogram,
                "Current paths"
            ),
            Outcome::Stop => break,
        }
    }
    Ok(())
}

//! Generate static files

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use crate::content::ContentRepository;
use crate::generator::Generator;
use crate::{Folio, CONFIG_FILE};

/// Run the pipeline once and write all output
pub fn run(folio: &Folio) -> Result<()> {
    let start = std::time::Instant::now();

    let repository = ContentRepository::load(folio)?;
    Generator::new(folio).generate(&repository)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch for file changes and regenerate
pub async fn watch(folio: &Folio) -> Result<()> {
    let (tx, rx) = channel();

    // Bursts of events within the window are coalesced into one batch
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&folio.content_dir, RecursiveMode::Recursive)?;

    let config_path = folio.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", folio.content_dir);

    let base_dir = folio.base_dir.clone();
    tokio::task::spawn_blocking(move || rebuild_on_change(&base_dir, rx)).await?;

    drop(debouncer);
    Ok(())
}

/// Regenerate once per debounced batch until the channel closes
fn rebuild_on_change(base_dir: &Path, rx: Receiver<DebounceEventResult>) {
    while let Ok(result) = rx.recv() {
        let events = match result {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };

        let relevant: Vec<_> = events
            .iter()
            .filter(|e| {
                let path = e.path.to_string_lossy();
                !path.contains(".git") && !path.contains(".DS_Store") && !path.ends_with('~')
            })
            .collect();
        if relevant.is_empty() {
            continue;
        }

        for event in &relevant {
            tracing::debug!("File changed: {}", event.path.display());
        }
        tracing::info!("File changed, regenerating...");

        // Configuration may have changed too
        if let Err(e) = Folio::new(base_dir).and_then(|fresh| run(&fresh)) {
            tracing::error!("Generation failed: {}", e);
        }
    }
}

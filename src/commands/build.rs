//! Build the site

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::loader::ContentLoader;
use crate::generator::Generator;
use crate::Folio;

/// Load all content and generate the site
pub fn run(folio: &Folio) -> Result<()> {
    let start = Instant::now();

    let nodes = ContentLoader::new(folio).load_all()?;
    tracing::info!("Loaded {} content files", nodes.len());

    let summary = Generator::new(folio).generate(nodes)?;
    tracing::info!(
        "Routed {} published and {} drafts ({} unrouted)",
        summary.published,
        summary.drafts,
        summary.unrouted
    );

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Watch source directories and the config file, rebuilding on change
pub async fn watch(folio: &Folio) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for dir in folio.config.sources.keys().filter_map(|g| folio.source_dir(*g)) {
        if dir.exists() {
            watcher.watch(&dir, notify::RecursiveMode::Recursive)?;
            tracing::debug!("Watching {:?}", dir);
        }
    }

    let config_path = folio.base_dir.join("_config.yml");
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                // Debounce: only rebuild if more than 500ms since last rebuild
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, regenerating...");
                    // Re-read the config so edits to _config.yml take effect
                    let result = Folio::new(&folio.base_dir).and_then(|f| run(&f));
                    if let Err(e) = result {
                        tracing::error!("Generation failed: {:#}", e);
                    }
                    last_rebuild = Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

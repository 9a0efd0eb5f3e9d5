//! Shared Recipe Book
//!
//! Wraps a [`RecipeBook`] for concurrent readers and rebuilds it from disk
//! when recipe or tag files change.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{error, info};

use crate::book::RecipeBook;
use crate::config::Config;
use crate::error::{RecipeError, Result};
use crate::item::ItemStack;
use crate::recipe::{Recipe, SerializerRegistry, TradeOutcome};
use crate::resource::ResourceLocation;

/// Events from the hot-reload watcher
#[derive(Debug, Clone)]
pub enum ReloadEvent {
    /// Book rebuilt after a change to this file
    Reloaded { path: String, recipes: usize },
    /// Rebuild failed; the previous book stays active
    Error(String),
}

pub struct SharedRecipeBook {
    book: RwLock<Arc<RecipeBook>>,
    /// Held from load to swap so reloads land in the order they started
    reload_lock: Mutex<()>,
    registry: SerializerRegistry,
    data_dir: PathBuf,
    namespace: String,
    poll_interval: Duration,
}

impl SharedRecipeBook {
    pub fn new(config: &Config, registry: SerializerRegistry) -> Self {
        Self {
            book: RwLock::new(Arc::new(RecipeBook::new())),
            reload_lock: Mutex::new(()),
            registry,
            data_dir: config.data_dir.clone(),
            namespace: config.namespace.clone(),
            poll_interval: config.watch_poll_interval,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    /// Rebuild the book from disk and swap it in. Returns the recipe count.
    pub async fn reload(&self) -> Result<usize> {
        let _guard = self.reload_lock.lock().await;
        let book = RecipeBook::load(&self.data_dir, &self.namespace, &self.registry)?;
        let count = book.len();
        *self.book.write().await = Arc::new(book);
        Ok(count)
    }

    /// The current book; later reloads do not affect it
    pub async fn snapshot(&self) -> Arc<RecipeBook> {
        Arc::clone(&*self.book.read().await)
    }

    /// Run the first matching spirit trade against the offer
    pub async fn trade(&self, offer: &[ItemStack]) -> Option<(ResourceLocation, TradeOutcome)> {
        let book = self.snapshot().await;
        book.trade(offer)
            .map(|(trade, outcome)| (trade.id().clone(), outcome))
    }

    /// Watch the data directory and reload on changes to `.json`/`.toml`
    /// files. Must be called from inside a tokio runtime.
    pub fn start_file_watcher(self: &Arc<Self>) -> Result<mpsc::Receiver<ReloadEvent>> {
        use notify::{Config as NotifyConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
        use std::sync::mpsc::RecvTimeoutError;

        if !self.data_dir.exists() {
            return Err(RecipeError::Watch(format!(
                "data directory does not exist: {:?}",
                self.data_dir
            )));
        }

        let rt = tokio::runtime::Handle::try_current()
            .map_err(|e| RecipeError::Watch(e.to_string()))?;
        let (tx, rx) = mpsc::channel(32);
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            NotifyConfig::default().with_poll_interval(self.poll_interval),
        )?;
        watcher.watch(&self.data_dir, RecursiveMode::Recursive)?;

        info!("Recipe hot-reload watcher started for {:?}", self.data_dir);

        let shared = Arc::clone(self);
        let poll_interval = self.poll_interval;
        std::thread::spawn(move || {
            // Dropping the watcher stops events
            let _watcher = watcher;

            while !tx.is_closed() {
                let event = match notify_rx.recv_timeout(poll_interval) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                };

                if !matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) {
                    continue;
                }

                let Some(path) = event.paths.iter().find(|p| is_data_file(p)) else {
                    continue;
                };
                info!("Detected change in {:?}, triggering reload", path);

                let shared = Arc::clone(&shared);
                let event_tx = tx.clone();
                let path = path.to_string_lossy().to_string();
                rt.spawn(async move {
                    let event = match shared.reload().await {
                        Ok(recipes) => {
                            info!("Hot-reload completed: {} recipes", recipes);
                            ReloadEvent::Reloaded { path, recipes }
                        }
                        Err(e) => {
                            error!("Hot-reload failed: {}", e);
                            ReloadEvent::Error(e.to_string())
                        }
                    };
                    let _ = event_tx.send(event).await;
                });
            }

            info!("Recipe hot-reload watcher stopped");
        });

        Ok(rx)
    }
}

fn is_data_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("toml")
    )
}

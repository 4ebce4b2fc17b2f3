use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use kinship_graph_store::{GraphWriter, InMemoryGraphStore};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::Config;

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
    metrics_port: u16,
    store: OnceCell<Arc<InMemoryGraphStore>>,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf, metrics_port: u16) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            metrics_port,
            store: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn metrics_port(&self) -> u16 {
        self.metrics_port
    }

    /// Graph store backed by `storage.data_file`, opened on first use.
    pub async fn store(&self) -> Result<Arc<InMemoryGraphStore>> {
        self.store
            .get_or_try_init(|| async { open_store(self.config.storage.data_file.as_deref()) })
            .await
            .map(Arc::clone)
    }

    pub async fn writer(&self) -> Result<Arc<dyn GraphWriter>> {
        let store: Arc<dyn GraphWriter> = self.store().await?;
        Ok(store)
    }
}

pub fn open_store(data_file: Option<&Path>) -> Result<Arc<InMemoryGraphStore>> {
    match data_file {
        Some(path) => {
            let store = InMemoryGraphStore::with_persistence(path)
                .with_context(|| format!("opening graph store at {}", path.display()))?;
            info!(path = %path.display(), users = store.len(), "graph store opened");
            Ok(Arc::new(store))
        }
        None => {
            warn!("storage.data_file not set; graph changes will not outlive this process");
            Ok(Arc::new(InMemoryGraphStore::new()))
        }
    }
}

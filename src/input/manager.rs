//! Snapshot loader for JSON and TOML snapshot files

use crate::error::{Result, TeamOptimizerError};
use crate::input::file_detector::SnapshotFormat;
use crate::input::store::{Snapshot, SnapshotStore};
use log::info;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

pub struct SnapshotLoader {
    cache: HashMap<String, Arc<Snapshot>>,
    enable_cache: bool,
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotLoader {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn load(&mut self, path: &Path) -> Result<Arc<Snapshot>> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached) = self.cache.get(&path_str) {
                info!("Using cached snapshot for: {}", path.display());
                return Ok(Arc::clone(cached));
            }
        }

        if !path.exists() {
            return Err(TeamOptimizerError::InvalidInput(format!(
                "Snapshot file does not exist: {}",
                path.display()
            )));
        }

        let format = self.detect_format(path)?;
        let content = fs::read_to_string(path).await?;

        let snapshot: Snapshot = match format {
            SnapshotFormat::Json => {
                info!("Reading JSON snapshot: {}", path.display());
                serde_json::from_str(&content)?
            }
            SnapshotFormat::Toml => {
                info!("Reading TOML snapshot: {}", path.display());
                toml::from_str(&content).map_err(|e| {
                    TeamOptimizerError::InvalidInput(format!(
                        "Failed to parse TOML snapshot '{}': {}",
                        path.display(),
                        e
                    ))
                })?
            }
            SnapshotFormat::Unknown => {
                return Err(TeamOptimizerError::UnsupportedFormat(format!(
                    "Unsupported snapshot type for: {}",
                    path.display()
                )));
            }
        };

        info!(
            "Snapshot loaded: {} projects, {} employees",
            snapshot.projects.len(),
            snapshot.employees.len()
        );

        let snapshot = Arc::new(snapshot);
        if self.enable_cache {
            self.cache.insert(path_str, Arc::clone(&snapshot));
        }

        Ok(snapshot)
    }

    /// Load a snapshot and wrap it as a document store.
    pub async fn open_store(&mut self, path: &Path) -> Result<SnapshotStore> {
        Ok(SnapshotStore::new(self.load(path).await?))
    }

    fn detect_format(&self, path: &Path) -> Result<SnapshotFormat> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                TeamOptimizerError::InvalidInput(format!("File has no extension: {}", path.display()))
            })?;

        Ok(SnapshotFormat::from_extension(extension))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

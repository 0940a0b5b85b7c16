use std::path::{Path, PathBuf};

use crate::config::{ModuleConfig, data_dir};

/// Loads and persists the [`ModuleConfig`] of the console host as pretty
/// JSON in the data directory.
pub struct ConfigManager {
    path: PathBuf,
    config: ModuleConfig,
}

impl ConfigManager {
    pub fn with_path(path: impl Into<PathBuf>, config: ModuleConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Reads the stored config. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self, String> {
        Self::load_from(Self::config_path()).await
    }

    pub async fn load_from(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Self::with_path(path, ModuleConfig::default()));
        }

        let content = async_fs::read_to_string(path)
            .await
            .map_err(|e| e.to_string())?;
        let config: ModuleConfig = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self::with_path(path, config))
    }

    pub async fn persist(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.config).map_err(|e| e.to_string())?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| e.to_string())
    }

    pub fn current(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn replace(&mut self, config: ModuleConfig) {
        self.config = config;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn config_path() -> PathBuf {
        data_dir().join("config.json")
    }
}

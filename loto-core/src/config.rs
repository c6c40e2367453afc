use crate::error::{LotoError, Result};
use crate::generator::DEFAULT_MAX_ATTEMPTS;
use crate::rules::RuleCatalog;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// JSON catalog replacing the built-in lotteries.
    pub catalog_path: Option<PathBuf>,
    /// Candidate draws allowed per requested combination.
    pub max_attempts: usize,
    /// Largest `count` accepted by a single generation.
    pub max_batch: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            catalog_path: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_batch: 1_000,
        }
    }
}

impl EngineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Defaults overridden by `LOTO_DATA_DIR` and `LOTO_CATALOG`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("LOTO_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("LOTO_CATALOG") {
            if !path.trim().is_empty() {
                config.catalog_path = Some(PathBuf::from(path));
            }
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(LotoError::config("Data directory cannot be empty"));
        }

        if self.max_attempts == 0 {
            return Err(LotoError::config("max_attempts must be at least 1"));
        }

        if self.max_batch == 0 {
            return Err(LotoError::config("max_batch must be at least 1"));
        }

        if let Some(path) = &self.catalog_path {
            if !path.is_file() {
                return Err(LotoError::config(format!(
                    "Catalog file not found: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("loto.db")
    }

    pub fn load_catalog(&self) -> Result<RuleCatalog> {
        match &self.catalog_path {
            Some(path) => RuleCatalog::from_path(path),
            None => Ok(RuleCatalog::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.db_path(), PathBuf::from("data").join("loto.db"));
        assert_eq!(config.load_catalog().unwrap().len(), 3);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = EngineConfig::default();
        config.max_attempts = 0;
        assert!(matches!(config.validate(), Err(LotoError::Config(_))));

        let config = EngineConfig::default().with_catalog("/nonexistent/catalog.json");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_catalog_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"lotteries": [{"id": "keno", "name": "Keno", "range": {"min": 1, "max": 70}, "picks": 10}]}"#,
        )
        .unwrap();

        let config = EngineConfig::new(temp_dir.path()).with_catalog(&path);
        config.validate().unwrap();
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["keno"]);
    }
}

use loto_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub catalog: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("loto"),
            catalog: None,
            verbose: false,
        }
    }
}

impl CliConfig {
    pub fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig::new(&self.data_dir);
        match &self.catalog {
            Some(path) => config.with_catalog(path),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config() {
        let config = CliConfig {
            data_dir: PathBuf::from("/tmp/loto-test"),
            catalog: Some(PathBuf::from("/tmp/catalog.json")),
            verbose: false,
        };
        let engine = config.engine_config();
        assert_eq!(engine.db_path(), PathBuf::from("/tmp/loto-test/loto.db"));
        assert_eq!(engine.catalog_path, Some(PathBuf::from("/tmp/catalog.json")));

        assert!(CliConfig::default().data_dir.ends_with("loto"));
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::logging::LoggingConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub resources: ResourceConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Directory holding encoder_model.onnx, decoder_model.onnx and tokenizer.json
    pub model_dir: PathBuf,

    /// One stopword per line; the bundled English list is used when unset
    pub stopwords_path: Option<PathBuf>,

    /// TrueType font for chart labels and the word cloud
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on a single extraction + summarization + rendering run
    pub timeout_secs: u64,

    /// Threads handed to ONNX Runtime for each session
    pub model_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub log_dir: PathBuf,
    pub enable_file_logging: bool,
    pub max_log_files: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models/bart-large-cnn"),
            stopwords_path: None,
            font_path: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 900,
            model_threads: 4,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        let defaults = LoggingConfig::default();
        Self {
            level: defaults.level,
            log_dir: defaults.log_dir,
            enable_file_logging: defaults.enable_file_logging,
            max_log_files: defaults.max_log_files,
        }
    }
}

impl LoggingSection {
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            log_dir: self.log_dir.clone(),
            enable_file_logging: self.enable_file_logging,
            max_log_files: self.max_log_files,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow!("Failed to read config file: {}", e))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    /// Environment variables override whatever the file (or defaults) set
    pub fn apply_env(mut self) -> Self {
        if let Ok(dir) = std::env::var("PDF_SUMMARIZER_MODEL_DIR") {
            self.resources.model_dir = PathBuf::from(dir);
        }

        if let Ok(path) = std::env::var("PDF_SUMMARIZER_STOPWORDS") {
            self.resources.stopwords_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("PDF_SUMMARIZER_FONT") {
            self.resources.font_path = Some(PathBuf::from(path));
        }

        if let Ok(timeout) = std::env::var("PDF_SUMMARIZER_TIMEOUT_SECS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.pipeline.timeout_secs = value;
            }
        }

        if let Ok(level) = std::env::var("PDF_SUMMARIZER_LOG_LEVEL") {
            self.logging.level = level;
        }

        self
    }

    pub fn load_from_env() -> Self {
        Self::default().apply_env()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| anyhow!("Failed to write config file: {}", e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.timeout_secs == 0 {
            return Err(anyhow!("pipeline.timeout_secs must be greater than zero"));
        }
        if self.pipeline.model_threads == 0 {
            return Err(anyhow!("pipeline.model_threads must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.pipeline.timeout_secs, 900);
        assert_eq!(config.resources.model_dir, PathBuf::from("models/bart-large-cnn"));
        assert!(config.resources.stopwords_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.pipeline.timeout_secs = 120;
        config.resources.font_path = Some(PathBuf::from("/tmp/font.ttf"));

        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        config.save_to_file(&config_path).unwrap();

        let loaded_config = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded_config.pipeline.timeout_secs, 120);
        assert_eq!(loaded_config.resources.font_path, Some(PathBuf::from("/tmp/font.ttf")));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[resources]\nmodel_dir = \"/opt/bart\"\n").unwrap();

        let config = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(config.resources.model_dir, PathBuf::from("/opt/bart"));
        assert_eq!(config.pipeline.timeout_secs, 900);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "pipeline = 12").unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let mut config = AppConfig::default();
        config.pipeline.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}

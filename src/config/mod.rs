//! Application Configuration
//!
//! Engine, sample and logging settings stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::EngineMode;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OCR engine settings
    pub engine: EngineSettings,
    /// Sample image and asset settings
    pub sample: SampleSettings,
    /// Scripted engine settings used by the demo
    pub demo: DemoSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Directory containing the `tessdata` subdirectory (None = data dir)
    pub data_path: Option<PathBuf>,
    /// Language(s), joined with '+' for several
    pub language: String,
    /// Engine mode
    pub mode: EngineMode,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            data_path: None,
            language: "eng".to_string(),
            mode: EngineMode::LstmOnly,
        }
    }
}

/// Sample image and asset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSettings {
    /// File name of the sample image inside the local data directory
    pub image_name: String,
    /// Directory whose files are staged into the local data directory
    pub assets_dir: Option<PathBuf>,
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            image_name: "sample.jpg".to_string(),
            assets_dir: None,
        }
    }
}

/// Scripted engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Text the scripted engine "recognizes"
    pub transcript: String,
    /// Delay per recognized word, in milliseconds
    pub step_delay_ms: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            transcript: "The quick brown fox jumps over the lazy dog".to_string(),
            step_delay_ms: 150,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by RUST_LOG
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert!(config.engine.data_path.is_none());
        assert_eq!(config.engine.language, "eng");
        assert_eq!(config.engine.mode, EngineMode::LstmOnly);

        assert_eq!(config.sample.image_name, "sample.jpg");
        assert!(config.sample.assets_dir.is_none());

        assert!(!config.demo.transcript.is_empty());
        assert_eq!(config.demo.step_delay_ms, 150);

        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.engine.data_path = Some(PathBuf::from("/opt/ocr"));
        config.engine.language = "eng+deu".to_string();
        config.engine.mode = EngineMode::TesseractLstmCombined;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.engine.data_path, Some(PathBuf::from("/opt/ocr")));
        assert_eq!(parsed.engine.language, "eng+deu");
        assert_eq!(parsed.engine.mode, EngineMode::TesseractLstmCombined);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [engine]
            language = "fra"
            mode = "tesseract_only"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.engine.language, "fra");
        assert_eq!(parsed.engine.mode, EngineMode::TesseractOnly);
        assert_eq!(parsed.sample.image_name, "sample.jpg");
        assert_eq!(parsed.demo.step_delay_ms, 150);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.demo.step_delay_ms = 5;
        let temp_file = NamedTempFile::new().unwrap();

        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.demo.step_delay_ms, 5);
        assert_eq!(loaded.engine.language, config.engine.language);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;

use crate::config::ConfigBuilder;
use crate::error::{config_error, fs_error, Result};

/// Optional configuration file (YAML or JSON) applied beneath CLI flags
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Transcription service API key
    pub api_key: Option<String>,
    /// Transcription service base URL override
    pub api_base_url: Option<String>,
    /// Codec binary used for decoding input audio
    pub codec_binary: Option<PathBuf>,
    /// Directory for exported clean audio
    pub output_directory: Option<PathBuf>,
    /// Mask character used in censored text
    pub mask_char: Option<char>,
    /// Custom profanity word list
    pub profanity_words: Option<Vec<String>>,
    /// Seconds between transcription job polls
    pub poll_interval_secs: Option<f64>,
    /// Poll attempt budget before giving up
    pub max_poll_attempts: Option<u32>,
    /// Show progress spinners by default
    pub show_progress: Option<bool>,
}

impl ConfigFile {
    /// Load configuration from a YAML file
    pub async fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| fs_error(e, path.as_ref().to_path_buf()))?;

        serde_yaml::from_str(&contents)
            .map_err(|e| config_error("config_file", format!("Failed to parse YAML config: {}", e)))
    }

    /// Load configuration from a JSON file
    pub async fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| fs_error(e, path.as_ref().to_path_buf()))?;

        serde_json::from_str(&contents)
            .map_err(|e| config_error("config_file", format!("Failed to parse JSON config: {}", e)))
    }

    /// Auto-detect and load a configuration file based on extension
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::load_yaml(path).await,
            Some("json") => Self::load_json(path).await,
            Some(ext) => Err(config_error(
                "config_file",
                format!("Unsupported config extension '{}', expected yaml, yml, or json", ext),
            )),
            None => Err(config_error(
                "config_file",
                "Config file must have a .yaml, .yml, or .json extension",
            )),
        }
    }

    /// Default config file locations, nearest first
    pub fn default_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(".hushcut.yaml"),
            PathBuf::from(".hushcut.yml"),
            PathBuf::from(".hushcut.json"),
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("hushcut")
                .join("config.yaml"),
        ]
    }

    /// Try to load configuration from default locations
    pub async fn load_from_default_locations() -> Option<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::load(&path).await {
                    Ok(config) => {
                        log::info!("Loaded configuration from: {}", path.display());
                        return Some(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }
        None
    }

    /// Apply this config file to a ConfigBuilder; CLI flags applied after
    /// this take precedence
    pub fn apply_to_builder(&self, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
        if let Some(ref key) = self.api_key {
            builder = builder.api_key(key.clone());
        }

        if let Some(ref url) = self.api_base_url {
            builder = builder.api_base_url(url.clone());
        }

        if let Some(ref codec) = self.codec_binary {
            builder = builder.codec_binary(codec.clone());
        }

        if let Some(ref dir) = self.output_directory {
            builder = builder.output_dir(dir.clone());
        }

        if let Some(mask) = self.mask_char {
            builder = builder.mask_char(mask);
        }

        if let Some(ref words) = self.profanity_words {
            builder = builder.profanity_words(words.clone())?;
        }

        if let Some(interval) = self.poll_interval_secs {
            builder = builder.poll_interval_secs(interval)?;
        }

        if let Some(attempts) = self.max_poll_attempts {
            builder = builder.max_poll_attempts(attempts)?;
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_yaml_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("test.yaml");

        tokio::fs::write(
            &config_path,
            "api_key: secret\npoll_interval_secs: 2.0\nmask_char: '#'\n",
        )
        .await
        .unwrap();

        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.poll_interval_secs, Some(2.0));
        assert_eq!(loaded.mask_char, Some('#'));
    }

    #[tokio::test]
    async fn test_json_load() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("test.json");

        tokio::fs::write(
            &config_path,
            r#"{"api_key": "secret", "max_poll_attempts": 30}"#,
        )
        .await
        .unwrap();

        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.max_poll_attempts, Some(30));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected() {
        let result = ConfigFile::load("config.toml").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_apply_to_builder_feeds_validated_settings() {
        let temp_dir = tempdir().unwrap();
        let input_path = temp_dir.path().join("song.mp3");
        std::fs::File::create(&input_path).unwrap();

        let file = ConfigFile {
            api_key: Some("from-file".to_string()),
            output_directory: Some(temp_dir.path().join("out")),
            max_poll_attempts: Some(7),
            ..Default::default()
        };

        let builder = file
            .apply_to_builder(ConfigBuilder::new().input_file(input_path))
            .unwrap();
        let config = builder.build().unwrap();

        assert_eq!(config.api_key, "from-file");
        assert_eq!(config.max_poll_attempts, 7);
        assert_eq!(config.output_dir, temp_dir.path().join("out"));
    }

    #[tokio::test]
    async fn test_invalid_poll_interval_in_file_is_rejected() {
        let file = ConfigFile {
            poll_interval_secs: Some(0.0),
            ..Default::default()
        };
        assert!(file.apply_to_builder(ConfigBuilder::new()).is_err());
    }
}

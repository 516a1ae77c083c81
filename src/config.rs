use std::path::PathBuf;
use std::time::Duration;

use crate::censor::{default_word_list, DEFAULT_MASK_CHAR};
use crate::error::{config_error, Result};
use crate::transcribe::PollingPolicy;

/// Default directory for exported clean audio
pub const DEFAULT_OUTPUT_DIR: &str = "clean_audio";

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: Option<PathBuf>,
    pub api_key: String,
    pub api_base_url: Option<String>,
    /// Codec binary used for decoding and probing; threaded explicitly,
    /// never set process-wide
    pub codec_binary: PathBuf,
    pub mask_char: char,
    pub profanity_words: Vec<String>,
    pub poll_interval_secs: f64,
    pub max_poll_attempts: u32,
    pub retry_delay_secs: f64,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.input_file.exists() {
            return Err(config_error(
                "input_file",
                format!("Input file does not exist: {}", self.input_file.display()),
            ));
        }

        if !self.input_file.is_file() {
            return Err(config_error(
                "input_file",
                format!("Input path is not a file: {}", self.input_file.display()),
            ));
        }

        if self.api_key.trim().is_empty() {
            return Err(config_error(
                "api_key",
                "Transcription API key is required (--api-key or TRANSCRIBE_API_KEY)",
            ));
        }

        if self.poll_interval_secs <= 0.0 {
            return Err(config_error(
                "poll_interval",
                format!("Poll interval must be positive, got {}", self.poll_interval_secs),
            ));
        }

        if self.max_poll_attempts == 0 {
            return Err(config_error(
                "max_poll_attempts",
                "Maximum poll attempts must be at least 1",
            ));
        }

        if self.profanity_words.is_empty() {
            return Err(config_error(
                "profanity_words",
                "Profanity word list cannot be empty",
            ));
        }

        Ok(())
    }

    /// Generate the output path inside the output directory if not provided
    pub fn ensure_output_file(&mut self) -> Result<()> {
        if self.output_file.is_none() {
            let input_stem = self
                .input_file
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| config_error("input_file", "Invalid filename"))?;

            self.output_file = Some(self.output_dir.join(format!("{}_clean.wav", input_stem)));
        }
        Ok(())
    }

    /// Polling configuration for the transcription driver
    pub fn polling_policy(&self) -> PollingPolicy {
        PollingPolicy {
            poll_interval: Duration::from_secs_f64(self.poll_interval_secs),
            max_poll_attempts: self.max_poll_attempts,
            retry_delay: Duration::from_secs_f64(self.retry_delay_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file: None,
            api_key: String::new(),
            api_base_url: None,
            codec_binary: PathBuf::from("ffmpeg"),
            mask_char: DEFAULT_MASK_CHAR,
            profanity_words: default_word_list(),
            poll_interval_secs: 1.0,
            max_poll_attempts: 120,
            retry_delay_secs: 5.0,
        }
    }
}

/// Builder pattern for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    input_file: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    output_file: Option<PathBuf>,
    api_key: Option<String>,
    api_base_url: Option<String>,
    codec_binary: Option<PathBuf>,
    mask_char: Option<char>,
    profanity_words: Option<Vec<String>>,
    poll_interval_secs: Option<f64>,
    max_poll_attempts: Option<u32>,
    retry_delay_secs: Option<f64>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_file(mut self, path: PathBuf) -> Self {
        self.input_file = Some(path);
        self
    }

    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }

    pub fn output_file(mut self, path: PathBuf) -> Self {
        self.output_file = Some(path);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn codec_binary(mut self, path: PathBuf) -> Self {
        self.codec_binary = Some(path);
        self
    }

    pub fn mask_char(mut self, c: char) -> Self {
        self.mask_char = Some(c);
        self
    }

    pub fn profanity_words(mut self, words: Vec<String>) -> Result<Self> {
        let normalized: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        if normalized.is_empty() {
            return Err(config_error("profanity_words", "No valid words provided"));
        }

        self.profanity_words = Some(normalized);
        Ok(self)
    }

    pub fn poll_interval_secs(mut self, secs: f64) -> Result<Self> {
        if secs <= 0.0 {
            return Err(config_error(
                "poll_interval",
                format!("Poll interval must be positive, got {}", secs),
            ));
        }
        self.poll_interval_secs = Some(secs);
        Ok(self)
    }

    pub fn max_poll_attempts(mut self, attempts: u32) -> Result<Self> {
        if attempts == 0 {
            return Err(config_error(
                "max_poll_attempts",
                "Maximum poll attempts must be at least 1",
            ));
        }
        self.max_poll_attempts = Some(attempts);
        Ok(self)
    }

    pub fn retry_delay_secs(mut self, secs: f64) -> Self {
        self.retry_delay_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<Config> {
        let input_file = self
            .input_file
            .ok_or_else(|| config_error("input_file", "Input file is required"))?;

        let defaults = Config::default();
        let mut config = Config {
            input_file,
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_file: self.output_file,
            api_key: self.api_key.unwrap_or_default(),
            api_base_url: self.api_base_url,
            codec_binary: self.codec_binary.unwrap_or(defaults.codec_binary),
            mask_char: self.mask_char.unwrap_or(defaults.mask_char),
            profanity_words: self.profanity_words.unwrap_or(defaults.profanity_words),
            poll_interval_secs: self.poll_interval_secs.unwrap_or(defaults.poll_interval_secs),
            max_poll_attempts: self.max_poll_attempts.unwrap_or(defaults.max_poll_attempts),
            retry_delay_secs: self.retry_delay_secs.unwrap_or(defaults.retry_delay_secs),
        };

        config.validate()?;
        config.ensure_output_file()?;

        Ok(config)
    }
}

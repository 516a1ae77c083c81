use std::fmt;

/// Custom error types for the hushcut pipeline
#[derive(Debug)]
pub enum HushcutError {
    /// File system related errors
    FileSystem { source: std::io::Error, path: std::path::PathBuf },

    /// Network failures while talking to the transcription service.
    /// Transient failures (timeouts, connect errors) are retried once.
    Network { message: String, transient: bool },

    /// Transcription service rejected or failed the job
    Transcription { message: String },

    /// Transcript has no usable words, so timestamps cannot be rescaled
    EmptyTranscript { message: String },

    /// Codec could not open or decode the input audio file
    AudioLoad { message: String, probe: Option<String> },

    /// Configuration validation errors
    Config { field: String, message: String },

    /// Audio processing errors
    AudioProcessing { message: String },

    /// General processing error
    Processing { message: String },
}

impl HushcutError {
    /// Whether this error is worth a single retry
    pub fn is_transient(&self) -> bool {
        matches!(self, HushcutError::Network { transient: true, .. })
    }

    /// Process exit code for this error kind
    pub fn exit_code(&self) -> i32 {
        match self {
            HushcutError::Config { .. } => 2,
            HushcutError::AudioLoad { .. } => 3,
            HushcutError::Network { .. } => 4,
            HushcutError::Transcription { .. } => 5,
            HushcutError::EmptyTranscript { .. } => 6,
            HushcutError::FileSystem { .. } => 7,
            HushcutError::AudioProcessing { .. } | HushcutError::Processing { .. } => 1,
        }
    }
}

impl fmt::Display for HushcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HushcutError::FileSystem { source, path } => {
                write!(f, "File system error for '{}': {}", path.display(), source)
            }
            HushcutError::Network { message, transient } => {
                if *transient {
                    write!(f, "Transient network error: {}", message)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            HushcutError::Transcription { message } => {
                write!(f, "Transcription error: {}", message)
            }
            HushcutError::EmptyTranscript { message } => {
                write!(f, "Empty transcript: {}", message)
            }
            HushcutError::AudioLoad { message, probe } => {
                write!(f, "Audio load error: {}", message)?;
                if let Some(probe) = probe {
                    write!(f, "\nCodec probe output:\n{}", probe)?;
                }
                Ok(())
            }
            HushcutError::Config { field, message } => {
                write!(f, "Configuration error in '{}': {}", field, message)
            }
            HushcutError::AudioProcessing { message } => {
                write!(f, "Audio processing error: {}", message)
            }
            HushcutError::Processing { message } => {
                write!(f, "Processing error: {}", message)
            }
        }
    }
}

impl std::error::Error for HushcutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HushcutError::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for hushcut operations
pub type Result<T> = std::result::Result<T, HushcutError>;

/// Helper function to create configuration errors
pub fn config_error(field: impl Into<String>, message: impl Into<String>) -> HushcutError {
    HushcutError::Config {
        field: field.into(),
        message: message.into(),
    }
}

/// Helper function to create file system errors
pub fn fs_error(source: std::io::Error, path: std::path::PathBuf) -> HushcutError {
    HushcutError::FileSystem { source, path }
}

/// Helper function to create transcription errors
pub fn transcription_error(message: impl Into<String>) -> HushcutError {
    HushcutError::Transcription {
        message: message.into(),
    }
}

/// Helper function to create network errors
pub fn network_error(message: impl Into<String>, transient: bool) -> HushcutError {
    HushcutError::Network {
        message: message.into(),
        transient,
    }
}

/// Helper function to create audio load errors with optional probe output
pub fn audio_load_error(message: impl Into<String>, probe: Option<String>) -> HushcutError {
    HushcutError::AudioLoad {
        message: message.into(),
        probe,
    }
}

/// Helper function to create audio processing errors
pub fn audio_error(message: impl Into<String>) -> HushcutError {
    HushcutError::AudioProcessing {
        message: message.into(),
    }
}

// Conversion from anyhow::Error for modules that use anyhow internally
impl From<anyhow::Error> for HushcutError {
    fn from(err: anyhow::Error) -> Self {
        HushcutError::Processing {
            message: err.to_string(),
        }
    }
}

// Core modules
pub mod audio;
pub mod censor;
pub mod config;
pub mod config_file;
pub mod dependencies;
pub mod error;
pub mod progress;
pub mod resources;
pub mod segment;
pub mod transcribe;
pub mod transcript;

// Re-export commonly used types
pub use audio::{AudioBuffer, AudioConfig};
pub use censor::ProfanityFilter;
pub use config::{Config, ConfigBuilder};
pub use config_file::ConfigFile;
pub use error::{HushcutError, Result};
pub use progress::{ProgressOperation, ProgressTracker};
pub use resources::TempFile;
pub use segment::{censor_audio, WordSegment};
pub use transcribe::{HttpTranscriber, PollingPolicy, TranscriptionBackend};
pub use transcript::{Transcript, TranscriptStatus, Word};

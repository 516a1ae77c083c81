use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{HushcutError, Result};

/// Processing state reported by the transcription service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    #[serde(alias = "queued", alias = "processing")]
    Pending,
    Completed,
    #[serde(alias = "error")]
    Failed,
}

/// One recognized spoken word with start/end timestamps in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Ordered word sequence plus the aggregate text returned by the service.
///
/// Word timestamps arrive in the service's native time base and are rescaled
/// exactly once by [`Transcript::normalize_to_duration`]; the transcript is
/// read-only after that.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub words: Vec<Word>,
    pub full_text: String,
    pub status: TranscriptStatus,
}

impl Transcript {
    pub fn new(words: Vec<Word>, full_text: impl Into<String>, status: TranscriptStatus) -> Self {
        Self {
            words,
            full_text: full_text.into(),
            status,
        }
    }

    /// Largest end timestamp across all words, in the current time base
    pub fn max_end(&self) -> f64 {
        self.words.iter().fold(0.0_f64, |acc, w| acc.max(w.end))
    }

    /// Linearly rescale every word timestamp so the last word ends at
    /// `duration_secs`: `t' = (t / max_end) * duration_secs`.
    ///
    /// Word order and word-to-index correspondence are untouched. Fails if
    /// the transcript is empty or its max end timestamp is not positive,
    /// since the scale factor would be a division by zero.
    pub fn normalize_to_duration(&mut self, duration_secs: f64) -> Result<()> {
        if self.words.is_empty() {
            return Err(HushcutError::EmptyTranscript {
                message: "transcript contains no words to normalize".to_string(),
            });
        }

        let max_end = self.max_end();
        if max_end <= 0.0 {
            return Err(HushcutError::EmptyTranscript {
                message: format!(
                    "cannot rescale timestamps: max word end is {} (expected > 0)",
                    max_end
                ),
            });
        }

        let scale = duration_secs / max_end;
        for word in &mut self.words {
            word.start *= scale;
            word.end *= scale;
        }

        debug!(
            "Normalized {} word timestamps (scale factor {:.4}, target {:.3}s)",
            self.words.len(),
            scale,
            duration_secs
        );
        Ok(())
    }
}

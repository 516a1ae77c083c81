use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::time::sleep;

use crate::error::{fs_error, network_error, transcription_error, HushcutError, Result};
use crate::transcript::{Transcript, TranscriptStatus, Word};

/// Handle for a submitted transcription job
#[derive(Debug, Clone)]
pub struct TranscriptionJob {
    pub id: String,
    pub status: TranscriptStatus,
}

/// One poll of a transcription job
#[derive(Debug, Clone)]
pub struct PollResponse {
    pub status: TranscriptStatus,
    pub words: Vec<Word>,
    pub full_text: String,
}

/// Boundary to the external speech-to-text service: submit an audio file,
/// then poll the job by id until it reaches a terminal state
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    async fn submit(&self, audio_path: &Path) -> Result<TranscriptionJob>;
    async fn poll(&self, job_id: &str) -> Result<PollResponse>;
}

/// Bounded polling and retry configuration for the transcription call
#[derive(Debug, Clone)]
pub struct PollingPolicy {
    /// Delay between job status polls
    pub poll_interval: Duration,
    /// Give up after this many polls without a terminal status
    pub max_poll_attempts: u32,
    /// Fixed backoff before the single retry of a transient submit failure
    pub retry_delay: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_poll_attempts: 120,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Submit an audio file and poll until the transcript is ready.
///
/// A transient network failure on submit gets exactly one retry after the
/// policy's fixed delay; any further failure is fatal. Polling sleeps
/// between requests and aborts after the configured attempt budget, so the
/// service is never hammered in a tight loop.
pub async fn transcribe_audio(
    backend: &dyn TranscriptionBackend,
    audio_path: &Path,
    policy: &PollingPolicy,
) -> Result<Transcript> {
    info!("Submitting {:?} for transcription", audio_path);

    let job = match backend.submit(audio_path).await {
        Ok(job) => job,
        Err(e) if e.is_transient() => {
            warn!("{}; retrying once after {:?}", e, policy.retry_delay);
            sleep(policy.retry_delay).await;
            backend.submit(audio_path).await?
        }
        Err(e) => return Err(e),
    };
    debug!("Transcription job {} submitted ({:?})", job.id, job.status);

    for attempt in 1..=policy.max_poll_attempts {
        let response = backend.poll(&job.id).await?;
        match response.status {
            TranscriptStatus::Completed => {
                info!(
                    "Transcription completed after {} poll(s): {} words",
                    attempt,
                    response.words.len()
                );
                return Ok(Transcript::new(
                    response.words,
                    response.full_text,
                    TranscriptStatus::Completed,
                ));
            }
            TranscriptStatus::Failed => {
                return Err(transcription_error(format!(
                    "job {} failed on the service side",
                    job.id
                )));
            }
            TranscriptStatus::Pending => {
                debug!(
                    "Job {} still pending (poll {}/{})",
                    job.id, attempt, policy.max_poll_attempts
                );
                // no point sleeping after the final attempt
                if attempt < policy.max_poll_attempts {
                    sleep(policy.poll_interval).await;
                }
            }
        }
    }

    Err(transcription_error(format!(
        "job {} did not complete within {} polls",
        job.id, policy.max_poll_attempts
    )))
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    id: String,
    status: TranscriptStatus,
}

/// Word record in the service's native time unit (milliseconds). The values
/// pass through untouched; the normalizer owns rescaling.
#[derive(Debug, Deserialize)]
struct ApiWord {
    text: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    status: TranscriptStatus,
    text: Option<String>,
    words: Option<Vec<ApiWord>>,
    error: Option<String>,
}

/// HTTP client for an AssemblyAI-style transcription service: upload the
/// audio bytes, create a job with the profanity filter enabled, poll by id
pub struct HttpTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTranscriber {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.assemblyai.com/v2";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Timeouts and connection failures are worth a retry; everything else
    /// (auth failures, bad requests) is not
    fn classify(e: reqwest::Error) -> HushcutError {
        network_error(e.to_string(), e.is_timeout() || e.is_connect())
    }
}

#[async_trait]
impl TranscriptionBackend for HttpTranscriber {
    async fn submit(&self, audio_path: &Path) -> Result<TranscriptionJob> {
        let bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|e| fs_error(e, audio_path.to_path_buf()))?;
        debug!("Uploading {} bytes to transcription service", bytes.len());

        let upload: UploadResponse = self
            .client
            .post(format!("{}/upload", self.base_url))
            .header("authorization", &self.api_key)
            .body(bytes)
            .send()
            .await
            .map_err(Self::classify)?
            .error_for_status()
            .map_err(Self::classify)?
            .json()
            .await
            .map_err(Self::classify)?;

        let job: JobResponse = self
            .client
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&serde_json::json!({
                "audio_url": upload.upload_url,
                "filter_profanity": true,
            }))
            .send()
            .await
            .map_err(Self::classify)?
            .error_for_status()
            .map_err(Self::classify)?
            .json()
            .await
            .map_err(Self::classify)?;

        Ok(TranscriptionJob {
            id: job.id,
            status: job.status,
        })
    }

    async fn poll(&self, job_id: &str) -> Result<PollResponse> {
        let response: TranscriptResponse = self
            .client
            .get(format!("{}/transcript/{}", self.base_url, job_id))
            .header("authorization", &self.api_key)
            .send()
            .await
            .map_err(Self::classify)?
            .error_for_status()
            .map_err(Self::classify)?
            .json()
            .await
            .map_err(Self::classify)?;

        if response.status == TranscriptStatus::Failed {
            return Err(transcription_error(
                response
                    .error
                    .unwrap_or_else(|| format!("job {} failed without detail", job_id)),
            ));
        }

        let words = response
            .words
            .unwrap_or_default()
            .into_iter()
            .map(|w| Word::new(w.text, w.start, w.end))
            .collect();

        Ok(PollResponse {
            status: response.status,
            words,
            full_text: response.text.unwrap_or_default(),
        })
    }
}

use std::path::Path;

use log::{debug, info, warn};
use tokio::process::Command;

use crate::error::{audio_error, audio_load_error, fs_error, Result};
use crate::resources::TempFile;

/// Audio format used for decoding and silence synthesis
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Bytes per sample of the decoded PCM stream
    pub sample_width: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            sample_width: 2, // 16-bit PCM
        }
    }
}

/// A continuous, indexable buffer of interleaved 16-bit PCM samples.
///
/// Owned by the pipeline run that loaded it; slicing copies, the source is
/// never mutated.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Synthesize silence of the given duration. The duration may be
    /// fractional, zero, or negative; anything below 1 ms is clamped up to
    /// 1 ms, so this never fails and never returns an empty buffer.
    pub fn silent(duration_ms: f64, sample_rate: u32, channels: u16) -> Self {
        let duration_ms = if duration_ms <= 0.0 {
            warn!(
                "Requested silent segment with non-positive duration {:.3} ms, clamping to 1 ms",
                duration_ms
            );
            1.0
        } else {
            duration_ms
        };

        let mut frames = (duration_ms / 1000.0 * sample_rate as f64).round() as usize;
        if frames == 0 {
            // 1 ms floor at the given rate
            frames = (sample_rate as usize / 1000).max(1);
        }

        Self {
            samples: vec![0; frames * channels as usize],
            sample_rate,
            channels,
        }
    }

    /// Silent buffer with the exact sample count and format of `other`
    pub fn silent_like(other: &AudioBuffer) -> Self {
        Self {
            samples: vec![0; other.samples.len()],
            sample_rate: other.sample_rate,
            channels: other.channels,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of interleaved frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_ms(&self) -> u64 {
        // rounded, so a 1 ms floor segment at 44.1 kHz reports 1 rather than 0
        ((self.frames() as f64 * 1000.0) / self.sample_rate as f64).round() as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True if every sample is zero
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0)
    }

    fn frame_at_ms(&self, ms: u64) -> usize {
        ((ms as u128 * self.sample_rate as u128) / 1000) as usize
    }

    /// Copy out the sub-range `[start_ms, end_ms)`, frame aligned. Callers
    /// are expected to clamp the range into `[0, duration_ms]` first.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> Result<AudioBuffer> {
        if start_ms >= end_ms {
            return Err(audio_error(format!(
                "invalid slice range: {} ms >= {} ms",
                start_ms, end_ms
            )));
        }

        let start = self.frame_at_ms(start_ms) * self.channels as usize;
        let end = (self.frame_at_ms(end_ms) * self.channels as usize).min(self.samples.len());
        if start >= end {
            return Err(audio_error(format!(
                "slice range {} ms..{} ms is outside the buffer ({} ms)",
                start_ms,
                end_ms,
                self.duration_ms()
            )));
        }

        Ok(AudioBuffer {
            samples: self.samples[start..end].to_vec(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }

    /// Append another buffer's samples; formats must match
    pub fn append(&mut self, other: &AudioBuffer) -> Result<()> {
        if other.sample_rate != self.sample_rate || other.channels != self.channels {
            return Err(audio_error(format!(
                "cannot append {} Hz/{}ch audio to {} Hz/{}ch buffer",
                other.sample_rate, other.channels, self.sample_rate, self.channels
            )));
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Pad with trailing zero frames up to `target_frames`; no-op if the
    /// buffer is already that long or longer
    pub fn pad_to_frames(&mut self, target_frames: usize) {
        let current = self.frames();
        if current < target_frames {
            let missing = (target_frames - current) * self.channels as usize;
            debug!("Padding buffer with {} silent samples", missing);
            self.samples.extend(std::iter::repeat(0).take(missing));
        }
    }
}

/// Load an audio file into memory by decoding it with the configured codec
/// binary into 16-bit PCM WAV, then reading that WAV.
///
/// The codec binary path is explicit configuration; nothing here touches
/// process-global state. On decode failure the input is probed for
/// diagnostics before the error surfaces.
pub async fn load_audio(
    input_path: &Path,
    codec_binary: &Path,
    format: &AudioConfig,
) -> Result<AudioBuffer> {
    let temp_dir = std::env::temp_dir();
    let wav_filename = format!("hushcut_decode_{}.wav", std::process::id());
    let wav_path = temp_dir.join(wav_filename);
    let decoded = TempFile::new(wav_path);

    info!("Decoding {:?} with codec {:?}", input_path, codec_binary);

    let input_arg = input_path
        .to_str()
        .ok_or_else(|| audio_load_error("input path is not valid UTF-8", None))?;
    let output_arg = decoded
        .path()
        .to_str()
        .ok_or_else(|| audio_load_error("temp path is not valid UTF-8", None))?;

    let output = Command::new(codec_binary)
        .args([
            "-i", input_arg,
            "-vn",
            "-acodec", "pcm_s16le",
            "-ar", &format.sample_rate.to_string(),
            "-ac", &format.channels.to_string(),
            "-y",
            output_arg,
        ])
        .output()
        .await
        .map_err(|e| {
            audio_load_error(format!("failed to run codec {:?}: {}", codec_binary, e), None)
        })?;

    if !output.status.success() || !decoded.exists() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let probe = probe_input(input_path, codec_binary).await;
        return Err(audio_load_error(
            format!("codec could not decode {:?}: {}", input_path, stderr.trim()),
            probe,
        ));
    }

    let buffer = read_wav(decoded.path())?;
    info!(
        "Audio loaded: {} ms ({:.2}s), {} Hz, {} channel(s)",
        buffer.duration_ms(),
        buffer.duration_secs(),
        buffer.sample_rate(),
        buffer.channels()
    );
    Ok(buffer)
}

/// Run `<codec> -i <input>` and capture its stderr as diagnostic text for
/// the user. The output is never parsed.
async fn probe_input(input_path: &Path, codec_binary: &Path) -> Option<String> {
    let input_arg = input_path.to_str()?;
    let output = Command::new(codec_binary)
        .args(["-hide_banner", "-i", input_arg])
        .output()
        .await
        .ok()?;
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        None
    } else {
        Some(stderr)
    }
}

/// Read a 16-bit PCM WAV file into an [`AudioBuffer`]
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| audio_load_error(format!("failed to open WAV {:?}: {}", path, e), None))?;
    let spec = reader.spec();

    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(audio_load_error(
            format!(
                "expected 16-bit integer PCM, found {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            ),
            None,
        ));
    }

    let samples: std::result::Result<Vec<i16>, _> = reader.samples::<i16>().collect();
    let samples =
        samples.map_err(|e| audio_load_error(format!("failed to read WAV samples: {}", e), None))?;

    Ok(AudioBuffer::new(samples, spec.sample_rate, spec.channels))
}

/// Export a buffer as a 16-bit PCM WAV file, creating the parent directory
/// if it does not exist
pub fn export_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| fs_error(e, parent.to_path_buf()))?;
        }
    }

    let spec = hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| audio_error(format!("failed to create WAV {:?}: {}", path, e)))?;
    for &sample in buffer.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| audio_error(format!("failed to write WAV sample: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| audio_error(format!("failed to finalize WAV {:?}: {}", path, e)))?;

    info!("Exported {} ms of audio to {:?}", buffer.duration_ms(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone_buffer(frames: usize, rate: u32, channels: u16) -> AudioBuffer {
        let samples = (0..frames * channels as usize)
            .map(|i| ((i % 100) as i16) - 50)
            .collect();
        AudioBuffer::new(samples, rate, channels)
    }

    #[test]
    fn test_silent_segment_is_all_zeros() {
        let silence = AudioBuffer::silent(250.0, 44100, 2);
        assert!(silence.is_silent());
        assert_eq!(silence.duration_ms(), 250);
        assert_eq!(silence.frames(), 11025);
    }

    #[test]
    fn test_silent_clamps_zero_and_negative_durations() {
        let zero = AudioBuffer::silent(0.0, 44100, 2);
        assert!(!zero.is_empty());
        assert!(zero.duration_ms() >= 1);
        assert!(zero.is_silent());

        let negative = AudioBuffer::silent(-37.5, 44100, 2);
        assert!(!negative.is_empty());
        assert!(negative.duration_ms() >= 1);
    }

    #[test]
    fn test_silent_fractional_duration_never_rounds_to_empty() {
        // at 8 kHz, 0.01 ms rounds to zero frames before the floor kicks in
        let tiny = AudioBuffer::silent(0.01, 8000, 1);
        assert!(tiny.frames() >= 8); // 1 ms at 8 kHz
        assert!(tiny.is_silent());
    }

    #[test]
    fn test_silent_like_matches_sample_count_exactly() {
        let original = tone_buffer(44100 + 17, 44100, 2);
        let silence = AudioBuffer::silent_like(&original);
        assert_eq!(silence.samples().len(), original.samples().len());
        assert_eq!(silence.frames(), original.frames());
        assert!(silence.is_silent());
    }

    #[test]
    fn test_slice_ms_extracts_expected_frames() {
        let buffer = tone_buffer(44100 * 2, 44100, 2); // 2 seconds
        let slice = buffer.slice_ms(500, 1500).unwrap();
        assert_eq!(slice.frames(), 44100);
        assert_eq!(slice.duration_ms(), 1000);
        // source untouched
        assert_eq!(buffer.frames(), 44100 * 2);
    }

    #[test]
    fn test_slice_ms_rejects_degenerate_range() {
        let buffer = tone_buffer(44100, 44100, 2);
        assert!(buffer.slice_ms(500, 500).is_err());
        assert!(buffer.slice_ms(800, 300).is_err());
    }

    #[test]
    fn test_append_and_pad_preserve_format() {
        let mut buffer = tone_buffer(1000, 44100, 2);
        let more = tone_buffer(500, 44100, 2);
        buffer.append(&more).unwrap();
        assert_eq!(buffer.frames(), 1500);

        buffer.pad_to_frames(2000);
        assert_eq!(buffer.frames(), 2000);
        // padding is silence
        assert!(buffer.samples()[3000..].iter().all(|&s| s == 0));

        // padding never truncates
        buffer.pad_to_frames(100);
        assert_eq!(buffer.frames(), 2000);
    }

    #[test]
    fn test_append_rejects_format_mismatch() {
        let mut stereo = tone_buffer(100, 44100, 2);
        let mono = tone_buffer(100, 44100, 1);
        assert!(stereo.append(&mono).is_err());
    }

    #[test]
    fn test_wav_export_and_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("out.wav");

        let buffer = tone_buffer(4410, 44100, 2); // 100 ms
        export_wav(&buffer, &path).unwrap();
        assert!(path.exists());

        let loaded = read_wav(&path).unwrap();
        assert_eq!(loaded.frames(), buffer.frames());
        assert_eq!(loaded.sample_rate(), 44100);
        assert_eq!(loaded.channels(), 2);
        assert_eq!(loaded.samples(), buffer.samples());
    }

    #[test]
    fn test_audio_config_default_matches_cd_quality() {
        let config = AudioConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channels, 2);
        assert_eq!(config.sample_width, 2);
    }
}

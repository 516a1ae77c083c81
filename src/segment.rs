use log::{debug, info, warn};

use crate::audio::AudioBuffer;
use crate::censor::ProfanityFilter;
use crate::error::Result;
use crate::transcript::Transcript;

/// A contiguous audio slice for one transcript word.
///
/// The originating word index is carried explicitly so that censoring stays
/// aligned even when degenerate words are skipped and the segment sequence
/// becomes shorter than the word sequence.
#[derive(Debug, Clone)]
pub struct WordSegment {
    pub word_index: usize,
    pub audio: AudioBuffer,
}

/// Slice the audio buffer into per-word segments using the transcript's
/// normalized timestamps.
///
/// Each word's start/end is converted to millisecond offsets and clamped
/// into `[0, buffer duration]`. A word whose span is empty after clamping is
/// skipped with a logged diagnostic; the source buffer is never mutated.
pub fn split_into_segments(buffer: &AudioBuffer, transcript: &Transcript) -> Vec<WordSegment> {
    let buffer_ms = buffer.duration_ms() as i64;
    let mut segments = Vec::with_capacity(transcript.words.len());
    let mut skipped = 0usize;

    for (word_index, word) in transcript.words.iter().enumerate() {
        let start_ms = ((word.start * 1000.0).round() as i64).clamp(0, buffer_ms);
        let end_ms = ((word.end * 1000.0).round() as i64).clamp(0, buffer_ms);

        if start_ms >= end_ms {
            warn!(
                "Skipping word '{}' (index {}): degenerate span {} ms..{} ms after clamping",
                word.text, word_index, start_ms, end_ms
            );
            skipped += 1;
            continue;
        }

        match buffer.slice_ms(start_ms as u64, end_ms as u64) {
            Ok(audio) => {
                debug!(
                    "Word '{}': {} ms..{} ms ({} ms)",
                    word.text,
                    start_ms,
                    end_ms,
                    audio.duration_ms()
                );
                segments.push(WordSegment { word_index, audio });
            }
            Err(e) => {
                warn!("Skipping word '{}' (index {}): {}", word.text, word_index, e);
                skipped += 1;
            }
        }
    }

    let total_ms: u64 = segments.iter().map(|s| s.audio.duration_ms()).sum();
    info!(
        "Split {} segments ({} skipped), covering {} ms of {} ms",
        segments.len(),
        skipped,
        total_ms,
        buffer_ms
    );
    segments
}

/// Swap each flagged word's segment for silence of identical duration.
///
/// A segment is flagged when the censored token at its *word index* contains
/// the mask character; skipped words therefore never shift censoring onto
/// their neighbors. Unflagged segments pass through unchanged.
pub fn replace_profanity(
    segments: Vec<WordSegment>,
    censored_text: &str,
    mask_char: char,
) -> Vec<WordSegment> {
    let tokens: Vec<&str> = censored_text.split_whitespace().collect();
    let mut silenced = 0usize;

    let replaced: Vec<WordSegment> = segments
        .into_iter()
        .map(|segment| {
            let flagged = tokens
                .get(segment.word_index)
                .map_or(false, |token| token.contains(mask_char));
            if flagged {
                silenced += 1;
                WordSegment {
                    word_index: segment.word_index,
                    audio: AudioBuffer::silent_like(&segment.audio),
                }
            } else {
                segment
            }
        })
        .collect();

    info!("Silenced {} of {} segments", silenced, replaced.len());
    replaced
}

/// Concatenate segments in order and pad with trailing silence so the
/// output's duration exactly matches the original buffer. The pipeline only
/// pads, it never truncates.
pub fn reassemble(segments: &[WordSegment], original: &AudioBuffer) -> Result<AudioBuffer> {
    let mut output = AudioBuffer::new(Vec::new(), original.sample_rate(), original.channels());
    for segment in segments {
        output.append(&segment.audio)?;
    }

    output.pad_to_frames(original.frames());
    info!(
        "Reassembled {} segments into {} ms track",
        segments.len(),
        output.duration_ms()
    );
    Ok(output)
}

/// Full segment pipeline: slice, silence flagged words, reassemble
pub fn censor_audio(
    buffer: &AudioBuffer,
    transcript: &Transcript,
    filter: &ProfanityFilter,
) -> Result<AudioBuffer> {
    let censored_text = filter.censor(&transcript.full_text);
    debug!("Censored text: {}", censored_text);

    let segments = split_into_segments(buffer, transcript);
    let censored_segments = replace_profanity(segments, &censored_text, filter.mask_char());
    reassemble(&censored_segments, buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{TranscriptStatus, Word};

    const RATE: u32 = 44100;
    const CHANNELS: u16 = 2;

    fn voiced_buffer(duration_ms: u64) -> AudioBuffer {
        let frames = (duration_ms * RATE as u64 / 1000) as usize;
        let samples = (0..frames * CHANNELS as usize)
            .map(|i| ((i % 200) as i16) + 1)
            .collect();
        AudioBuffer::new(samples, RATE, CHANNELS)
    }

    fn transcript(words: Vec<Word>) -> Transcript {
        let full_text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Transcript::new(words, full_text, TranscriptStatus::Completed)
    }

    #[test]
    fn test_split_produces_one_segment_per_word() {
        let buffer = voiced_buffer(2000);
        let t = transcript(vec![
            Word::new("damn", 0.0, 1.0),
            Word::new("hello", 1.0, 2.0),
        ]);

        let segments = split_into_segments(&buffer, &t);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].word_index, 0);
        assert_eq!(segments[1].word_index, 1);
        assert_eq!(segments[0].audio.duration_ms(), 1000);
        assert_eq!(segments[1].audio.duration_ms(), 1000);
    }

    #[test]
    fn test_split_clamps_out_of_range_timestamps() {
        let buffer = voiced_buffer(1000);
        let t = transcript(vec![Word::new("long", -0.5, 4.0)]);

        let segments = split_into_segments(&buffer, &t);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].audio.duration_ms(), 1000);
    }

    #[test]
    fn test_split_skips_degenerate_spans() {
        let buffer = voiced_buffer(2000);
        let t = transcript(vec![
            Word::new("fine", 0.0, 1.0),
            Word::new("glitch", 5.0, 5.0),
            Word::new("after", 1.0, 2.0),
        ]);

        let segments = split_into_segments(&buffer, &t);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].word_index, 0);
        assert_eq!(segments[1].word_index, 2);
    }

    #[test]
    fn test_replace_silences_flagged_segment_only() {
        let buffer = voiced_buffer(2000);
        let t = transcript(vec![
            Word::new("damn", 0.0, 1.0),
            Word::new("hello", 1.0, 2.0),
        ]);
        let segments = split_into_segments(&buffer, &t);

        let censored = replace_profanity(segments, "**** hello", '*');

        assert_eq!(censored.len(), 2);
        assert!(censored[0].audio.is_silent());
        assert_eq!(censored[0].audio.duration_ms(), 1000);
        assert!(!censored[1].audio.is_silent());
    }

    #[test]
    fn test_replace_aligns_by_word_index_after_a_skip() {
        // Word 1 has a degenerate span and is skipped; the profane word 2
        // must still be silenced even though the segment array shrank.
        let buffer = voiced_buffer(3000);
        let t = transcript(vec![
            Word::new("well", 0.0, 1.0),
            Word::new("uh", 1.5, 1.5),
            Word::new("damn", 1.0, 2.0),
        ]);
        let segments = split_into_segments(&buffer, &t);
        assert_eq!(segments.len(), 2);

        let censored = replace_profanity(segments, "well uh ****", '*');

        assert!(!censored[0].audio.is_silent());
        assert_eq!(censored[1].word_index, 2);
        assert!(censored[1].audio.is_silent());
    }

    #[test]
    fn test_reassemble_pads_duration_gap_from_skipped_words() {
        let buffer = voiced_buffer(2000);
        let t = transcript(vec![
            Word::new("short", 0.0, 0.5),
            Word::new("gone", 5.0, 5.0),
        ]);
        let segments = split_into_segments(&buffer, &t);
        assert_eq!(segments.len(), 1);

        let output = reassemble(&segments, &buffer).unwrap();

        assert_eq!(output.duration_ms(), buffer.duration_ms());
        assert_eq!(output.frames(), buffer.frames());
        // the padded tail is silence
        let tail_start = segments[0].audio.samples().len();
        assert!(output.samples()[tail_start..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_reassemble_of_empty_segments_is_full_silence() {
        let buffer = voiced_buffer(500);
        let output = reassemble(&[], &buffer).unwrap();
        assert_eq!(output.frames(), buffer.frames());
        assert!(output.is_silent());
    }

    #[test]
    fn test_censor_audio_end_to_end_scenario() {
        // "damn hello" over a 2 second track: first second silenced, second
        // second untouched, output duration preserved exactly.
        let buffer = voiced_buffer(2000);
        let t = transcript(vec![
            Word::new("damn", 0.0, 1.0),
            Word::new("hello", 1.0, 2.0),
        ]);
        let filter = ProfanityFilter::with_default_words();

        let output = censor_audio(&buffer, &t, &filter).unwrap();

        assert_eq!(output.duration_ms(), 2000);
        assert_eq!(output.frames(), buffer.frames());

        let first_second = RATE as usize * CHANNELS as usize;
        assert!(output.samples()[..first_second].iter().all(|&s| s == 0));
        assert_eq!(
            &output.samples()[first_second..],
            &buffer.samples()[first_second..]
        );
    }

    #[test]
    fn test_censor_audio_duration_invariant_with_gaps_between_words() {
        // Words cover only part of the track; trailing padding restores the
        // original duration.
        let buffer = voiced_buffer(3000);
        let t = transcript(vec![
            Word::new("hi", 0.2, 0.6),
            Word::new("shit", 1.0, 1.4),
        ]);
        let filter = ProfanityFilter::with_default_words();

        let output = censor_audio(&buffer, &t, &filter).unwrap();

        assert_eq!(output.frames(), buffer.frames());
        assert_eq!(output.duration_ms(), 3000);
    }
}

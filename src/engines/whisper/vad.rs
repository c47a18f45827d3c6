use std::path::Path;

use anyhow::{Context, Result, anyhow};
use whisper_rs::{WhisperVadContext, WhisperVadContextParams, WhisperVadParams};

use crate::audio_pipeline::TARGET_SAMPLE_RATE;

/// Longest speech run whisper's VAD may report as one segment, in seconds.
const MAX_SPEECH_SECONDS: f32 = 15.0;

/// Run whisper's Silero VAD over `samples` and silence everything that is not speech.
///
/// The buffer keeps its length so segment timestamps still line up with the source media.
/// Returns `false` when no speech was found at all.
pub(super) fn silence_non_speech(vad_model: &Path, samples: &mut [f32]) -> Result<bool> {
    let model = vad_model
        .to_str()
        .ok_or_else(|| anyhow!("VAD model path is not valid UTF-8: {}", vad_model.display()))?;

    let mut ctx = WhisperVadContext::new(model, WhisperVadContextParams::default())
        .with_context(|| format!("failed to load VAD model from '{model}'"))?;

    let mut params = WhisperVadParams::default();
    params.set_max_speech_duration(MAX_SPEECH_SECONDS);

    let segments = ctx
        .segments_from_samples(params, samples)
        .context("voice activity detection failed")?;

    let mut spans = Vec::new();
    for i in 0..segments.num_segments() {
        // Timestamps are in centiseconds.
        let start_cs = segments
            .get_segment_start_timestamp(i)
            .ok_or_else(|| anyhow!("missing start timestamp for VAD segment {i}"))?;
        let end_cs = segments
            .get_segment_end_timestamp(i)
            .ok_or_else(|| anyhow!("missing end timestamp for VAD segment {i}"))?;
        spans.push((start_cs / 100.0, end_cs / 100.0));
    }

    let ranges = speech_ranges(&spans, TARGET_SAMPLE_RATE as f32, samples.len());
    if ranges.is_empty() {
        return Ok(false);
    }

    silence_outside(samples, &ranges);
    Ok(true)
}

/// Convert speech spans in seconds into sorted, merged sample ranges clamped to `len`.
fn speech_ranges(spans: &[(f32, f32)], sample_rate: f32, len: usize) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = spans
        .iter()
        .map(|&(start, end)| {
            let start_idx = ((start.max(0.0) * sample_rate).floor() as usize).min(len);
            let end_idx = ((end.max(0.0) * sample_rate).ceil() as usize).min(len);
            (start_idx, end_idx)
        })
        .filter(|(start, end)| start < end)
        .collect();

    ranges.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some((_, prev_end)) if start <= *prev_end => *prev_end = (*prev_end).max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Zero every sample outside `ranges` (sorted, non-overlapping).
fn silence_outside(samples: &mut [f32], ranges: &[(usize, usize)]) {
    let mut cursor = 0;
    for &(start, end) in ranges {
        samples[cursor..start].fill(0.0);
        cursor = end;
    }
    samples[cursor..].fill(0.0);
}

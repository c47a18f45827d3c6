use anyhow::{Context, Result};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperSegment, WhisperState};

use crate::engine::EngineRequest;
use crate::opts::Task;
use crate::segments::TimedSegment;

/// Lazily converts the segments of a finished whisper pass.
///
/// Owns the decoding state; each `next()` reads one more segment from it.
pub struct WhisperSegments {
    state: Option<WhisperState>,
    next: i32,
}

impl WhisperSegments {
    pub(super) fn new(state: WhisperState) -> Self {
        Self {
            state: Some(state),
            next: 0,
        }
    }

    /// A sequence with no segments, for audio without speech.
    pub(super) fn empty() -> Self {
        Self {
            state: None,
            next: 0,
        }
    }
}

impl Iterator for WhisperSegments {
    type Item = Result<TimedSegment>;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.state.as_ref()?.get_segment(self.next)?;
        let index = self.next;
        self.next += 1;
        Some(to_timed_segment(segment).with_context(|| format!("failed to read segment {index}")))
    }
}

fn to_timed_segment(segment: WhisperSegment) -> Result<TimedSegment> {
    let text = segment
        .to_str()
        .context("failed to get segment text")?
        .to_owned();

    Ok(TimedSegment {
        start: Some(centiseconds_to_seconds(segment.start_timestamp())),
        end: Some(centiseconds_to_seconds(segment.end_timestamp())),
        text,
    })
}

/// whisper reports timestamps in centiseconds and uses -1 for "unknown".
fn centiseconds_to_seconds(value: i64) -> f64 {
    if value < 0 { 0.0 } else { value as f64 / 100.0 }
}

/// Whisper search strategy for a request: beam search when `beam_size > 1`, greedy otherwise.
pub(super) fn sampling_strategy(request: &EngineRequest) -> SamplingStrategy {
    if request.beam_size > 1 {
        SamplingStrategy::BeamSearch {
            beam_size: clamp_i32(request.beam_size),
            patience: -1.0,
        }
    } else {
        SamplingStrategy::Greedy {
            best_of: clamp_i32(request.best_of),
        }
    }
}

/// Thread count for whisper: the request's, or every CPU when it is 0.
pub(super) fn thread_count(request: &EngineRequest) -> i32 {
    match request.threads {
        0 => clamp_i32(num_cpus::get()),
        n => clamp_i32(n),
    }
}

fn clamp_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn build_full_params(request: &EngineRequest) -> FullParams<'_, '_> {
    let mut params = FullParams::new(sampling_strategy(request));

    params.set_n_threads(thread_count(request));
    params.set_translate(request.task == Task::Translate);
    params.set_language(request.language.as_deref());
    params.set_no_context(true);
    params.set_single_segment(false);

    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    params
}

pub(super) fn run_whisper_full(
    ctx: &WhisperContext,
    request: &EngineRequest,
    samples: &[f32],
) -> Result<WhisperState> {
    let params = build_full_params(request);

    let mut state = ctx
        .create_state()
        .context("failed to create whisper state")?;

    state
        .full(params, samples)
        .context("failed to run whisper full()")?;

    Ok(state)
}

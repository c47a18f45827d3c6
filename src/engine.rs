use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::opts::{ComputePrecision, Device, Opts, Task};
use crate::segments::{TimedSegment, TranscriptionInfo};

/// Pluggable speech-recognition engine used by [`crate::scrivener::Scrivener`].
///
/// An engine turns a media file into a lazy, single-pass sequence of [`TimedSegment`]s plus
/// run-level [`TranscriptionInfo`]. How it decodes media or searches for text is its own
/// business; the pipeline only relies on segments arriving in temporal order and the
/// sequence terminating.
pub trait Engine {
    /// Lazy segment sequence for one run.
    ///
    /// The lifetime ties the sequence to the engine borrow (`&'a mut self`), so engines can
    /// hand out iterators over their own decoding state.
    type Segments<'a>: Iterator<Item = Result<TimedSegment>> + 'a
    where
        Self: 'a;

    /// Reject a request this engine cannot run (e.g. a missing auxiliary model).
    ///
    /// Called before [`Engine::transcribe`]; failures are reported as configuration errors.
    fn validate(&self, _request: &EngineRequest) -> Result<()> {
        Ok(())
    }

    /// Start transcribing `source`.
    ///
    /// Called exactly once per run. Faults raised here, or yielded by the returned sequence,
    /// are reported to the caller unchanged.
    fn transcribe<'a>(
        &'a mut self,
        source: &Path,
        request: &EngineRequest,
    ) -> Result<Transcription<Self::Segments<'a>>>;
}

/// What an engine returns for one run.
pub struct Transcription<S> {
    pub segments: S,
    pub info: TranscriptionInfo,
}

/// Engine-facing subset of [`Opts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub language: Option<String>,
    pub task: Task,
    pub voice_activity_filter: bool,
    pub vad_model: Option<PathBuf>,
    pub beam_size: usize,
    pub best_of: usize,
    pub threads: usize,
    pub device: Device,
    pub compute_precision: ComputePrecision,
}

impl From<&Opts> for EngineRequest {
    fn from(opts: &Opts) -> Self {
        Self {
            language: opts.language.clone(),
            task: opts.task,
            voice_activity_filter: opts.voice_activity_filter,
            vad_model: opts.vad_model.clone(),
            beam_size: opts.beam_size,
            best_of: opts.best_of,
            threads: opts.threads,
            device: opts.device,
            compute_precision: opts.compute_precision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_engine_options() {
        let mut opts = Opts::new("clip.mp4", "small");
        opts.language = Some("vi".to_owned());
        opts.task = Task::Translate;
        opts.threads = 4;
        opts.beam_size = 1;
        opts.best_of = 3;

        let request = EngineRequest::from(&opts);
        assert_eq!(request.language.as_deref(), Some("vi"));
        assert_eq!(request.task, Task::Translate);
        assert_eq!(request.threads, 4);
        assert_eq!(request.beam_size, 1);
        assert_eq!(request.best_of, 3);
        assert!(!request.voice_activity_filter);
    }
}

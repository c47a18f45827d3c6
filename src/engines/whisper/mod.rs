use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use tracing::{debug, info, warn};
use whisper_rs::WhisperContext;

use crate::decoder::decode_file;
use crate::engine::{Engine, EngineRequest, Transcription};
use crate::opts::{ComputePrecision, Device};
use crate::segments::TranscriptionInfo;

mod ctx;
mod logging;
mod segments;
mod vad;

pub use ctx::resolve_model_path;
pub use segments::WhisperSegments;

/// Default directory searched for `ggml-<name>.bin` model files.
pub const DEFAULT_MODELS_DIR: &str = "./models";

/// Built-in engine powered by `whisper-rs` / `whisper.cpp`.
///
/// Media is decoded with Symphonia, optionally passed through whisper's VAD, then transcribed
/// in one full pass. Segments are read lazily from the finished decoding state.
pub struct WhisperEngine {
    ctx: WhisperContext,
    model_path: PathBuf,
}

impl WhisperEngine {
    /// Load a model by name or path. Names resolve inside `models_dir`.
    pub fn new(model: &str, models_dir: impl AsRef<Path>, device: Device) -> Result<Self> {
        ensure!(!model.trim().is_empty(), "model must be provided");

        let model_path = resolve_model_path(model, models_dir.as_ref());
        info!(model, path = %model_path.display(), ?device, "loading whisper model");

        let ctx = ctx::load_context(&model_path, device)?;
        Ok(Self { ctx, model_path })
    }

    /// Access the underlying Whisper context.
    pub fn context(&self) -> &WhisperContext {
        &self.ctx
    }

    /// Model file this engine was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Engine for WhisperEngine {
    type Segments<'a>
        = WhisperSegments
    where
        Self: 'a;

    fn transcribe<'a>(
        &'a mut self,
        source: &Path,
        request: &EngineRequest,
    ) -> Result<Transcription<Self::Segments<'a>>> {
        if request.compute_precision != ComputePrecision::Auto {
            // ggml weights carry their own precision.
            warn!(
                precision = ?request.compute_precision,
                "compute precision is fixed by the model file; ignoring"
            );
        }

        let mut samples = decode_file(source)?;

        if request.voice_activity_filter {
            let Some(vad_model) = &request.vad_model else {
                bail!("the voice-activity filter needs a VAD model path");
            };
            if !vad::silence_non_speech(vad_model, &mut samples)? {
                info!("no speech detected");
                return Ok(Transcription {
                    segments: WhisperSegments::empty(),
                    info: hinted_info(request),
                });
            }
        }

        let info = match &request.language {
            Some(_) => hinted_info(request),
            None => detect_language(&self.ctx, request, &samples)?,
        };
        let state = segments::run_whisper_full(&self.ctx, request, &samples)?;

        Ok(Transcription {
            segments: WhisperSegments::new(state),
            info,
        })
    }
}

/// Info for a run whose language was fixed by the caller: the hint, with full confidence.
fn hinted_info(request: &EngineRequest) -> TranscriptionInfo {
    TranscriptionInfo {
        language: request.language.clone(),
        language_probability: request.language.as_ref().map(|_| 1.0),
    }
}

/// Run whisper's language identification over the first 30 s window of `samples`.
fn detect_language(
    ctx: &WhisperContext,
    request: &EngineRequest,
    samples: &[f32],
) -> Result<TranscriptionInfo> {
    let threads = usize::try_from(segments::thread_count(request)).unwrap_or(1);

    let mut state = ctx
        .create_state()
        .context("failed to create whisper state")?;
    state
        .pcm_to_mel(samples, threads)
        .context("failed to compute mel spectrogram")?;
    let (lang_id, probs) = state
        .lang_detect(0, threads)
        .context("failed to detect language")?;

    let info = detected_info(lang_id, &probs);
    debug!(
        language = ?info.language,
        probability = ?info.language_probability,
        "detected language"
    );
    Ok(info)
}

/// Info for an auto-detected run: the winning language id and its probability.
fn detected_info(lang_id: i32, probs: &[f32]) -> TranscriptionInfo {
    TranscriptionInfo {
        language: whisper_rs::get_lang_str(lang_id).map(str::to_owned),
        language_probability: usize::try_from(lang_id)
            .ok()
            .and_then(|id| probs.get(id))
            .copied(),
    }
}

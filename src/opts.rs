use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Options that control one transcription run.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (services, tests, batch jobs) can construct options programmatically
///
/// Nothing in the pipeline mutates an `Opts` once a run has started.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Media file to transcribe.
    pub source_path: PathBuf,

    /// Model identifier handed to the engine (a model name or a path to model weights).
    pub model: String,

    /// Optional language hint (e.g. `"vi"`, `"en"`). `None` lets the engine auto-detect.
    pub language: Option<String>,

    /// Transcribe verbatim or translate to English.
    pub task: Task,

    /// Where the engine should run inference.
    pub device: Device,

    /// Numeric precision requested from the engine.
    pub compute_precision: ComputePrecision,

    /// Whether to drop non-speech audio before decoding.
    pub voice_activity_filter: bool,

    /// Voice-activity model weights. Required when `voice_activity_filter` is on.
    pub vad_model: Option<PathBuf>,

    /// Inference threads. `0` lets the engine pick.
    pub threads: usize,

    /// Output base name. When `None`, the source file name without its extension is used.
    pub output_base_name: Option<PathBuf>,

    /// Beam width for beam-search decoding.
    pub beam_size: usize,

    /// Number of candidates sampled when not using beam search.
    pub best_of: usize,

    /// Log a progress notice every this many segments. `0` disables notices.
    pub progress_interval: usize,
}

impl Opts {
    /// Options with the defaults for everything but the source and model.
    pub fn new(source_path: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            model: model.into(),
            language: None,
            task: Task::Transcribe,
            device: Device::Cpu,
            compute_precision: ComputePrecision::Auto,
            voice_activity_filter: false,
            vad_model: None,
            threads: 0,
            output_base_name: None,
            beam_size: 5,
            best_of: 5,
            progress_interval: 10,
        }
    }

    /// Reject option combinations no engine can run.
    ///
    /// Errors: [`Error::Config`].
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::config("model must be provided"));
        }
        if self.source_path.as_os_str().is_empty() {
            return Err(Error::config("source path must be provided"));
        }
        if self.beam_size == 0 {
            return Err(Error::config("beam size must be at least 1"));
        }
        if self.best_of == 0 {
            return Err(Error::config("best-of must be at least 1"));
        }
        if self.language.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(Error::config(
                "language hint must not be blank; omit it to auto-detect",
            ));
        }
        if self
            .output_base_name
            .as_ref()
            .is_some_and(|base| base.as_os_str().is_empty())
        {
            return Err(Error::config("output base name must not be empty"));
        }
        if self.voice_activity_filter && self.vad_model.is_none() {
            return Err(Error::config(
                "the voice-activity filter needs a VAD model path",
            ));
        }
        Ok(())
    }

    /// [`Opts::validate`], then make sure the source and any VAD model exist on disk.
    ///
    /// Cheap enough to call before loading a model, so configuration faults surface first.
    ///
    /// Errors: [`Error::Config`], [`Error::InputNotFound`].
    pub fn preflight(&self) -> Result<()> {
        self.validate()?;
        if let Some(vad_model) = self.vad_model.as_deref().filter(|_| self.voice_activity_filter) {
            if !vad_model.is_file() {
                return Err(Error::config(format!(
                    "VAD model not found at '{}'",
                    vad_model.display()
                )));
            }
        }
        if !self.source_path.exists() {
            return Err(Error::InputNotFound {
                path: self.source_path.clone(),
            });
        }
        Ok(())
    }
}

/// What the engine should produce from the speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Task {
    /// Text in the spoken language.
    #[default]
    Transcribe,

    /// English translation of the speech.
    Translate,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Task::Transcribe => "transcribe",
            Task::Translate => "translate",
        }
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transcribe" => Ok(Task::Transcribe),
            "translate" => Ok(Task::Translate),
            other => Err(Error::config(format!(
                "unknown task '{other}', expected 'transcribe' or 'translate'"
            ))),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inference device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

impl FromStr for Device {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "gpu" | "cuda" => Ok(Device::Gpu),
            other => Err(Error::config(format!(
                "unknown device '{other}', expected 'cpu' or 'gpu'"
            ))),
        }
    }
}

/// Numeric precision requested for inference.
///
/// `Auto` means "whatever the model weights were built with".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ComputePrecision {
    #[default]
    Auto,
    Int8,
    Float16,
    Float32,
}

impl FromStr for ComputePrecision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "auto" => Ok(ComputePrecision::Auto),
            "int8" => Ok(ComputePrecision::Int8),
            "float16" | "fp16" => Ok(ComputePrecision::Float16),
            "float32" | "fp32" => Ok(ComputePrecision::Float32),
            other => Err(Error::config(format!(
                "unknown compute precision '{other}'"
            ))),
        }
    }
}

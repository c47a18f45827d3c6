use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use scrivener::engines::WhisperEngine;
use scrivener::engines::whisper::DEFAULT_MODELS_DIR;
use scrivener::{ComputePrecision, Device, Opts, Scrivener, Task, logging};

/// Exit status for any failed run.
const FAILURE_EXIT_CODE: u8 = 2;

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERR] transcription failed:\n{err:?}");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

fn run() -> Result<()> {
    let params = Params::parse();
    let opts = params.to_opts();

    // Fail on bad options or a missing source before paying for model loading.
    opts.preflight()?;

    let engine = WhisperEngine::new(&params.model, &params.models_dir, params.device)?;
    let mut scrivener = Scrivener::new(engine);

    let manifest = scrivener.run(&opts)?;

    let json = serde_json::to_string_pretty(&manifest).context("failed to encode manifest")?;
    println!("{json}");
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "scrivener")]
#[command(about = "Transcribe audio/video into .srt, .vtt and .txt files")]
#[command(after_help = "\
On success the run manifest is printed to stdout as JSON.
On failure `[ERR]` and the error chain go to stderr and the exit status is 2.

Environment:
  SCRIVENER_LOG=debug     log filter for the JSON logs on stderr (default: info)
  RUST_BACKTRACE=1        also print a backtrace with failures")]
struct Params {
    /// Audio or video file (mp3, wav, mp4, m4a, ...).
    pub src: PathBuf,

    /// Model name (tiny, small, large-v3, ...) or path to a ggml model file.
    #[arg(short = 'm', long = "model", default_value = "small")]
    pub model: String,

    /// Directory searched for `ggml-<name>.bin` when `--model` is a name.
    #[arg(long = "models-dir", default_value = DEFAULT_MODELS_DIR)]
    pub models_dir: PathBuf,

    /// Spoken language (e.g. `vi`). Auto-detected when omitted.
    #[arg(short = 'l', long = "language")]
    pub language: Option<String>,

    #[arg(long = "task", value_enum, default_value_t = Task::Transcribe)]
    pub task: Task,

    #[arg(long = "device", value_enum, default_value_t = Device::Cpu)]
    pub device: Device,

    #[arg(
        long = "compute-precision",
        alias = "compute-type",
        value_enum,
        default_value_t = ComputePrecision::Auto
    )]
    pub compute_precision: ComputePrecision,

    /// Silence non-speech audio before transcribing (needs `--vad-model`).
    #[arg(long = "vad", default_value_t = false)]
    pub vad: bool,

    /// Whisper VAD model file (e.g. ./models/ggml-silero-v6.2.0.bin).
    #[arg(long = "vad-model")]
    pub vad_model: Option<PathBuf>,

    /// Inference threads; 0 = one per CPU.
    #[arg(short = 't', long = "threads", default_value_t = 0)]
    pub threads: usize,

    /// Output base name; defaults to the source file name without its extension.
    #[arg(short = 'o', long = "out-prefix")]
    pub out_prefix: Option<PathBuf>,

    #[arg(long = "beam-size", default_value_t = 5)]
    pub beam_size: usize,

    #[arg(long = "best-of", default_value_t = 5)]
    pub best_of: usize,

    /// Log a progress notice every N segments; 0 disables it.
    #[arg(long = "progress-every", default_value_t = 10)]
    pub progress_every: usize,
}

impl Params {
    fn to_opts(&self) -> Opts {
        Opts {
            source_path: self.src.clone(),
            model: self.model.clone(),
            language: self.language.clone(),
            task: self.task,
            device: self.device,
            compute_precision: self.compute_precision,
            voice_activity_filter: self.vad,
            vad_model: self.vad_model.clone(),
            threads: self.threads,
            output_base_name: self.out_prefix.clone(),
            beam_size: self.beam_size,
            best_of: self.best_of,
            progress_interval: self.progress_every,
        }
    }
}

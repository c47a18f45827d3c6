//! High-level API for running transcriptions with Scrivener.
//!
//! We expose a single entry point (`Scrivener`) that wraps an [`Engine`] and drives the rest of
//! the pipeline for each run:
//!
//! validate options → check the source → engine → drain segments → export SRT/VTT/TXT → manifest
//!
//! The intent is:
//! - We load the engine once (model loading is expensive).
//! - We reuse it for any number of runs.
//! - Every run renders all three output files from a single drained segment list.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::consumer::{Drained, drain_segments};
use crate::engine::{Engine, EngineRequest, Transcription};
use crate::error::{Error, Result};
use crate::export::{OutputPaths, default_base_name, export};
use crate::opts::Opts;

/// What a successful run produced.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OutputManifest {
    pub srt: PathBuf,
    pub vtt: PathBuf,
    pub txt: PathBuf,
    pub language: Option<String>,
    pub language_probability: Option<f32>,
    pub segments_count: usize,
}

/// The main transcription entry point.
///
/// `Scrivener` owns the engine. Construct it once and call [`Scrivener::run`] per input.
pub struct Scrivener<E: Engine> {
    engine: E,
}

impl<E: Engine> Scrivener<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Transcribe `opts.source_path` and write `<base>.srt`, `<base>.vtt` and `<base>.txt`.
    ///
    /// The engine is invoked once; nothing is retried.
    ///
    /// Errors:
    /// - [`Error::Config`] when `opts` or the engine rejects the configuration (before the
    ///   engine runs)
    /// - [`Error::InputNotFound`] when the source does not exist (before the engine runs)
    /// - [`Error::Engine`] when the engine fails to start or fails mid-stream; no output is
    ///   written in that case
    /// - [`Error::Write`] when an output file cannot be written; earlier files stay on disk
    pub fn run(&mut self, opts: &Opts) -> Result<OutputManifest> {
        opts.preflight()?;

        let base = opts
            .output_base_name
            .clone()
            .unwrap_or_else(|| default_base_name(&opts.source_path));
        let paths = OutputPaths::derive(&base);

        let request = EngineRequest::from(opts);
        debug!(?request, "engine request");
        self.engine
            .validate(&request)
            .map_err(|err| Error::config(format!("{err:#}")))?;
        info!(source = %opts.source_path.display(), "transcribing");

        let Transcription { segments, info } = self
            .engine
            .transcribe(&opts.source_path, &request)
            .map_err(Error::engine)?;

        let Drained { segments, progress } =
            drain_segments(segments, opts.progress_interval).map_err(Error::engine)?;
        debug!(?progress, "segment stream drained");

        export(&segments, &paths)?;

        info!(
            segments = segments.len(),
            language = info.language.as_deref().unwrap_or("unknown"),
            language_probability = ?info.language_probability,
            "done"
        );

        Ok(OutputManifest {
            srt: paths.srt,
            vtt: paths.vtt,
            txt: paths.txt,
            language: info.language,
            language_probability: info.language_probability,
            segments_count: segments.len(),
        })
    }

    /// Access the configured engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Access the configured engine mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Give the engine back.
    pub fn into_engine(self) -> E {
        self.engine
    }
}

//! `scrivener` — turn speech-recognition output into synchronized subtitle and transcript files.
//!
//! One run drains an engine's segment stream once and renders the same ordered segment list as:
//! - `<base>.srt` (numbered SubRip subtitles)
//! - `<base>.vtt` (WebVTT subtitles)
//! - `<base>.txt` (plain transcript)
//!
//! The speech-recognition engine is pluggable through [`engine::Engine`]. A whisper.cpp-backed
//! engine ships behind the `whisper` feature.

// High-level API (most consumers should start here).
pub mod opts;
pub mod scrivener;

// Engine interface and built-in engines.
pub mod engine;
#[cfg(feature = "whisper")]
pub mod engines;

// Segment data structures and stream draining.
pub mod consumer;
pub mod segments;

// Output selection, timestamp formatting and export.
pub mod export;
pub mod output_type;
pub mod segment_encoder;
pub mod timestamp;

// Output encoders that serialize segments into each format.
pub mod srt_encoder;
pub mod txt_encoder;
pub mod vtt_encoder;

// Media decoding for the built-in engine.
#[cfg(feature = "whisper")]
pub mod audio_pipeline;
#[cfg(feature = "whisper")]
pub mod decoder;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use crate::error::{Error, Result};
pub use crate::opts::{ComputePrecision, Device, Opts, Task};
pub use crate::scrivener::{OutputManifest, Scrivener};
pub use crate::segments::{TimedSegment, TranscriptionInfo};

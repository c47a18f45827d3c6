/// Engine backed by `whisper-rs` / `whisper.cpp`.
pub mod whisper;

pub use whisper::WhisperEngine;

use std::borrow::Cow;

use serde::Serialize;

/// One unit of recognized speech, in the order the engine produced it.
///
/// Engines are allowed to leave timing out; a missing `start` or `end` is treated as `0.0`
/// everywhere we render it.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TimedSegment {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub text: String,
}

impl TimedSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            text: text.into(),
        }
    }

    /// Start offset in seconds, `0.0` when the engine did not report one.
    pub fn start_seconds(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }

    /// End offset in seconds, `0.0` when the engine did not report one.
    pub fn end_seconds(&self) -> f64 {
        self.end.unwrap_or(0.0)
    }

    /// Text as it appears in every output file: trimmed, on a single line.
    ///
    /// Interior line breaks (and the whitespace around them) collapse to one space, so one
    /// segment is always one transcript line and one subtitle block.
    pub fn output_text(&self) -> Cow<'_, str> {
        let text = self.text.trim();
        if !text.contains(['\n', '\r']) {
            return Cow::Borrowed(text);
        }

        let lines: Vec<&str> = text
            .split(['\n', '\r'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Cow::Owned(lines.join(" "))
    }
}

/// Run-level metadata the engine reports once per transcription.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct TranscriptionInfo {
    /// Detected (or requested) language code, e.g. `"vi"`.
    pub language: Option<String>,

    /// Confidence of the language detection in `[0, 1]`.
    pub language_probability: Option<f32>,
}

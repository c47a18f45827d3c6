/// The output formats every run produces.
///
/// Each variant maps to a concrete `SegmentEncoder` and to the extension appended to the run's
/// base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// Numbered SubRip subtitles.
    Srt,

    /// WebVTT subtitles.
    Vtt,

    /// Plain transcript, one line per segment.
    Txt,
}

impl OutputType {
    /// All formats, in the order they are written.
    pub const ALL: [OutputType; 3] = [OutputType::Srt, OutputType::Vtt, OutputType::Txt];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Srt => "srt",
            OutputType::Vtt => "vtt",
            OutputType::Txt => "txt",
        }
    }
}

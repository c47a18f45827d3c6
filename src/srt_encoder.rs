use std::io::{self, Write};

use crate::segment_encoder::{SegmentEncoder, closed_error};
use crate::segments::TimedSegment;
use crate::timestamp::format_indexed;

/// A `SegmentEncoder` that writes numbered SubRip (SRT) blocks.
///
/// Cue numbers start at 1 for every encoder and advance by one per written segment, including
/// segments whose text is empty, so the numbering never has gaps.
pub struct SrtEncoder<W: Write> {
    w: W,

    /// Number of the next block.
    next_index: usize,

    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            next_index: 1,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    fn write_segment(&mut self, seg: &TimedSegment) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }

        let start = format_indexed(seg.start_seconds());
        let end = format_indexed(seg.end_seconds());

        writeln!(&mut self.w, "{}", self.next_index)?;
        writeln!(&mut self.w, "{start} --> {end}")?;
        writeln!(&mut self.w, "{}", seg.output_text())?;
        writeln!(&mut self.w)?;

        self.next_index += 1;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

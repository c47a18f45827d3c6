use std::io::{self, Write};

use crate::segment_encoder::{SegmentEncoder, closed_error};
use crate::segments::TimedSegment;

/// A `SegmentEncoder` that writes a plain transcript: one trimmed line per segment, no timing.
pub struct TxtEncoder<W: Write> {
    w: W,
    closed: bool,
}

impl<W: Write> TxtEncoder<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> SegmentEncoder for TxtEncoder<W> {
    fn write_segment(&mut self, seg: &TimedSegment) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }

        writeln!(&mut self.w, "{}", seg.output_text())
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

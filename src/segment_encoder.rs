use std::io;

use crate::segments::TimedSegment;

/// A streaming writer for one output format.
///
/// Encoders are fed segments in arrival order and must be closed once at the end so that
/// formats with a preamble still produce a well-formed file when no segment was written.
/// Errors are plain `io::Error`s; the exporter attaches the file path.
pub trait SegmentEncoder {
    fn write_segment(&mut self, seg: &TimedSegment) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}

pub(crate) fn closed_error() -> io::Error {
    io::Error::other("cannot write segment: encoder is already closed")
}

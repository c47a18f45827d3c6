//! Drain an engine's lazy segment sequence into memory.
//!
//! The engine hands us a single-pass iterator. We pull it exactly once, in arrival order, and
//! keep every segment so the exporter can render all output formats from the same list.

use tracing::info;

use crate::segments::TimedSegment;

/// Running progress of a drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Segments received so far.
    pub count: usize,

    /// Progress notices emitted so far.
    pub notices: usize,

    /// Segment count at the most recent notice, if any.
    pub last_notified_at: Option<usize>,
}

impl Progress {
    /// Record one more segment. Returns `true` when a notice is due.
    ///
    /// An `interval` of zero never produces notices.
    pub fn record(&mut self, interval: usize) -> bool {
        self.count += 1;

        if interval == 0 || self.count % interval != 0 {
            return false;
        }

        self.notices += 1;
        self.last_notified_at = Some(self.count);
        true
    }
}

/// Result of draining an engine sequence.
#[derive(Debug, Clone, Default)]
pub struct Drained {
    pub segments: Vec<TimedSegment>,
    pub progress: Progress,
}

impl Drained {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Consume `segments` once and collect them in arrival order.
///
/// A progress notice is logged every `progress_interval` segments (0 disables them).
///
/// The first error pulled from the sequence ends the drain and is returned as-is; we never pull
/// again after a failure.
pub fn drain_segments<I>(segments: I, progress_interval: usize) -> anyhow::Result<Drained>
where
    I: IntoIterator<Item = anyhow::Result<TimedSegment>>,
{
    let mut drained = Drained::default();

    for segment in segments {
        let segment = segment?;

        if drained.progress.record(progress_interval) {
            info!(segments = drained.progress.count, "received segments");
        }

        drained.segments.push(segment);
    }

    Ok(drained)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> impl Iterator<Item = anyhow::Result<TimedSegment>> {
        (0..n).map(|i| Ok(TimedSegment::new(i as f64, i as f64 + 1.0, format!("seg {i}"))))
    }

    #[test]
    fn preserves_arrival_order_without_sorting() -> anyhow::Result<()> {
        let out_of_order = vec![
            Ok(TimedSegment::new(5.0, 6.0, "late")),
            Ok(TimedSegment::new(1.0, 2.0, "early")),
        ];
        let drained = drain_segments(out_of_order, 10)?;
        let texts: Vec<_> = drained.segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["late", "early"]);
        Ok(())
    }

    #[test]
    fn counts_notices_every_interval() -> anyhow::Result<()> {
        let drained = drain_segments(numbered(25), 10)?;
        assert_eq!(drained.len(), 25);
        assert_eq!(drained.progress.count, 25);
        assert_eq!(drained.progress.notices, 2);
        assert_eq!(drained.progress.last_notified_at, Some(20));
        Ok(())
    }

    #[test]
    fn zero_interval_disables_notices() -> anyhow::Result<()> {
        let drained = drain_segments(numbered(7), 0)?;
        assert_eq!(drained.progress.count, 7);
        assert_eq!(drained.progress.notices, 0);
        assert_eq!(drained.progress.last_notified_at, None);
        Ok(())
    }

    #[test]
    fn empty_sequence_drains_to_nothing() -> anyhow::Result<()> {
        let drained = drain_segments(numbered(0), 1)?;
        assert!(drained.is_empty());
        assert_eq!(drained.progress, Progress::default());
        Ok(())
    }

    #[test]
    fn stops_pulling_at_the_first_fault() {
        let mut pulled = 0usize;
        let source = (0..10).map(|i| {
            pulled += 1;
            if i == 3 {
                Err(anyhow::anyhow!("engine fault at {i}"))
            } else {
                Ok(TimedSegment::new(0.0, 0.0, "ok"))
            }
        });

        let err = drain_segments(source, 1).unwrap_err();
        assert_eq!(err.to_string(), "engine fault at 3");
        assert_eq!(pulled, 4);
    }
}

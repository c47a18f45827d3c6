//! Write the three run artifacts from one materialized segment list.

use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::output_type::OutputType;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::TimedSegment;
use crate::srt_encoder::SrtEncoder;
use crate::txt_encoder::TxtEncoder;
use crate::vtt_encoder::VttEncoder;

/// Output file locations for one run.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub srt: PathBuf,
    pub vtt: PathBuf,
    pub txt: PathBuf,
}

impl OutputPaths {
    /// Append `.srt`, `.vtt` and `.txt` to `base`.
    ///
    /// The extension is appended rather than substituted, so a base of `talk.v2` yields
    /// `talk.v2.srt`.
    pub fn derive(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            srt: with_appended_extension(base, OutputType::Srt),
            vtt: with_appended_extension(base, OutputType::Vtt),
            txt: with_appended_extension(base, OutputType::Txt),
        }
    }

    pub fn get(&self, output_type: OutputType) -> &Path {
        match output_type {
            OutputType::Srt => &self.srt,
            OutputType::Vtt => &self.vtt,
            OutputType::Txt => &self.txt,
        }
    }
}

/// Default base name for a source: its file name without the final extension.
///
/// The result is relative, so outputs land in the working directory rather than next to the
/// source (`/media/talk.mp4` → `talk`).
pub fn default_base_name(source: &Path) -> PathBuf {
    source
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("transcript"))
}

fn with_appended_extension(base: &Path, output_type: OutputType) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(output_type.extension());
    PathBuf::from(name)
}

/// Write every output format for `segments` to `paths`, in SRT, VTT, TXT order.
///
/// Each file is created or truncated. Writing is not transactional: if one file fails, the
/// files before it stay on disk and the ones after it are not attempted.
///
/// Errors: [`Error::Write`] naming the file that failed.
pub fn export(segments: &[TimedSegment], paths: &OutputPaths) -> Result<()> {
    for output_type in OutputType::ALL {
        let path = paths.get(output_type);
        info!(path = %path.display(), "writing");
        write_file(path, output_type, segments)?;
    }
    Ok(())
}

/// Write a single output format to `path`.
///
/// Errors: [`Error::Write`].
pub fn write_file(path: &Path, output_type: OutputType, segments: &[TimedSegment]) -> Result<()> {
    let file = File::create(path).map_err(|err| Error::write(path, err))?;
    let writer = BufWriter::new(file);

    // We keep this explicit (no trait objects) so each encoder is monomorphized over the file.
    let res = match output_type {
        OutputType::Srt => encode_all(&mut SrtEncoder::new(writer), segments),
        OutputType::Vtt => encode_all(&mut VttEncoder::new(writer), segments),
        OutputType::Txt => encode_all(&mut TxtEncoder::new(writer), segments),
    };

    res.map_err(|err| Error::write(path, err))
}

/// Feed every segment into `encoder` and close it.
pub fn encode_all<E: SegmentEncoder>(
    encoder: &mut E,
    segments: &[TimedSegment],
) -> std::io::Result<()> {
    for seg in segments {
        encoder.write_segment(seg)?;
    }
    encoder.close()
}

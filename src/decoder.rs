//! Decode a media file (audio or video container) into mono 16 kHz `f32` samples.
//!
//! - probing picks the first decodable audio track
//! - packets from other tracks are skipped
//! - `audio_pipeline` handles downmix + resample
//!
//! The whole file is decoded up front: the engine runs a single full pass over the result.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::audio_pipeline::AudioPipeline;

/// Decode `path` into mono samples at [`crate::audio_pipeline::TARGET_SAMPLE_RATE`].
pub fn decode_file(path: &Path) -> Result<Vec<f32>> {
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;

    let mss = MediaSourceStream::new(
        Box::new(file),
        MediaSourceStreamOptions {
            // Symphonia expects a power-of-two buffer > 32KiB for good probing behavior.
            buffer_len: 256 * 1024,
        },
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let (mut format, track) = probe_default_track(mss, &hint)?;
    let mut decoder = make_decoder_for_track(&track)?;
    let mut pipeline = AudioPipeline::new();
    let mut skipped_frames = 0usize;

    while let Some(packet) = next_packet(&mut format)? {
        if packet.track_id() != track.id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => pipeline
                .push_decoded(&decoded)
                .context("audio pipeline failed while processing decoded samples")?,

            // Corrupted frame; decoding can continue.
            Err(SymphoniaError::DecodeError(_)) => skipped_frames += 1,

            // Truncated tail; keep what we have.
            Err(SymphoniaError::IoError(_)) => break,

            Err(e) => return Err(anyhow!(e)).context("decoder failure"),
        }
    }

    let samples = pipeline.finish()?;
    debug!(
        path = %path.display(),
        samples = samples.len(),
        skipped_frames,
        "decoded media"
    );
    Ok(samples)
}

/// Probe the container and pick the first track that looks decodable and has a sample rate.
fn probe_default_track(
    mss: MediaSourceStream,
    hint: &Hint,
) -> Result<(Box<dyn FormatReader>, Track)> {
    let probed = symphonia::default::get_probe()
        .format(
            hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| anyhow!(e))
        .context("failed to probe media stream")?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found"))?;

    Ok((format, track))
}

fn make_decoder_for_track(track: &Track) -> Result<Box<dyn Decoder>> {
    symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| anyhow!(e))
        .context("failed to create decoder for audio track")
}

/// Read the next packet; `Ok(None)` at end of stream.
fn next_packet(format: &mut Box<dyn FormatReader>) -> Result<Option<Packet>> {
    match format.next_packet() {
        Ok(p) => Ok(Some(p)),
        Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(e) => Err(anyhow!(e)).context("failed reading packet"),
    }
}

//! Normalize decoded PCM into the mono 16 kHz `f32` buffer whisper expects.
//!
//! Responsibilities:
//! - Convert Symphonia-decoded PCM into interleaved `f32`
//! - Downmix to mono
//! - Resample to the target rate when the source differs
//! - Accumulate the whole result; the engine runs one full pass over it

use anyhow::{Context, Result, anyhow, bail};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, WindowFunction};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};

/// Target mono sample rate (Hz).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Source frames fed to the resampler per `process()` call.
const RESAMPLER_BLOCK_FRAMES: usize = 2048;

/// Accumulates decoded audio as mono samples at [`TARGET_SAMPLE_RATE`].
pub struct AudioPipeline {
    // Scratch buffer used to copy decoded PCM into interleaved `f32`.
    sample_buf_f32: Option<SampleBuffer<f32>>,

    // Created on the first buffer whose rate differs from the target.
    resampler: Option<SincFixedIn<f32>>,

    // Mono source samples waiting for a full resampler block.
    pending: Vec<f32>,

    // Mono samples at the target rate.
    out: Vec<f32>,
}

impl Default for AudioPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPipeline {
    pub fn new() -> Self {
        Self {
            sample_buf_f32: None,
            resampler: None,
            pending: Vec::new(),
            out: Vec::new(),
        }
    }

    /// Push one decoded buffer through downmix and (if needed) resampling.
    pub fn push_decoded(&mut self, decoded: &AudioBufferRef<'_>) -> Result<()> {
        let (interleaved, src_rate, channels) =
            decoded_to_interleaved_f32(decoded, &mut self.sample_buf_f32)?;
        let mono = downmix_to_mono(&interleaved, channels);
        self.push_mono(&mono, src_rate)
    }

    fn push_mono(&mut self, mono: &[f32], src_rate: u32) -> Result<()> {
        if src_rate == TARGET_SAMPLE_RATE && self.resampler.is_none() {
            self.out.extend_from_slice(mono);
            return Ok(());
        }

        self.ensure_resampler(src_rate)?;
        self.pending.extend_from_slice(mono);

        while self.pending.len() >= RESAMPLER_BLOCK_FRAMES {
            let block: Vec<f32> = self.pending.drain(..RESAMPLER_BLOCK_FRAMES).collect();
            self.resample_block(block)?;
        }
        Ok(())
    }

    /// Flush the resampler tail and return every sample collected so far.
    pub fn finish(mut self) -> Result<Vec<f32>> {
        if self.resampler.is_some() && !self.pending.is_empty() {
            // rubato expects exact block sizes; pad the remainder with silence.
            let mut block = std::mem::take(&mut self.pending);
            block.resize(RESAMPLER_BLOCK_FRAMES, 0.0);
            self.resample_block(block)?;
        }
        Ok(self.out)
    }

    fn ensure_resampler(&mut self, src_rate: u32) -> Result<()> {
        if self.resampler.is_some() {
            return Ok(());
        }
        if src_rate == 0 {
            bail!("decoded audio reported a zero sample rate");
        }

        let rs = SincFixedIn::<f32>::new(
            TARGET_SAMPLE_RATE as f64 / src_rate as f64,
            2.0,
            SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: rubato::SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            },
            RESAMPLER_BLOCK_FRAMES,
            1,
        )
        .map_err(|e| anyhow!(e))
        .context("failed to init resampler")?;

        self.resampler = Some(rs);
        Ok(())
    }

    fn resample_block(&mut self, block: Vec<f32>) -> Result<()> {
        let rs = self
            .resampler
            .as_mut()
            .ok_or_else(|| anyhow!("resampler not initialized"))?;

        let input = vec![block];
        let out = rs
            .process(&input, None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;

        let [mono] = out.as_slice() else {
            bail!("expected mono output from resampler");
        };
        self.out.extend_from_slice(mono);
        Ok(())
    }
}

fn decoded_to_interleaved_f32(
    decoded: &AudioBufferRef<'_>,
    sample_buf_f32: &mut Option<SampleBuffer<f32>>,
) -> Result<(Vec<f32>, u32, usize)> {
    let spec = *decoded.spec();

    // Decoders may hand out a larger buffer later in the stream; grow the scratch buffer then.
    let needed = decoded.capacity() * spec.channels.count();
    if sample_buf_f32
        .as_ref()
        .is_none_or(|buf| buf.capacity() < needed)
    {
        *sample_buf_f32 = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
    }

    let buf = sample_buf_f32
        .as_mut()
        .ok_or_else(|| anyhow!("sample buffer not initialized"))?;

    buf.copy_interleaved_ref(decoded.clone());

    let channels = spec.channels.count();
    if channels == 0 {
        bail!("decoded audio had zero channels");
    }

    Ok((buf.samples().to_vec(), spec.rate, channels))
}

/// Downmix interleaved samples into mono by averaging channels.
fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

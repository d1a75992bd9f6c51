//! WAV resource loading.

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::{
    error::{LooperError, Result},
    track::{Frame, CHANNELS, SILENCE},
};

use super::converter::frames_from_interleaved;

/// Read a mono or stereo WAV file as frames at `expected_rate`.
///
/// Integer samples are rescaled to 16 bits, float samples saturate.
pub fn load_frames(path: impl AsRef<Path>, expected_rate: u32) -> Result<Vec<Frame>> {
    let path = path.as_ref();
    let unavailable = |source| LooperError::ResourceUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = WavReader::open(path).map_err(unavailable)?;
    let spec = reader.spec();
    if spec.sample_rate != expected_rate {
        return Err(LooperError::InvalidSampleRate {
            expected: expected_rate,
            found: spec.sample_rate,
        });
    }
    if spec.channels == 0 || spec.channels as usize > CHANNELS {
        return Err(LooperError::UnsupportedChannelCount(spec.channels));
    }

    let samples: Vec<i16> = match spec.sample_format {
        SampleFormat::Int => {
            let bits = spec.bits_per_sample as u32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| rescale_int(s, bits)))
                .collect::<std::result::Result<_, _>>()
                .map_err(unavailable)?
        }
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(float_to_i16))
            .collect::<std::result::Result<_, _>>()
            .map_err(unavailable)?,
    };

    let frames = frames_from_interleaved(&samples, spec.channels as usize);
    log::debug!(
        "Loaded {} frames from {} ({} ch, {} bit)",
        frames.len(),
        path.display(),
        spec.channels,
        spec.bits_per_sample
    );
    Ok(frames)
}

/// Trim or zero-pad `frames` to exactly `len`
pub fn fit_to_length(mut frames: Vec<Frame>, len: usize) -> Vec<Frame> {
    frames.resize(len, SILENCE);
    frames
}

#[inline]
fn rescale_int(sample: i32, bits: u32) -> i16 {
    if bits > 16 {
        (sample >> (bits - 16)) as i16
    } else {
        (sample << (16 - bits)) as i16
    }
}

#[inline]
fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

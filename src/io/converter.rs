use cpal::{FromSample, Sample};

use crate::track::{Frame, CHANNELS};

/// One device frame of any channel count to a stereo frame.
///
/// Mono is duplicated, extra channels are ignored.
#[inline]
pub fn frame_from_interleaved<T>(device_frame: &[T]) -> Frame
where
    T: Sample,
    i16: FromSample<T>,
{
    match device_frame {
        [] => [0; CHANNELS],
        [mono] => {
            let s = i16::from_sample(*mono);
            [s, s]
        }
        [left, right, ..] => [i16::from_sample(*left), i16::from_sample(*right)],
    }
}

/// Write a stereo frame into one device frame.
///
/// A mono device gets the channel mean; channels past the second are silent.
#[inline]
pub fn write_interleaved<T>(frame: &Frame, device_frame: &mut [T])
where
    T: Sample + FromSample<i16>,
{
    match device_frame {
        [] => {}
        [mono] => {
            let mean = ((frame[0] as i32 + frame[1] as i32) / 2) as i16;
            *mono = T::from_sample(mean);
        }
        [left, right, rest @ ..] => {
            *left = T::from_sample(frame[0]);
            *right = T::from_sample(frame[1]);
            rest.fill(T::EQUILIBRIUM);
        }
    }
}

/// Interleaved 16-bit samples to frames
pub fn frames_from_interleaved(samples: &[i16], channels: usize) -> Vec<Frame> {
    samples
        .chunks_exact(channels.max(1))
        .map(frame_from_interleaved)
        .collect()
}

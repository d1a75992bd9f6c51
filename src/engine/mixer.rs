//! Averaging mixer for live input and looping tracks.

/*
Mixing by Mean
==============

Each output sample is the arithmetic mean of the live input and every
playing track at the same instant:

    out = (in + t1 + t2 + ... + tn) / (n + 1)

Summing plain i16 values would clip as soon as two loud tracks line up;
dividing by the source count keeps the result inside the sample range, at
the cost of every source getting quieter as tracks are added.

The sum is taken in i32 and divided with truncation toward zero.
*/

use crate::track::{Frame, PlayingTrack, CHANNELS};

/// Widened per-channel accumulator
pub type Accumulator = [i32; CHANNELS];

#[inline]
fn widen(frame: &Frame) -> Accumulator {
    let mut acc = [0; CHANNELS];
    for (a, &s) in acc.iter_mut().zip(frame) {
        *a = s as i32;
    }
    acc
}

/// Add `frames` into `acc` sample by sample
#[inline]
pub fn accumulate<'a>(acc: &mut [Accumulator], frames: impl IntoIterator<Item = &'a Frame>) {
    for (a, frame) in acc.iter_mut().zip(frames) {
        for (ch, &s) in a.iter_mut().zip(frame) {
            *ch += s as i32;
        }
    }
}

/// Mean of `input` and each track's window starting at `from_frame`.
///
/// `scratch` must hold at least `input.len()` accumulators; no allocation.
pub fn mix_tracks(
    input: &[Frame],
    tracks: &[PlayingTrack],
    from_frame: u64,
    scratch: &mut [Accumulator],
    out: &mut [Frame],
) {
    debug_assert_eq!(input.len(), out.len());
    debug_assert!(scratch.len() >= input.len());

    let frames = input.len();
    let scratch = &mut scratch[..frames];
    for (a, frame) in scratch.iter_mut().zip(input) {
        *a = widen(frame);
    }

    for track in tracks {
        accumulate(scratch, track.window(from_frame, frames).flatten());
    }

    let sources = tracks.len() as i32 + 1;
    for (o, a) in out.iter_mut().zip(scratch.iter()) {
        for (s, &sum) in o.iter_mut().zip(a) {
            *s = (sum / sources) as i16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i16, len: usize) -> PlayingTrack {
        PlayingTrack::new(vec![[value, -value]; len], 0).unwrap()
    }

    #[test]
    fn test_no_tracks_passes_input_through() {
        let input = [[100, -7], [3, 4]];
        let mut scratch = [[0; CHANNELS]; 2];
        let mut out = [[0; CHANNELS]; 2];

        mix_tracks(&input, &[], 0, &mut scratch, &mut out);

        assert_eq!(out, input);
    }

    #[test]
    fn test_mean_of_input_and_tracks() {
        let input = [[30, -30]; 4];
        let tracks = [constant(0, 8), constant(60, 8)];
        let mut scratch = [[0; CHANNELS]; 4];
        let mut out = [[0; CHANNELS]; 4];

        mix_tracks(&input, &tracks, 5, &mut scratch, &mut out);

        assert_eq!(out, [[30, -30]; 4]);
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        let input = [[1, -1]];
        let tracks = [constant(0, 2)];
        let mut scratch = [[0; CHANNELS]; 1];
        let mut out = [[9; CHANNELS]; 1];

        mix_tracks(&input, &tracks, 0, &mut scratch, &mut out);

        assert_eq!(out, [[0, 0]]);
    }

    #[test]
    fn test_extremes_stay_in_range() {
        let input = [[i16::MAX, i16::MIN]; 3];
        let tracks = [constant(i16::MAX, 5), constant(i16::MAX, 7)];
        let mut scratch = [[0; CHANNELS]; 3];
        let mut out = [[0; CHANNELS]; 3];

        mix_tracks(&input, &tracks, 0, &mut scratch, &mut out);

        assert_eq!(out[0][0], i16::MAX);
        // (MIN - MAX - MAX) / 3
        assert_eq!(out[0][1], ((i16::MIN as i32 - 2 * i16::MAX as i32) / 3) as i16);
    }

    #[test]
    fn test_tracks_read_at_their_own_phase() {
        let ramp = PlayingTrack::new((0..4).map(|i| [i * 10, 0]).collect::<Vec<Frame>>(), 0).unwrap();
        let input = [[0, 0]; 3];
        let mut scratch = [[0; CHANNELS]; 3];
        let mut out = [[0; CHANNELS]; 3];

        // Frames 3, 4, 5 -> offsets 3, 0, 1
        mix_tracks(&input, &[ramp], 3, &mut scratch, &mut out);

        assert_eq!(out, [[15, 0], [0, 0], [5, 0]]);
    }
}

//! Post-production: snapping a finished capture to whole beats.

/*
Rounding
========

A finished capture always spans whole beats: it starts on the beat
boundary at or before Start (pre-roll) and ends on the boundary at or after
Stop. Quantization decides whether the first and last of those beats belong
to the take.

    first           start_rec                      stop_rec
      |----- beat ----|--- beat ---|--- beat ---|-----|----- beat -----|
      ^ pre-roll beat                                  ^ last beat

  start: Start landed less than half a beat after `first`
         -> the player was late, keep the pre-roll beat.
         Otherwise the player was early for the next beat, drop it.

  stop:  Stop landed less than half a beat into its beat
         -> the player was late, drop that beat.
         Otherwise keep it whole.

A press slightly off the grid snaps to the beat it was meant for, so the
loop length never drifts away from the grid.
*/

use crate::{
    error::LooperError,
    sequencing::BeatGrid,
    track::{PlayingTrack, RecordedTrack},
};

/// Trim a complete capture to whole-beat bounds.
///
/// Returns `Ok(None)` when rounding leaves nothing to play.
pub fn post_production(
    track: RecordedTrack,
    grid: &BeatGrid,
) -> Result<Option<PlayingTrack>, LooperError> {
    let (Some(mut first), Some(start_rec), Some(stop_rec)) =
        (track.first_frame_time, track.start_rec_time, track.stop_rec_time)
    else {
        log::error!(
            "Incomplete capture: first {:?}, start {:?}, stop {:?}, {} frames",
            track.first_frame_time,
            track.start_rec_time,
            track.stop_rec_time,
            track.len()
        );
        return Err(LooperError::IncompleteTrack);
    };
    if track.is_empty() {
        log::error!("Incomplete capture: no frames");
        return Err(LooperError::IncompleteTrack);
    }

    let len_beat = grid.len_beat();
    let half = grid.half() as i64;
    let length = track.len();
    let leftover = length % len_beat;
    if leftover != 0 {
        log::warn!("Capture is {} frames past a whole beat", leftover);
    }

    let start = if (start_rec as i64 - first as i64) < half {
        0
    } else {
        first += len_beat as u64;
        len_beat
    };

    let stop_offset = (stop_rec as i64 - first as i64).rem_euclid(len_beat as i64);
    let stop = if stop_offset < half {
        length.saturating_sub(len_beat)
    } else {
        length
    };

    if start >= stop {
        log::debug!("Rounded take has no whole beat left");
        return Ok(None);
    }

    let mut data = track.into_data();
    data.truncate(stop);
    data.drain(..start);
    log::debug!(
        "Rounded take to {} beats playing from frame {}",
        data.len() / len_beat,
        first
    );
    Ok(PlayingTrack::new(data, first))
}

//! Benchmarks for averaging live input with looping tracks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use lem::engine::mixer::{mix_tracks, Accumulator};
use lem::track::{Frame, PlayingTrack, CHANNELS, SILENCE};

use super::ramp_track;
use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/mix");

    for &size in BLOCK_SIZES {
        let input: Vec<Frame> = (0..size).map(|i| [i as i16, -(i as i16)]).collect();
        let mut scratch: Vec<Accumulator> = vec![[0; CHANNELS]; size];
        let mut output = vec![SILENCE; size];

        for track_count in [1usize, 4, 16] {
            // Metronome plus loops of different lengths and phases
            let tracks: Vec<PlayingTrack> = (0..track_count)
                .map(|i| ramp_track(1 + i % 4, (i * 977) as u64))
                .collect();

            group.bench_with_input(
                BenchmarkId::new(format!("{}_tracks", track_count), size),
                &size,
                |b, _| {
                    let mut frame = 0u64;
                    b.iter(|| {
                        mix_tracks(
                            black_box(&input),
                            black_box(&tracks),
                            frame,
                            &mut scratch,
                            black_box(&mut output),
                        );
                        frame += size as u64;
                    })
                },
            );
        }
    }

    group.finish();
}

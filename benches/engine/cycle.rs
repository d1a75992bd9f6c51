//! Benchmark for a whole processor cycle: command poll, capture, pre-roll,
//! snapshot load and mix.

use std::hint::black_box;
use std::sync::Arc;

use arc_swap::ArcSwap;
use criterion::{BenchmarkId, Criterion};
use crossbeam::channel::bounded;
use lem::engine::{command_queue, CycleStatus, LoopProcessor, RecordingCommand, SharedTrackSet};
use lem::sequencing::BeatGrid;
use lem::track::{Frame, PlayingTrack, SILENCE};

use super::ramp_track;
use crate::{BLOCK_SIZES, LEN_BEAT};

/// Cycles between Start commands
const RESTART_EVERY: usize = 10_000;

pub fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/cycle");

    for &size in BLOCK_SIZES {
        let input: Vec<Frame> = vec![[1_000, -1_000]; size];
        let mut output = vec![SILENCE; size];

        group.bench_with_input(BenchmarkId::new("recording_8_tracks", size), &size, |b, _| {
            let (mut commands, receiver) = command_queue(4);
            let (finished, _handoffs) = bounded(4);
            let set: Vec<PlayingTrack> = (0..8).map(|i| ramp_track(1 + i % 4, 0)).collect();
            let tracks: SharedTrackSet = Arc::new(ArcSwap::from_pointee(set));
            // Restarting keeps the capture's allocation, so it never grows past this
            let mut processor = LoopProcessor::new(
                BeatGrid::new(LEN_BEAT),
                receiver,
                finished,
                tracks,
                RESTART_EVERY * size + LEN_BEAT,
            );

            let mut cycle = 0usize;
            b.iter(|| {
                if cycle % RESTART_EVERY == 0 {
                    commands.push(RecordingCommand::Start).expect("queue has room");
                }
                cycle += 1;
                processor
                    .process(black_box(&input), black_box(&mut output), CycleStatus::default())
                    .expect("block fits in a beat");
            })
        });
    }

    group.finish();
}

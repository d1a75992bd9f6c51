//! Benchmarks for circular track reads.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};

use super::ramp_track;
use crate::{BLOCK_SIZES, LEN_BEAT};

pub fn bench_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/slice");
    let track = ramp_track(4, 1_234);

    for &size in BLOCK_SIZES {
        // Contiguous window in the middle of the loop
        let inside = 1_234 + LEN_BEAT as u64;
        group.bench_with_input(BenchmarkId::new("window", size), &size, |b, &size| {
            b.iter(|| {
                let sum: i32 = track
                    .window(black_box(inside), size)
                    .flatten()
                    .map(|f| f[0] as i32)
                    .sum();
                black_box(sum)
            })
        });

        // Window straddling the loop end
        let wrapping = 1_234 + (4 * LEN_BEAT - size / 2) as u64;
        group.bench_with_input(BenchmarkId::new("window_wrap", size), &size, |b, &size| {
            b.iter(|| {
                let sum: i32 = track
                    .window(black_box(wrapping), size)
                    .flatten()
                    .map(|f| f[0] as i32)
                    .sum();
                black_box(sum)
            })
        });

        // Allocating copy, for comparison
        group.bench_with_input(BenchmarkId::new("slice_alloc", size), &size, |b, &size| {
            b.iter(|| black_box(track.slice(black_box(wrapping), size)))
        });
    }

    group.finish();
}

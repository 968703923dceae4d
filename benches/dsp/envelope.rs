//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::dsp::{Envelope, EnvelopeParams};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let params = EnvelopeParams::new(0.1, 0.1, 0.7, 0.3).unwrap();
        let mut env = Envelope::new(SAMPLE_RATE, params).unwrap();
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Sustain phase (holding steady)
        let params = EnvelopeParams::new(0.001, 0.001, 0.7, 0.3).unwrap();
        let mut env = Envelope::new(SAMPLE_RATE, params).unwrap();
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Release phase, re-entered each iteration so it never goes idle
        let params = EnvelopeParams::new(0.001, 0.001, 0.7, 10.0).unwrap();
        let mut env = Envelope::new(SAMPLE_RATE, params).unwrap();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.note_on();
                env.note_off();
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}

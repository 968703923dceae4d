//! Benchmarks for complete voice pools.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::{synth, PolySynth, SynthConfig, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn held_synth(waveform: Waveform, notes: &[u8]) -> PolySynth {
    let config = SynthConfig::default()
        .sample_rate(SAMPLE_RATE)
        .waveform(waveform);
    let mut synth = PolySynth::new(&config).unwrap();
    for &note in notes {
        synth.note_on(note, 100);
    }
    synth
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let chord = [60, 64, 67];
    let full_pool: Vec<u8> = (48..64).collect();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Baseline: empty pool, just clearing the block
        let mut idle = held_synth(Waveform::Sine, &[]);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render_block(black_box(&mut buffer));
            })
        });

        // === TRIAD ===
        let mut triad = held_synth(Waveform::Sine, &chord);
        group.bench_with_input(BenchmarkId::new("triad_sine", size), &size, |b, _| {
            b.iter(|| {
                triad.render_block(black_box(&mut buffer));
            })
        });

        // === FULL POOL ===
        // Worst case the pool allows: every voice sounding
        let mut full = held_synth(Waveform::Sawtooth, &full_pool);
        group.bench_with_input(BenchmarkId::new("full_pool_saw", size), &size, |b, _| {
            b.iter(|| {
                full.render_block(black_box(&mut buffer));
            })
        });

        // === QUEUED COMMANDS ===
        // Note traffic through the handle, drained at the top of each block
        let config = SynthConfig::default().sample_rate(SAMPLE_RATE);
        let (handle, mut queued) = synth::channel(&config).unwrap();
        group.bench_with_input(BenchmarkId::new("queued_chord", size), &size, |b, _| {
            b.iter(|| {
                for &note in &chord {
                    let _ = handle.note_on(note, 100);
                }
                queued.render_block(black_box(&mut buffer));
                for &note in &chord {
                    let _ = handle.note_off(note);
                }
            })
        });
    }

    group.finish();
}

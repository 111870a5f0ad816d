//! Benchmarks for the tone engine and its DSP primitives.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use serenade::dsp::envelope::PluckEnvelope;
use serenade::dsp::oscillator::SineOsc;
use serenade::dsp::reverb::SchroederReverb;
use serenade::synth::{SynthConfig, SynthEngine, ToneRequest};

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    for &size in BLOCK_SIZES {
        group.bench_function(format!("sine_{size}"), |b| {
            let mut osc = SineOsc::new(440.0, 48_000.0);
            let mut buffer = vec![0.0f32; size];
            b.iter(|| {
                osc.render(&mut buffer);
                black_box(&buffer);
            });
        });
    }
    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    for &size in BLOCK_SIZES {
        group.bench_function(format!("pluck_{size}"), |b| {
            let mut buffer = vec![1.0f32; size];
            b.iter(|| {
                let mut env = PluckEnvelope::new(0.8, 1.0);
                env.apply(&mut buffer, 48_000.0);
                black_box(&buffer);
            });
        });
    }
    group.finish();
}

fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");
    for &size in BLOCK_SIZES {
        group.bench_function(format!("schroeder_{size}"), |b| {
            let mut reverb = SchroederReverb::new(48_000.0);
            let input = vec![0.1f32; size];
            b.iter(|| {
                let mut acc = 0.0f32;
                for &s in &input {
                    acc += reverb.process(s);
                }
                black_box(acc);
            });
        });
    }
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    for &size in BLOCK_SIZES {
        group.bench_function(format!("eight_tones_{size}"), |b| {
            let mut engine = SynthEngine::new(SynthConfig::default(), VecDeque::new());
            // A sustained chord bed: long tones that outlive the benchmark
            for i in 0..8 {
                engine.schedule(ToneRequest {
                    frequency: 220.0 * (i + 1) as f32,
                    start: 0.0,
                    duration: 3600.0,
                    velocity: 0.4,
                });
            }
            let mut buffer = vec![0.0f32; size];
            b.iter(|| {
                engine.render_block(&mut buffer);
                black_box(&buffer);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_oscillator,
    bench_envelope,
    bench_reverb,
    bench_engine,
);
criterion_main!(benches);

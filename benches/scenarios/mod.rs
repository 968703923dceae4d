//! Polyphonic scenarios: the whole render path, queue drain included.

mod voices;

pub use voices::bench_voices;

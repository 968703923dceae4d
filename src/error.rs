//! Error types for engine construction and control-path commands.
//!
//! Nothing in here is ever produced on the audio path: invalid settings are
//! rejected when the offending object is built, and the only runtime error is
//! a full command queue, reported to the caller that tried to push.

use thiserror::Error;

/// Errors produced by keysynth.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Sample rate was zero, negative or not finite.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    /// Oscillator frequency was zero, negative or not finite.
    #[error("frequency must be positive and finite, got {0}")]
    InvalidFrequency(f32),

    /// An envelope stage duration was zero, negative or not finite.
    #[error("{stage} time must be positive and finite, got {value}")]
    InvalidStageTime {
        /// Name of the offending stage (`attack`, `decay` or `release`).
        stage: &'static str,
        /// The rejected duration in seconds.
        value: f32,
    },

    /// Sustain level outside `[0, 1]`.
    #[error("sustain level must be within [0, 1], got {0}")]
    InvalidSustain(f32),

    /// Block size of zero or larger than [`crate::MAX_BLOCK_SIZE`].
    #[error("block size must be within 1..={max}, got {size}")]
    InvalidBlockSize {
        /// The rejected block size.
        size: usize,
        /// Largest accepted block size.
        max: usize,
    },

    /// Polyphony of zero voices.
    #[error("max voices must be at least 1")]
    NoVoices,

    /// Command queue with no capacity.
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,

    /// Waveform name that does not match any [`crate::dsp::Waveform`].
    #[error("unknown waveform '{0}' (expected sine, square or saw)")]
    UnknownWaveform(String),

    /// The control-to-audio command queue had no free slot.
    #[error("synth command queue is full")]
    QueueFull,

    /// The block runner thread could not be spawned.
    #[error("failed to spawn audio thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SynthError>;

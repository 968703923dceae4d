//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. All validation happens in their
//! constructors; the per-sample methods never fail.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Phase-accumulating oscillator and waveform shapes.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeParams, EnvelopeState};
pub use oscillator::{Oscillator, Waveform};

//! keysynth - a realtime-safe polyphonic synthesizer engine.
//!
//! Note events come in on the control path through a [`SynthHandle`], travel
//! over a lock-free queue, and are applied by the [`PolySynth`] on the audio
//! path at the start of every block.
//!
//! ```
//! use keysynth::{synth, SynthConfig};
//!
//! let (handle, mut synth) = synth::channel(&SynthConfig::default()).unwrap();
//! handle.note_on(60, 100).unwrap();
//!
//! let mut block = [0.0f32; 256];
//! synth.render_block(&mut block);
//! assert_eq!(synth.voice_count(), 1);
//! ```

pub mod config;
pub mod dsp;
pub mod engine; // Block thread lifecycle
pub mod error;
pub mod io; // MIDI and keyboard event sources
pub mod synth; // Voice management and polyphony

pub use config::SynthConfig;
pub use dsp::{EnvelopeParams, Waveform};
pub use error::{Result, SynthError};
pub use synth::{PolySynth, SynthHandle, SynthMessage};

/// Largest block rendered in one pass; longer requests are split.
pub const MAX_BLOCK_SIZE: usize = 2048;

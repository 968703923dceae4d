#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{f32::consts::TAU, fmt, str::FromStr};

use crate::error::{Result, SynthError};

/*
Phase-Accumulating Oscillator
=============================

Every waveform here is a function of PHASE, the fractional position inside
one cycle:

    phase = 0.0      start of the cycle
    phase = 0.5      half-way
    phase -> 1.0     end of the cycle, wraps back to 0.0

Each sample the phase advances by a fixed increment:

    increment  = frequency / sample_rate
    next_phase = (phase + increment) mod 1.0

Example: 440 Hz at 44.1 kHz gives increment ≈ 0.009977, so one cycle takes
about 100.2 samples. The cycle does not line up with any block size, which
is why the phase has to live inside the oscillator and carry over from one
block to the next. Recomputing a time axis from zero at the start of every
block restarts the waveform mid-cycle and produces a click at each block
boundary.

Waveforms at a given phase:

    Sine      sin(2π·phase)
    Square    sign(sin(2π·phase)), with sign(0) = +1
              -> +1 for phase in [0, 0.5], -1 for phase in (0.5, 1)
    Sawtooth  2·phase - 1, a ramp from -1 up to +1 across the cycle

The square boundary convention keeps the sample at a zero crossing at +1
instead of emitting a silent 0.
*/

/// Oscillator waveform shape.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    #[cfg_attr(feature = "serde", serde(alias = "saw"))]
    Sawtooth,
}

impl Waveform {
    pub const ALL: [Waveform; 3] = [Waveform::Sine, Waveform::Square, Waveform::Sawtooth];

    /// Waveform value at `phase` (expected in `[0, 1)`).
    #[inline]
    pub fn value_at(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase <= 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "saw",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Waveform {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "square" | "sqr" => Ok(Waveform::Square),
            "saw" | "sawtooth" => Ok(Waveform::Sawtooth),
            other => Err(SynthError::UnknownWaveform(other.to_string())),
        }
    }
}

/// Advance a phase by `increment`, wrapping into `[0, 1)`.
#[inline]
pub fn advance_phase(phase: f32, increment: f32) -> f32 {
    let next = (phase + increment).fract();
    // fract() of a value just below an integer can round up to 1.0
    if next >= 1.0 {
        0.0
    } else {
        next
    }
}

/// One step of a waveform generator.
///
/// Returns the sample at `phase` and the phase for the following sample.
/// Callers are expected to thread the returned phase into the next call;
/// the frequency and sample rate must both be positive.
#[inline]
pub fn sample(waveform: Waveform, frequency: f32, sample_rate: f32, phase: f32) -> (f32, f32) {
    let value = waveform.value_at(phase);
    (value, advance_phase(phase, frequency / sample_rate))
}

/// Waveform generator with a persistent phase.
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
    increment: f32,
}

impl Oscillator {
    /// Create an oscillator starting at phase 0.
    ///
    /// Rejects non-positive or non-finite frequency and sample rate here, so
    /// the per-sample path never has to check.
    pub fn new(waveform: Waveform, frequency: f32, sample_rate: f32) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(SynthError::InvalidFrequency(frequency));
        }

        Ok(Self {
            waveform,
            frequency,
            phase: 0.0,
            increment: frequency / sample_rate,
        })
    }

    /// Produce one sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let value = self.waveform.value_at(self.phase);
        self.phase = advance_phase(self.phase, self.increment);
        value
    }

    /// Fill `out` with consecutive samples, continuing from the current phase.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Phase of the next sample, in `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

/*
ADSR Envelope Implementation
============================

A linear ADSR envelope: the amplitude multiplier applied to every voice.

Vocabulary
----------

  level         The envelope's current output value (0.0 to 1.0). This
                multiplies the oscillator signal sample by sample.

  stage         Idle, Attack, Decay, Sustain or Release. A closed state
                machine governs transitions between them.

  elapsed       Whole samples spent in the current stage. Reset to zero on
                every stage change.

  release_from  The level captured when Release began. Release ramps down
                from wherever the envelope was, not from 1.0 or sustain.


Timing Model
------------

Each stage length is converted to whole samples once, at construction:

    stage_samples = round(seconds * sample_rate)

Each tick first advances `elapsed` by one sample, then computes the level
from `elapsed / stage_samples`. With attack = 0.01 s at 1 kHz (10 samples)
the tenth tick lands exactly on level 1.0 and moves to Decay.

Counting samples instead of accumulating seconds keeps the stage boundaries
exact: ticking for precisely `attack` seconds always reaches 1.0.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

    Attack    level = min(1, elapsed / attack)
    Decay     level = 1 + (sustain - 1) * (elapsed / decay)
    Sustain   level = sustain
    Release   level = release_from * (1 - elapsed / release)


Transitions
-----------

    note_on    any stage         -> Attack   (elapsed = 0)
    (tick)     Attack, elapsed ≥ attack   -> Decay
    (tick)     Decay,  elapsed ≥ decay    -> Sustain (level snapped to sustain)
    note_off   Attack/Decay/Sustain       -> Release (release_from = level)
    (tick)     Release, elapsed ≥ release -> Idle (level snapped to 0)

note_off in Idle or Release changes nothing. A stage whose length rounds to
zero samples is passed through inside the same tick, so there is never a
division by zero.
*/

/// Durations (seconds) and sustain level of an ADSR envelope.
///
/// Construct with [`EnvelopeParams::new`], which validates every field.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RawEnvelopeParams", into = "RawEnvelopeParams")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,
}

impl EnvelopeParams {
    /// 100 ms attack, 100 ms decay, 70% sustain, 200 ms release.
    pub const DEFAULT: Self = Self {
        attack: 0.1,
        decay: 0.1,
        sustain: 0.7,
        release: 0.2,
    };

    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Result<Self> {
        check_stage("attack", attack)?;
        check_stage("decay", decay)?;
        check_stage("release", release)?;
        if !(0.0..=1.0).contains(&sustain) {
            return Err(SynthError::InvalidSustain(sustain));
        }

        Ok(Self {
            attack,
            decay,
            sustain,
            release,
        })
    }

    pub fn attack(&self) -> f32 {
        self.attack
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    pub fn release(&self) -> f32 {
        self.release
    }
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn check_stage(stage: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidStageTime { stage, value })
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawEnvelopeParams {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawEnvelopeParams> for EnvelopeParams {
    type Error = SynthError;

    fn try_from(raw: RawEnvelopeParams) -> Result<Self> {
        Self::new(raw.attack, raw.decay, raw.sustain, raw.release)
    }
}

#[cfg(feature = "serde")]
impl From<EnvelopeParams> for RawEnvelopeParams {
    fn from(params: EnvelopeParams) -> Self {
        Self {
            attack: params.attack,
            decay: params.decay,
            sustain: params.sustain,
            release: params.release,
        }
    }
}

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate just went high, ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    params: EnvelopeParams,

    // Stage lengths in samples, fixed at construction
    attack_samples: u32,
    decay_samples: u32,
    release_samples: u32,

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,
    elapsed: u32,
    release_from: f32,
}

impl Envelope {
    /// Create an idle envelope for the given sample rate.
    pub fn new(sample_rate: f32, params: EnvelopeParams) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }

        Ok(Self {
            params,
            attack_samples: stage_samples(params.attack, sample_rate),
            decay_samples: stage_samples(params.decay, sample_rate),
            release_samples: stage_samples(params.release, sample_rate),
            stage: EnvelopeState::Idle,
            level: 0.0,
            elapsed: 0,
            release_from: 0.0,
        })
    }

    /// Gate high: restart the attack from any stage, including mid-release.
    pub fn note_on(&mut self) {
        self.enter(EnvelopeState::Attack);
    }

    /// Gate low: start the release from the current level.
    pub fn note_off(&mut self) {
        match self.stage {
            EnvelopeState::Idle | EnvelopeState::Release => {}
            EnvelopeState::Attack | EnvelopeState::Decay | EnvelopeState::Sustain => {
                self.release_from = self.level;
                self.enter(EnvelopeState::Release);
            }
        }
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self) -> f32 {
        loop {
            match self.stage {
                EnvelopeState::Idle => {
                    self.level = 0.0;
                }

                EnvelopeState::Attack => {
                    if self.attack_samples == 0 {
                        self.level = 1.0;
                        self.enter(EnvelopeState::Decay);
                        continue;
                    }
                    self.elapsed += 1;
                    self.level = (self.elapsed as f32 / self.attack_samples as f32).min(1.0);
                    if self.elapsed >= self.attack_samples {
                        self.enter(EnvelopeState::Decay);
                    }
                }

                EnvelopeState::Decay => {
                    let sustain = self.params.sustain;
                    if self.decay_samples == 0 {
                        self.enter(EnvelopeState::Sustain);
                        continue;
                    }
                    self.elapsed += 1;
                    let progress = self.elapsed as f32 / self.decay_samples as f32;
                    self.level = 1.0 + (sustain - 1.0) * progress;
                    if self.elapsed >= self.decay_samples {
                        self.level = sustain;
                        self.enter(EnvelopeState::Sustain);
                    }
                }

                EnvelopeState::Sustain => {
                    self.level = self.params.sustain;
                }

                EnvelopeState::Release => {
                    if self.release_samples == 0 {
                        self.level = 0.0;
                        self.enter(EnvelopeState::Idle);
                        break;
                    }
                    self.elapsed += 1;
                    let progress = self.elapsed as f32 / self.release_samples as f32;
                    self.level = self.release_from * (1.0 - progress);
                    if self.elapsed >= self.release_samples {
                        self.level = 0.0;
                        self.enter(EnvelopeState::Idle);
                    }
                }
            }
            break;
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.enter(EnvelopeState::Idle);
        self.level = 0.0;
        self.release_from = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    /// Level the current (or last) release started from.
    pub fn release_from(&self) -> f32 {
        self.release_from
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    fn enter(&mut self, stage: EnvelopeState) {
        self.stage = stage;
        self.elapsed = 0;
    }
}

fn stage_samples(seconds: f32, sample_rate: f32) -> u32 {
    (seconds * sample_rate).round().min(u32::MAX as f32) as u32
}

//! Engine configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    dsp::{EnvelopeParams, Waveform},
    error::{Result, SynthError},
    MAX_BLOCK_SIZE,
};

pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
pub const DEFAULT_BLOCK_SIZE: usize = 256;
pub const DEFAULT_MAX_VOICES: usize = 16;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Settings shared by the synth, its command queue and the block runner.
///
/// Missing fields fall back to their defaults when deserializing, so a TOML
/// file only needs the values it changes:
///
/// ```toml
/// sample_rate = 48000.0
/// waveform = "saw"
///
/// [envelope]
/// attack = 0.01
/// decay = 0.2
/// sustain = 0.6
/// release = 0.5
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Sample rate in Hz
    pub sample_rate: f32,
    /// Frames per block pulled by the block runner
    pub block_size: usize,
    /// Polyphony limit
    pub max_voices: usize,
    /// Slots in the control-to-audio command queue
    pub queue_capacity: usize,
    /// Waveform for newly created voices
    pub waveform: Waveform,
    /// Amplitude envelope applied to every voice
    pub envelope: EnvelopeParams,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            max_voices: DEFAULT_MAX_VOICES,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            waveform: Waveform::default(),
            envelope: EnvelopeParams::default(),
        }
    }
}

impl SynthConfig {
    /// Check every field; the envelope is already valid by construction.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SynthError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(SynthError::InvalidBlockSize {
                size: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if self.max_voices == 0 {
            return Err(SynthError::NoVoices);
        }
        if self.queue_capacity == 0 {
            return Err(SynthError::ZeroQueueCapacity);
        }
        Ok(())
    }

    /// Wall-clock duration of one block.
    pub fn block_period(&self) -> Duration {
        Duration::from_secs_f64(self.block_size as f64 / self.sample_rate as f64)
    }

    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn envelope(mut self, envelope: EnvelopeParams) -> Self {
        self.envelope = envelope;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SynthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_voices, 16);
    }

    #[test]
    fn block_period_matches_rate() {
        let config = SynthConfig::default().sample_rate(48_000.0).block_size(480);
        assert_eq!(config.block_period(), Duration::from_millis(10));
    }

    #[test]
    fn rejects_bad_values() {
        let base = SynthConfig::default();
        assert!(matches!(
            base.clone().sample_rate(0.0).validate(),
            Err(SynthError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            base.clone().block_size(0).validate(),
            Err(SynthError::InvalidBlockSize { size: 0, .. })
        ));
        assert!(matches!(
            base.clone().block_size(MAX_BLOCK_SIZE + 1).validate(),
            Err(SynthError::InvalidBlockSize { .. })
        ));
        assert!(matches!(
            base.clone().max_voices(0).validate(),
            Err(SynthError::NoVoices)
        ));
        assert!(matches!(
            SynthConfig {
                queue_capacity: 0,
                ..base
            }
            .validate(),
            Err(SynthError::ZeroQueueCapacity)
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config: SynthConfig = toml::from_str(
            r#"
            sample_rate = 48000.0
            waveform = "saw"

            [envelope]
            attack = 0.01
            decay = 0.2
            sustain = 0.6
            release = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.sample_rate, 48_000.0);
        assert_eq!(config.waveform, Waveform::Sawtooth);
        assert_eq!(config.envelope.sustain(), 0.6);
        assert_eq!(config.max_voices, DEFAULT_MAX_VOICES);
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn invalid_envelope_is_rejected_while_parsing() {
        let parsed: std::result::Result<SynthConfig, _> = toml::from_str(
            r#"
            [envelope]
            attack = 0.0
            decay = 0.2
            sustain = 0.6
            release = 0.5
            "#,
        );
        let err = parsed.unwrap_err().to_string();
        assert!(err.contains("attack time"), "got: {err}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_back_to_toml() {
        let config = SynthConfig::default().waveform(Waveform::Square);
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("waveform = \"square\""), "got: {text}");
        let back: SynthConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}

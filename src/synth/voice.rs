use crate::{
    dsp::{Envelope, EnvelopeParams, EnvelopeState, Oscillator, Waveform},
    error::Result,
    io::converter::midi_note_to_freq,
};

/// A single sounding note: one oscillator shaped by one envelope.
///
/// The oscillator phase and envelope state persist across blocks.
#[derive(Debug, Clone)]
pub struct Voice {
    note: u8,
    velocity: u8,
    osc: Oscillator,
    env: Envelope,
}

impl Voice {
    /// Create a voice for `note` with its envelope already in Attack.
    pub fn new(
        note: u8,
        velocity: u8,
        waveform: Waveform,
        params: EnvelopeParams,
        sample_rate: f32,
    ) -> Result<Self> {
        let osc = Oscillator::new(waveform, midi_note_to_freq(note), sample_rate)?;
        let mut env = Envelope::new(sample_rate, params)?;
        env.note_on();

        Ok(Self {
            note,
            velocity,
            osc,
            env,
        })
    }

    /// Restart the envelope for a repeated note-on. Waveform and phase are kept.
    pub fn retrigger(&mut self, velocity: u8) {
        self.velocity = velocity;
        self.env.note_on();
    }

    pub fn release(&mut self) {
        self.env.note_off();
    }

    /// Write `out.len()` samples of this voice into `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.env.is_active() {
            out.fill(0.0);
            return;
        }

        for sample in out.iter_mut() {
            let value = self.osc.next_sample();
            *sample = value * self.env.next_sample();
        }
    }

    /// False once the envelope has finished its release.
    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    pub fn envelope_level(&self) -> f32 {
        self.env.level()
    }

    pub fn state(&self) -> EnvelopeState {
        self.env.state()
    }
}

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::{
    config::SynthConfig,
    dsp::{EnvelopeParams, EnvelopeState, Waveform},
    error::Result,
    synth::{
        message::{MessageReceiver, SynthMessage},
        voice::Voice,
    },
    MAX_BLOCK_SIZE,
};

/// Highest valid MIDI note number.
const MAX_NOTE: u8 = 127;

/// Snapshot of one voice's envelope, for meters and debugging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceEnvelope {
    pub note: u8,
    pub level: f32,
    pub state: EnvelopeState,
}

/// Polyphonic voice pool.
///
/// Holds at most one voice per note and at most `max_voices` voices. Voice
/// storage is allocated up front, so nothing on the render path allocates.
/// When the pool is full, further note-ons are dropped rather than stealing a
/// sounding voice.
///
/// `R` is the command queue drained at the start of every block; `()` means
/// the synth is driven through its methods directly.
pub struct PolySynth<R = ()> {
    voices: Vec<Voice>,
    max_voices: usize,
    sample_rate: f32,
    waveform: Waveform,
    envelope: EnvelopeParams,
    rx: R,
    temp_buffer: Vec<f32>,
    frame_counter: u64,
    active: Arc<AtomicUsize>,
}

impl PolySynth<()> {
    pub fn new(config: &SynthConfig) -> Result<Self> {
        Self::with_receiver(config, ())
    }
}

impl<R: MessageReceiver> PolySynth<R> {
    /// Create a synth that pulls commands from `rx` before every block.
    pub fn with_receiver(config: &SynthConfig, rx: R) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            voices: Vec::with_capacity(config.max_voices),
            max_voices: config.max_voices,
            sample_rate: config.sample_rate,
            waveform: config.waveform,
            envelope: config.envelope,
            rx,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            frame_counter: 0,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Start `note`, or retrigger it if it is already sounding.
    ///
    /// Velocity 0 is a note-off. Notes above 127 and note-ons arriving while
    /// the pool is full are ignored.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        if velocity == 0 {
            self.note_off(note);
            return;
        }
        if note > MAX_NOTE {
            return;
        }

        if let Some(voice) = self.find_voice(note) {
            voice.retrigger(velocity);
            return;
        }

        if self.voices.len() >= self.max_voices {
            return;
        }

        // Config was validated at construction and every note maps to a
        // positive frequency, so this only fails if that invariant is broken.
        if let Ok(voice) = Voice::new(note, velocity, self.waveform, self.envelope, self.sample_rate)
        {
            self.voices.push(voice);
        }
    }

    /// Release `note`. Unknown notes are ignored.
    pub fn note_off(&mut self, note: u8) {
        if let Some(voice) = self.find_voice(note) {
            voice.release();
        }
    }

    /// Release every sounding voice.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.release();
        }
    }

    /// Waveform for voices created after this call. Sounding voices keep theirs.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Apply every pending command from the queue.
    pub fn process_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg);
        }
    }

    pub fn handle_message(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note, .. } => self.note_off(note),
            SynthMessage::SetWaveform(waveform) => self.set_waveform(waveform),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Render the mixed output of all voices into `out`.
    ///
    /// Pending commands are applied first. Blocks longer than
    /// [`MAX_BLOCK_SIZE`] are rendered as consecutive sub-blocks, all scaled
    /// by the voice count at the start of the block. Finished voices are
    /// reaped once the whole block is done.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.process_messages();

        let voice_count = self.voices.len();
        if voice_count == 0 {
            out.fill(0.0);
        } else {
            let gain = 1.0 / voice_count as f32;
            for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
                self.render_chunk(chunk, gain);
            }
            self.voices.retain(|v| v.is_active());
        }

        self.frame_counter += out.len() as u64;
        self.active.store(self.voices.len(), Ordering::Relaxed);
    }

    /// Allocating convenience wrapper around [`PolySynth::render_block`].
    pub fn generate_block(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render_block(&mut out);
        out
    }
}

impl<R> PolySynth<R> {
    fn render_chunk(&mut self, out: &mut [f32], gain: f32) {
        out.fill(0.0);

        // Voices that finished earlier in the block render silence
        let scratch = &mut self.temp_buffer[..out.len()];
        for voice in &mut self.voices {
            voice.render(scratch);
            for (o, v) in out.iter_mut().zip(scratch.iter()) {
                *o += v;
            }
        }

        for sample in out.iter_mut() {
            *sample *= gain;
        }
    }

    fn find_voice(&mut self, note: u8) -> Option<&mut Voice> {
        self.voices.iter_mut().find(|v| v.note() == note)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    pub fn has_voice(&self, note: u8) -> bool {
        self.voices.iter().any(|v| v.note() == note)
    }

    /// Waveform that the next new voice will use.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Total frames rendered since construction.
    pub fn frames_rendered(&self) -> u64 {
        self.frame_counter
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    /// Append a snapshot of each voice's envelope to `out`.
    pub fn collect_voice_envelopes(&self, out: &mut Vec<VoiceEnvelope>) {
        out.extend(self.voices.iter().map(|v| VoiceEnvelope {
            note: v.note(),
            level: v.envelope_level(),
            state: v.state(),
        }));
    }

    /// Shared counter updated with the voice count after every block.
    pub(crate) fn voice_meter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SynthConfig {
        SynthConfig {
            sample_rate: 1_000.0,
            envelope: EnvelopeParams::new(0.01, 0.01, 0.5, 0.02).unwrap(),
            ..SynthConfig::default()
        }
    }

    #[test]
    fn drops_note_on_when_full() {
        let mut synth = PolySynth::new(&config()).unwrap();
        for note in 40..57 {
            synth.note_on(note, 100);
        }
        assert_eq!(synth.voice_count(), 16);
        assert!(!synth.has_voice(56));
    }

    #[test]
    fn retrigger_reuses_voice() {
        let mut synth = PolySynth::new(&config()).unwrap();
        synth.note_on(60, 100);
        synth.generate_block(15);
        synth.note_on(60, 80);
        assert_eq!(synth.voice_count(), 1);
        assert_eq!(synth.voices().next().unwrap().state(), EnvelopeState::Attack);
    }

    #[test]
    fn retrigger_allowed_when_full() {
        let mut synth = PolySynth::new(&config()).unwrap();
        for note in 0..16 {
            synth.note_on(note, 100);
        }
        synth.generate_block(50);
        synth.note_off(3);
        synth.note_on(3, 100);
        assert_eq!(synth.voice_count(), 16);
        assert_eq!(
            synth.voices().find(|v| v.note() == 3).unwrap().state(),
            EnvelopeState::Attack
        );
    }

    #[test]
    fn velocity_zero_releases() {
        let mut synth = PolySynth::new(&config()).unwrap();
        synth.note_on(60, 100);
        synth.note_on(60, 0);
        assert_eq!(
            synth.voices().next().unwrap().state(),
            EnvelopeState::Release
        );
        synth.note_on(61, 0);
        assert!(!synth.has_voice(61));
    }

    #[test]
    fn ignores_out_of_range_notes() {
        let mut synth = PolySynth::new(&config()).unwrap();
        synth.note_on(128, 100);
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn mix_is_divided_by_voice_count() {
        let mut synth = PolySynth::new(&config()).unwrap();
        synth.set_waveform(Waveform::Square);
        for note in [60, 64, 67] {
            synth.note_on(note, 100);
        }
        // first sample of every voice: square +1 at phase 0, attack level 0.1
        let out = synth.generate_block(1);
        assert!((out[0] - 0.1).abs() < 1e-6, "got {}", out[0]);
    }

    #[test]
    fn normalizes_by_count_before_reaping() {
        let mut synth = PolySynth::new(&config()).unwrap();
        synth.set_waveform(Waveform::Square);
        synth.note_on(60, 100);
        synth.note_on(72, 100);
        synth.generate_block(50);

        // 72 finishes its 20-sample release inside the next 20-sample block
        synth.note_off(72);
        let out = synth.generate_block(20);
        assert_eq!(synth.voice_count(), 1);
        assert!(out.iter().all(|s| s.abs() <= 0.5 + 1e-6));
    }

    #[test]
    fn long_block_keeps_one_gain_when_a_voice_finishes() {
        let config = SynthConfig {
            envelope: EnvelopeParams::new(0.01, 0.01, 1.0, 0.02).unwrap(),
            waveform: Waveform::Square,
            ..config()
        };
        let mut synth = PolySynth::new(&config).unwrap();
        synth.note_on(60, 100);
        synth.note_on(72, 100);
        synth.generate_block(50);

        // 72 is done 20 samples into the first sub-block
        synth.note_off(72);
        let out = synth.generate_block(MAX_BLOCK_SIZE * 2);
        let tail_peak = out[MAX_BLOCK_SIZE..]
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()));

        assert!((tail_peak - 0.5).abs() < 1e-6, "got {tail_peak}");
        assert_eq!(synth.voice_count(), 1);
    }

    #[test]
    fn messages_are_applied_before_rendering() {
        struct Script(Vec<SynthMessage>);
        impl MessageReceiver for Script {
            fn pop(&mut self) -> Option<SynthMessage> {
                if self.0.is_empty() {
                    None
                } else {
                    Some(self.0.remove(0))
                }
            }
        }

        let script = Script(vec![
            SynthMessage::SetWaveform(Waveform::Sawtooth),
            SynthMessage::NoteOn {
                note: 60,
                velocity: 100,
            },
            SynthMessage::NoteOn {
                note: 62,
                velocity: 100,
            },
            SynthMessage::AllNotesOff,
        ]);
        let mut synth = PolySynth::with_receiver(&config(), script).unwrap();
        let mut out = [0.0f32; 1];
        synth.render_block(&mut out);

        assert_eq!(synth.waveform(), Waveform::Sawtooth);
        assert_eq!(synth.voice_count(), 2);
        assert!(synth
            .voices()
            .all(|v| v.state() == EnvelopeState::Release));
    }

    #[test]
    fn long_blocks_are_chunked() {
        let mut synth = PolySynth::new(&config()).unwrap();
        synth.note_on(60, 100);
        let out = synth.generate_block(MAX_BLOCK_SIZE * 2 + 7);
        assert_eq!(out.len(), MAX_BLOCK_SIZE * 2 + 7);
        assert_eq!(synth.frames_rendered(), (MAX_BLOCK_SIZE * 2 + 7) as u64);
    }

    #[test]
    fn envelope_snapshot_lists_every_voice() {
        let mut synth = PolySynth::new(&config()).unwrap();
        synth.note_on(60, 100);
        synth.note_on(64, 100);
        synth.generate_block(5);

        let mut snapshot = Vec::new();
        synth.collect_voice_envelopes(&mut snapshot);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|e| e.state == EnvelopeState::Attack));
        assert!((snapshot[0].level - 0.5).abs() < 1e-6);
    }

    #[test]
    fn accessors_need_no_receiver_bound() {
        struct Silent;
        fn frames<R>(synth: &PolySynth<R>) -> (u64, usize) {
            (synth.frames_rendered(), synth.voice_count())
        }

        let mut synth = PolySynth::new(&config()).unwrap();
        synth.note_on(60, 100);
        synth.generate_block(32);
        assert_eq!(frames(&synth), (32, 1));

        let idle = PolySynth {
            voices: Vec::new(),
            max_voices: 1,
            sample_rate: 1_000.0,
            waveform: Waveform::Sine,
            envelope: EnvelopeParams::DEFAULT,
            rx: Silent,
            temp_buffer: Vec::new(),
            frame_counter: 0,
            active: Arc::new(AtomicUsize::new(0)),
        };
        assert_eq!(frames(&idle), (0, 0));
    }

    #[test]
    fn voice_meter_tracks_last_block() {
        let mut synth = PolySynth::new(&config()).unwrap();
        let meter = synth.voice_meter();
        synth.note_on(60, 100);
        synth.note_on(61, 100);
        assert_eq!(meter.load(Ordering::Relaxed), 0);
        synth.generate_block(4);
        assert_eq!(meter.load(Ordering::Relaxed), 2);
    }
}

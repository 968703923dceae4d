use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::SynthConfig,
    dsp::Waveform,
    error::{Result, SynthError},
    io::{converter::midi_to_synth, ChannelFilter, MidiEvent},
    synth::{message::SynthMessage, poly::PolySynth},
};

/// Synth fed by the lock-free command queue.
pub type QueuedSynth = PolySynth<Consumer<SynthMessage>>;

/// Control-path end of the command queue.
///
/// Cloneable and shareable across threads. Concurrent senders are serialized
/// by a mutex around the queue producer; the audio path only ever touches the
/// consumer side, so it never waits on this lock.
#[derive(Clone)]
pub struct SynthHandle {
    tx: Arc<Mutex<Producer<SynthMessage>>>,
    active: Arc<AtomicUsize>,
}

/// Create a connected handle/synth pair.
///
/// Move the synth into the audio callback and keep the handle on the control
/// side.
pub fn channel(config: &SynthConfig) -> Result<(SynthHandle, QueuedSynth)> {
    config.validate()?;

    let (tx, rx) = RingBuffer::<SynthMessage>::new(config.queue_capacity);
    let synth = PolySynth::with_receiver(config, rx)?;
    let handle = SynthHandle {
        tx: Arc::new(Mutex::new(tx)),
        active: synth.voice_meter(),
    };

    tracing::debug!(
        sample_rate = config.sample_rate,
        max_voices = config.max_voices,
        queue_capacity = config.queue_capacity,
        "synth channel created"
    );

    Ok((handle, synth))
}

impl SynthHandle {
    /// Queue a command for the next audio block.
    pub fn send(&self, msg: SynthMessage) -> Result<()> {
        let pushed = {
            // A panic elsewhere cannot leave the producer half-updated
            let mut tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
            tx.push(msg).is_ok()
        };

        if pushed {
            Ok(())
        } else {
            tracing::warn!(?msg, "synth command queue full, dropping message");
            Err(SynthError::QueueFull)
        }
    }

    pub fn note_on(&self, note: u8, velocity: u8) -> Result<()> {
        self.send(SynthMessage::NoteOn { note, velocity })
    }

    pub fn note_off(&self, note: u8) -> Result<()> {
        self.send(SynthMessage::NoteOff { note, velocity: 0 })
    }

    pub fn set_waveform(&self, waveform: Waveform) -> Result<()> {
        self.send(SynthMessage::SetWaveform(waveform))
    }

    pub fn all_notes_off(&self) -> Result<()> {
        self.send(SynthMessage::AllNotesOff)
    }

    /// Forward a MIDI note event if `filter` accepts its channel.
    pub fn send_midi(&self, event: MidiEvent, filter: ChannelFilter) -> Result<()> {
        match midi_to_synth(event, filter) {
            Some(msg) => self.send(msg),
            None => Ok(()),
        }
    }

    /// Voice count reported by the audio path after its most recent block.
    pub fn active_voices(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }
}

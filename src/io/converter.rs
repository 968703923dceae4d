use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Which MIDI channels an input listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelFilter {
    /// Accept every channel.
    #[default]
    Omni,
    /// Accept a single channel (0-15).
    Channel(u8),
}

impl ChannelFilter {
    pub fn accepts(self, channel: u8) -> bool {
        match self {
            ChannelFilter::Omni => true,
            ChannelFilter::Channel(wanted) => wanted == channel,
        }
    }
}

pub fn midi_to_synth(midi: MidiEvent, filter: ChannelFilter) -> Option<SynthMessage> {
    if !filter.accepts(midi.channel()) {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { note, velocity, .. } => Some(SynthMessage::NoteOn { note, velocity }),
        MidiEvent::NoteOff { note, velocity, .. } => {
            Some(SynthMessage::NoteOff { note, velocity })
        }
    }
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Note events delivered by a MIDI source.
///
/// The set is closed on purpose: anything that is not a note message is
/// dropped while decoding, so every consumer can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
}

const STATUS_NOTE_OFF: u8 = 0x80;
const STATUS_NOTE_ON: u8 = 0x90;

impl MidiEvent {
    /// Decode a raw channel-voice message.
    ///
    /// Note-on with velocity 0 decodes as note-off (running-status
    /// convention used by most keyboards). Messages that are too short, carry
    /// data bytes with the high bit set, or are not note messages yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let &[status, note, velocity, ..] = bytes else {
            return None;
        };
        if note > 0x7F || velocity > 0x7F {
            return None;
        }

        let channel = status & 0x0F;
        match status & 0xF0 {
            STATUS_NOTE_ON if velocity > 0 => Some(MidiEvent::NoteOn {
                channel,
                note,
                velocity,
            }),
            STATUS_NOTE_ON | STATUS_NOTE_OFF => Some(MidiEvent::NoteOff {
                channel,
                note,
                velocity,
            }),
            _ => None,
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        match self {
            MidiEvent::NoteOn {
                channel,
                note,
                velocity,
            } => [STATUS_NOTE_ON | (channel & 0x0F), note, velocity],
            MidiEvent::NoteOff {
                channel,
                note,
                velocity,
            } => [STATUS_NOTE_OFF | (channel & 0x0F), note, velocity],
        }
    }

    pub fn channel(self) -> u8 {
        match self {
            MidiEvent::NoteOn { channel, .. } | MidiEvent::NoteOff { channel, .. } => channel,
        }
    }

    pub fn note(self) -> u8 {
        match self {
            MidiEvent::NoteOn { note, .. } | MidiEvent::NoteOff { note, .. } => note,
        }
    }

    pub fn velocity(self) -> u8 {
        match self {
            MidiEvent::NoteOn { velocity, .. } | MidiEvent::NoteOff { velocity, .. } => velocity,
        }
    }
}

//! Computer-keyboard note input.
//!
//! Maps the home row (plus the row above for the black keys) onto one octave
//! starting at middle C:
//!
//! ```text
//!   w e   t y u
//!  a s d f g h j k
//!  C D E F G A B C
//! ```

use crate::io::midi::MidiEvent;

/// Key to MIDI note, middle C = 60.
pub const KEY_TO_NOTE: [(char, u8); 13] = [
    ('a', 60), // C4
    ('w', 61), // C#4
    ('s', 62), // D4
    ('e', 63), // D#4
    ('d', 64), // E4
    ('f', 65), // F4
    ('t', 66), // F#4
    ('g', 67), // G4
    ('y', 68), // G#4
    ('h', 69), // A4
    ('u', 70), // A#4
    ('j', 71), // B4
    ('k', 72), // C5
];

pub const DEFAULT_VELOCITY: u8 = 64;

/// Note number for a key, if it is mapped.
pub fn note_for_key(key: char) -> Option<u8> {
    key_index(key).map(|idx| KEY_TO_NOTE[idx].1)
}

fn key_index(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    KEY_TO_NOTE.iter().position(|&(k, _)| k == key)
}

/// Tracks which mapped keys are held so a key produces exactly one note-on
/// until it is released.
#[derive(Debug, Clone)]
pub struct VirtualKeyboard {
    held: u16,
    channel: u8,
    velocity: u8,
}

impl VirtualKeyboard {
    pub fn new() -> Self {
        Self {
            held: 0,
            channel: 0,
            velocity: DEFAULT_VELOCITY,
        }
    }

    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity.min(127);
        self
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel & 0x0F;
        self
    }

    /// Press a key. Returns `None` for unmapped keys and keys already held.
    pub fn press(&mut self, key: char) -> Option<MidiEvent> {
        let idx = key_index(key)?;
        let bit = 1 << idx;
        if self.held & bit != 0 {
            return None;
        }
        self.held |= bit;

        Some(MidiEvent::NoteOn {
            channel: self.channel,
            note: KEY_TO_NOTE[idx].1,
            velocity: self.velocity,
        })
    }

    /// Release a key. Returns `None` unless the key was held.
    pub fn release(&mut self, key: char) -> Option<MidiEvent> {
        let idx = key_index(key)?;
        let bit = 1 << idx;
        if self.held & bit == 0 {
            return None;
        }
        self.held &= !bit;

        Some(MidiEvent::NoteOff {
            channel: self.channel,
            note: KEY_TO_NOTE[idx].1,
            velocity: 0,
        })
    }

    /// Release every held key, returning the matching note-offs.
    pub fn release_all(&mut self) -> Vec<MidiEvent> {
        let events = self
            .held_notes()
            .map(|note| MidiEvent::NoteOff {
                channel: self.channel,
                note,
                velocity: 0,
            })
            .collect();
        self.held = 0;
        events
    }

    pub fn is_held(&self, key: char) -> bool {
        key_index(key).is_some_and(|idx| self.held & (1 << idx) != 0)
    }

    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        KEY_TO_NOTE
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.held & (1 << idx) != 0)
            .map(|(_, &(_, note))| note)
    }
}

impl Default for VirtualKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

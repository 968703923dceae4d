// Purpose - event sources feeding the synth, format conversions

pub mod converter;
pub mod keyboard;
pub mod midi;

pub use converter::{midi_note_to_freq, midi_to_synth, ChannelFilter};
pub use keyboard::VirtualKeyboard;
pub use midi::MidiEvent;

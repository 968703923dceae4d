use rtrb::Consumer;

use crate::dsp::Waveform;

/// Commands sent from the control path to the audio path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    SetWaveform(Waveform),
    AllNotesOff,
}

/// Source of pending commands, drained by the synth at the start of a block.
///
/// Implementations must not block.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// No queue: the synth is driven through its direct methods only.
impl MessageReceiver for () {
    fn pop(&mut self) -> Option<SynthMessage> {
        None
    }
}

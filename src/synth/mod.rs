// Purpose: Voice management, polyphony, control-to-audio messaging
// This layer sits above the dsp primitives and owns every sounding note

pub mod handle;
pub mod message;
pub mod poly;
pub mod voice;

pub use handle::{channel, QueuedSynth, SynthHandle};
pub use message::{MessageReceiver, SynthMessage};
pub use poly::{PolySynth, VoiceEnvelope};
pub use voice::Voice;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control events sent from a non-realtime source to an engine.
///
/// `sample_offset` positions a note-on inside the block it is drained in;
/// zero means the start of the block.
#[derive(Debug, Copy, Clone)]
pub enum SynthMessage {
    NoteOn {
        note: u8,
        velocity: f32,
        sample_offset: u32,
    },
    NoteOff {
        note: u8,
    },
    AllNotesOff,
    KillAll,
}

/// Anything an engine can drain control events from at the start of a block.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

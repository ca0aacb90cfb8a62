use std::sync::Arc;

use crate::config::DrumKitConfig;
use crate::params::DrumParams;
use crate::synth::drum::DrumVoice;
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::MAX_BLOCK_SIZE;

/// Fixed note numbers addressing the four drum channels.
pub const KICK_NOTE: u8 = 36;
pub const SNARE_NOTE: u8 = 38;
pub const PERC_NOTE: u8 = 39;
pub const HAT_NOTE: u8 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumChannel {
    Kick,
    Snare,
    Hat,
    Perc,
}

impl DrumChannel {
    pub const ALL: [DrumChannel; 4] = [
        DrumChannel::Kick,
        DrumChannel::Snare,
        DrumChannel::Hat,
        DrumChannel::Perc,
    ];

    pub fn from_note(note: u8) -> Option<Self> {
        match note {
            KICK_NOTE => Some(DrumChannel::Kick),
            SNARE_NOTE => Some(DrumChannel::Snare),
            HAT_NOTE => Some(DrumChannel::Hat),
            PERC_NOTE => Some(DrumChannel::Perc),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            DrumChannel::Kick => 0,
            DrumChannel::Snare => 1,
            DrumChannel::Hat => 2,
            DrumChannel::Perc => 3,
        }
    }
}

/// Drum dispatcher: one concurrently-sounding voice per channel, addressed
/// by fixed note numbers instead of polyphonic allocation. A repeated hit
/// on a channel retriggers its voice in place; nothing is pooled or stolen.
pub struct DrumEngine {
    params: Arc<DrumParams>,
    kit: DrumKitConfig,
    voices: Vec<DrumVoice>,
    sample_rate: f32,
    max_block_size: usize,
    prepared: bool,
}

impl DrumEngine {
    pub fn new(kit: DrumKitConfig) -> Self {
        Self {
            params: Arc::new(DrumParams::new()),
            kit,
            voices: Vec::with_capacity(DrumChannel::ALL.len()),
            sample_rate: 44_100.0,
            max_block_size: MAX_BLOCK_SIZE,
            prepared: false,
        }
    }

    pub fn params(&self) -> Arc<DrumParams> {
        Arc::clone(&self.params)
    }

    /// Rebuild every channel voice from the kit recipes. Re-callable.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate.max(1.0);
        self.max_block_size = max_block_size.clamp(1, MAX_BLOCK_SIZE);
        self.voices.clear();
        self.voices.push(DrumVoice::new(&self.kit.kick));
        self.voices.push(DrumVoice::new(&self.kit.snare));
        self.voices.push(DrumVoice::new(&self.kit.hat));
        self.voices.push(DrumVoice::new(&self.kit.perc));
        self.prepared = true;
        log::debug!(
            "drum engine prepared: sample_rate={}, max_block={}",
            self.sample_rate,
            self.max_block_size
        );
    }

    pub fn trigger(&mut self, channel: DrumChannel, velocity: f32) {
        if !self.prepared {
            return;
        }
        let sample_rate = self.sample_rate;
        if let Some(voice) = self.voices.get_mut(channel.index()) {
            voice.trigger(velocity, sample_rate);
        }
    }

    /// Route a note event onto its fixed channel. Unmapped notes are a
    /// silent no-op.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if let Some(channel) = DrumChannel::from_note(note) {
            self.trigger(channel, velocity);
        }
    }

    pub fn kill_all(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    /// Drain control events at block start. Note-offs are meaningless for
    /// one-shot voices and are ignored.
    pub fn drain_messages<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(msg) = rx.pop() {
            match msg {
                SynthMessage::NoteOn { note, velocity, .. } => self.note_on(note, velocity),
                SynthMessage::NoteOff { .. } | SynthMessage::AllNotesOff => {}
                SynthMessage::KillAll => self.kill_all(),
            }
        }
    }

    /// Render one block: zero both buffers, then sum every sounding
    /// channel in fixed order and apply the master gain.
    pub fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        left.fill(0.0);
        right.fill(0.0);

        let frames = left.len().min(right.len());
        if !self.prepared || frames == 0 {
            return;
        }
        let frames = frames.min(self.max_block_size);

        let snap = self.params.snapshot();
        let sample_rate = self.sample_rate;

        for (idx, voice) in self.voices.iter_mut().enumerate() {
            if voice.is_active() {
                voice.render(
                    &mut left[..frames],
                    &mut right[..frames],
                    snap.channel_gains[idx],
                    sample_rate,
                );
            }
        }

        for sample in left[..frames].iter_mut() {
            *sample *= snap.master_gain;
        }
        for sample in right[..frames].iter_mut() {
            *sample *= snap.master_gain;
        }
    }

    pub fn active_channels(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }
}

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::params::{SynthParams, SynthSnapshot};
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::voice::{Voice, VoiceState};
use crate::MAX_BLOCK_SIZE;
#[cfg(feature = "rtrb")]
use crate::viz::ScopeWriter;

/*
Polyphonic voice pool and dispatcher.

Note events map onto a fixed pool of voices. Allocation order:

  1. a Free voice, if any
  2. else the Releasing voice with the lowest current amplitude
  3. else the oldest-triggered Active voice

The stolen voice is killed (immediate silence) and retriggered, so a
note-on is never dropped: the newest note always sounds. The policy is
part of the engine's contract; quietest-releasing-first keeps steals
close to inaudible, and oldest-active-first makes the remaining choice
deterministic.

Within a block all active voices are rendered and summed in pool order,
every call. Identical input always produces identical output.
*/

/// Sample-accurate note-on waiting for its offset inside the next block.
#[derive(Debug, Clone, Copy)]
struct PendingNote {
    offset: usize,
    note: u8,
    velocity: f32,
}

const PENDING_CAPACITY: usize = 64;

pub struct PolyEngine {
    params: Arc<SynthParams>,
    voices: Vec<Voice>,
    pending: Vec<PendingNote>,
    polyphony: usize,
    sample_rate: f32,
    max_block_size: usize,
    frame_counter: u64,
    trigger_counter: u64,
    prepared: bool,
    #[cfg(feature = "rtrb")]
    scope: Option<ScopeWriter>,
}

impl PolyEngine {
    pub fn new(config: EngineConfig) -> Self {
        let polyphony = config.polyphony.max(1);
        Self {
            params: Arc::new(SynthParams::from_config(&config)),
            voices: Vec::with_capacity(polyphony),
            pending: Vec::with_capacity(PENDING_CAPACITY),
            polyphony,
            sample_rate: 44_100.0,
            max_block_size: MAX_BLOCK_SIZE,
            frame_counter: 0,
            trigger_counter: 0,
            prepared: false,
            #[cfg(feature = "rtrb")]
            scope: None,
        }
    }

    /// Handle for the control thread. Parameter writes land on the render
    /// path at the next block snapshot.
    pub fn params(&self) -> Arc<SynthParams> {
        Arc::clone(&self.params)
    }

    /// One-time (re-callable) setup. Fully re-initializes every voice,
    /// phase and envelope timer so no stale coefficients survive a sample
    /// rate change.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate.max(1.0);
        self.max_block_size = max_block_size.clamp(1, MAX_BLOCK_SIZE);
        self.voices.clear();
        for _ in 0..self.polyphony {
            self.voices.push(Voice::new());
        }
        self.pending.clear();
        self.frame_counter = 0;
        self.trigger_counter = 0;
        self.prepared = true;
        log::debug!(
            "poly engine prepared: sample_rate={}, max_block={}, polyphony={}",
            self.sample_rate,
            self.max_block_size,
            self.polyphony
        );
    }

    /// Start a note at the beginning of the next rendered span.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if !self.prepared {
            return;
        }
        let snap = self.params.snapshot();
        self.start_voice(note, velocity, &snap);
    }

    /// Start a note `sample_offset` samples into the next block.
    pub fn note_on_at(&mut self, note: u8, velocity: f32, sample_offset: usize) {
        if !self.prepared {
            return;
        }
        if sample_offset == 0 || self.pending.len() == PENDING_CAPACITY {
            // A full pending queue degrades to block-start timing rather
            // than dropping the event.
            self.note_on(note, velocity);
        } else {
            self.pending.push(PendingNote {
                offset: sample_offset,
                note,
                velocity,
            });
        }
    }

    /// Release the voice holding `note`. At most one voice holds a given
    /// note; a note-off with no match is a silent no-op.
    pub fn note_off(&mut self, note: u8) {
        let sample_rate = self.sample_rate;
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.state() == VoiceState::Active && v.note() == Some(note))
        {
            voice.note_off(sample_rate);
        }
    }

    /// Release everything, letting envelope tails ring out.
    pub fn all_notes_off(&mut self) {
        let sample_rate = self.sample_rate;
        for voice in &mut self.voices {
            if voice.state() == VoiceState::Active {
                voice.note_off(sample_rate);
            }
        }
    }

    /// Immediately silence the voice holding `note`, discarding its
    /// envelope tail. No-op when no voice holds the note.
    pub fn kill_note(&mut self, note: u8) {
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.is_active() && v.note() == Some(note))
        {
            voice.kill();
        }
    }

    /// Silence everything immediately, discarding envelope tails.
    pub fn kill_all(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
        self.pending.clear();
    }

    /// Drain control events from a non-realtime source. Called at block
    /// start, before `render_block`.
    pub fn drain_messages<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(msg) = rx.pop() {
            match msg {
                SynthMessage::NoteOn {
                    note,
                    velocity,
                    sample_offset,
                } => self.note_on_at(note, velocity, sample_offset as usize),
                SynthMessage::NoteOff { note } => self.note_off(note),
                SynthMessage::AllNotesOff => self.all_notes_off(),
                SynthMessage::KillAll => self.kill_all(),
            }
        }
    }

    /// Render one block into both channels. Buffers are zeroed first and
    /// voices accumulate into them; before `prepare` this produces silence.
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

        self.pending.sort_unstable_by_key(|p| p.offset);
        let mut cursor = 0usize;
        let mut idx = 0usize;
        while idx < self.pending.len() {
            let ev = self.pending[idx];
            idx += 1;

            let at = ev.offset.min(frames);
            if at > cursor {
                render_span(
                    &mut self.voices,
                    &mut left[cursor..at],
                    &mut right[cursor..at],
                    &snap,
                    sample_rate,
                );
                cursor = at;
            }
            self.start_voice(ev.note, ev.velocity, &snap);
        }
        self.pending.clear();

        if cursor < frames {
            render_span(
                &mut self.voices,
                &mut left[cursor..frames],
                &mut right[cursor..frames],
                &snap,
                sample_rate,
            );
        }

        for sample in left[..frames].iter_mut() {
            *sample *= snap.master_gain;
        }
        for sample in right[..frames].iter_mut() {
            *sample *= snap.master_gain;
        }

        self.frame_counter += frames as u64;

        #[cfg(feature = "rtrb")]
        if let Some(scope) = self.scope.as_mut() {
            scope.push_stereo(&left[..frames], &right[..frames]);
        }
    }

    /// Attach an oscilloscope tap fed after each rendered block.
    #[cfg(feature = "rtrb")]
    pub fn attach_scope(&mut self, writer: ScopeWriter) {
        self.scope = Some(writer);
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Total frames rendered since the last `prepare`.
    pub fn frames_rendered(&self) -> u64 {
        self.frame_counter
    }

    pub fn is_note_active(&self, note: u8) -> bool {
        self.voices
            .iter()
            .any(|v| v.is_active() && v.note() == Some(note))
    }

    fn start_voice(&mut self, note: u8, velocity: f32, snap: &SynthSnapshot) {
        let age = self.trigger_counter;
        self.trigger_counter += 1;
        let sample_rate = self.sample_rate;
        if let Some(voice) = self.allocate_voice() {
            voice.note_on(note, velocity, age, snap, sample_rate);
        }
    }

    fn allocate_voice(&mut self) -> Option<&mut Voice> {
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return self.voices.get_mut(idx);
        }

        let quietest_releasing = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by(|(_, a), (_, b)| {
                a.amp_level()
                    .partial_cmp(&b.amp_level())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| idx);

        let oldest_active = || {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.state() == VoiceState::Active)
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
        };

        let idx = quietest_releasing.or_else(oldest_active)?;
        let voice = self.voices.get_mut(idx)?;
        voice.kill();
        Some(voice)
    }
}

fn render_span(
    voices: &mut [Voice],
    left: &mut [f32],
    right: &mut [f32],
    snap: &SynthSnapshot,
    sample_rate: f32,
) {
    for voice in voices.iter_mut() {
        if voice.is_active() {
            voice.render(left, right, snap, sample_rate);
        }
    }
}

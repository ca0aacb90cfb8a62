use crate::dsp::envelope::AdsrEnvelope;
use crate::dsp::filter::Svf;
use crate::dsp::oscillator::FmPair;
use crate::params::SynthSnapshot;
use crate::synth::note_to_freq;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// One sounding note: FM-capable oscillator into a filter, shaped by an
/// amplitude envelope, with a second envelope sweeping the filter cutoff.
///
/// The voice never allocates and does fixed-cost work per sample. When it
/// is not active, `render` leaves the buffers untouched; callers pre-zero.
pub struct Voice {
    note: Option<u8>,
    velocity: f32,
    state: VoiceState,
    age: u64,

    osc: FmPair,
    filter: Svf,
    amp_env: AdsrEnvelope,
    filter_env: AdsrEnvelope,
}

impl Voice {
    pub fn new() -> Self {
        Self {
            note: None,
            velocity: 0.0,
            state: VoiceState::Free,
            age: 0,

            osc: FmPair::new(crate::dsp::oscillator::Waveform::Saw),
            filter: Svf::lowpass(2_000.0),
            amp_env: AdsrEnvelope::new(),
            filter_env: AdsrEnvelope::new(),
        }
    }

    /// Start a note. `age` is the engine's trigger stamp used for
    /// oldest-first stealing.
    pub fn note_on(
        &mut self,
        note: u8,
        velocity: f32,
        age: u64,
        snap: &SynthSnapshot,
        sample_rate: f32,
    ) {
        self.note = Some(note);
        self.velocity = velocity.clamp(0.0, 1.0);
        self.state = VoiceState::Active;
        self.age = age;

        self.osc.reset();
        self.osc.set_carrier_waveform(snap.waveform);
        self.osc.set_ratio(snap.fm_ratio);
        self.osc.set_depth(snap.fm_depth);
        self.osc.set_frequency(note_to_freq(note));
        self.filter.reset();
        self.filter.set_resonance(snap.resonance);

        self.amp_env
            .set_adsr(snap.attack_ms, snap.decay_ms, snap.sustain_level, snap.release_ms);
        self.filter_env
            .set_adsr(snap.attack_ms, snap.decay_ms, snap.sustain_level, snap.release_ms);
        self.amp_env.trigger(sample_rate);
        self.filter_env.trigger(sample_rate);
    }

    /// Key released: envelopes enter their release stage, the voice keeps
    /// rendering until the amplitude envelope reaches idle.
    pub fn note_off(&mut self, sample_rate: f32) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.amp_env.release(sample_rate);
            self.filter_env.release(sample_rate);
        }
    }

    /// Immediate silence and return to the pool, discarding the envelope
    /// tail. Only the stealing path calls this; an ordinary note-off goes
    /// through `note_off`.
    pub fn kill(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
        self.velocity = 0.0;
        self.amp_env.reset();
        self.filter_env.reset();
        self.osc.reset();
        self.filter.reset();
    }

    /// Accumulate this voice into pre-zeroed stereo buffers.
    pub fn render(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        snap: &SynthSnapshot,
        sample_rate: f32,
    ) {
        if !self.is_active() {
            return;
        }
        debug_assert_eq!(left.len(), right.len());

        self.osc.set_carrier_waveform(snap.waveform);
        self.osc.set_ratio(snap.fm_ratio);
        self.osc.set_depth(snap.fm_depth);
        self.filter.set_resonance(snap.resonance);

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let sweep = snap.filter_env_amount * self.filter_env.next_sample(sample_rate);
            self.filter.set_cutoff(snap.cutoff_hz + sweep);

            let raw = self.osc.next_sample(sample_rate);
            let shaped = self.filter.next_sample(raw, sample_rate);
            let sample = shaped * self.amp_env.next_sample(sample_rate) * self.velocity;

            *l += sample;
            *r += sample;
        }

        if self.state == VoiceState::Releasing && self.amp_env.is_idle() {
            self.kill();
        }
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Current amplitude envelope level, used to pick the quietest
    /// releasing voice when stealing.
    pub fn amp_level(&self) -> f32 {
        self.amp_env.level()
    }
}

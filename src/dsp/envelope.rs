use crate::MIN_TIME;

/*
Envelope Generators
===================

Two envelope shapes cover every voice type in this crate.

  AdsrEnvelope   Gated attack/decay/sustain/release for pitched voices and
                 the tape-loop source. `trigger` opens the gate, `release`
                 closes it.

  DecayEnvelope  One-shot attack/decay for drum voices. No gate, no sustain.
                 Also used as the drum pitch sweep (its unipolar level
                 scales a frequency offset).

Vocabulary
----------

  level       Current output value (0.0 to 1.0).

  stage       Phase of the state machine: Idle, Attack, Decay, Sustain,
              Release.

  increment   How much `level` changes per sample. Computed once at each
              stage entry from the stage duration and the sample rate:

                  increment = target_change / (time_seconds * sample_rate)

Segments are linear ramps. Stage transitions are monotonic
(Idle -> Attack -> Decay -> Sustain -> Release -> Idle) and retriggering
re-enters Attack from the CURRENT level. Starting the ramp where the
output already sits is what keeps a fast retrigger click-free; the attack
keeps its full-scale slope, so a retrigger from a non-zero level completes
early rather than stretching.

Release snapshots the current level at `release` time and ramps it to zero
in exactly the configured release duration.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct AdsrEnvelope {
    // Stage durations in milliseconds, sustain as a level
    attack_ms: f32,
    decay_ms: f32,
    sustain_level: f32,
    release_ms: f32,

    stage: EnvelopeStage,
    level: f32,
    // Per-sample delta for the current ramp stage, set at stage entry
    increment: f32,
}

/// Convert a duration in milliseconds to a sample count, never below one.
#[inline]
fn stage_samples(ms: f32, sample_rate: f32) -> f32 {
    ((ms / 1000.0).max(MIN_TIME) * sample_rate).max(1.0)
}

impl AdsrEnvelope {
    pub fn new() -> Self {
        Self::adsr(10.0, 100.0, 0.7, 300.0)
    }

    pub fn adsr(attack_ms: f32, decay_ms: f32, sustain: f32, release_ms: f32) -> Self {
        Self {
            attack_ms: attack_ms.max(0.0),
            decay_ms: decay_ms.max(0.0),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_ms: release_ms.max(0.0),

            stage: EnvelopeStage::Idle,
            level: 0.0,
            increment: 0.0,
        }
    }

    /// Update stage timings. Takes effect at the next stage entry.
    pub fn set_adsr(&mut self, attack_ms: f32, decay_ms: f32, sustain: f32, release_ms: f32) {
        self.attack_ms = attack_ms.max(0.0);
        self.decay_ms = decay_ms.max(0.0);
        self.sustain_level = sustain.clamp(0.0, 1.0);
        self.release_ms = release_ms.max(0.0);
    }

    /// Gate high: enter Attack from the current level.
    pub fn trigger(&mut self, sample_rate: f32) {
        self.increment = 1.0 / stage_samples(self.attack_ms, sample_rate);
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: ramp from the current level to zero in the release time.
    pub fn release(&mut self, sample_rate: f32) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }
        self.increment = self.level / stage_samples(self.release_ms, sample_rate);
        self.stage = EnvelopeStage::Release;
    }

    /// Advance one sample and return the current level.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += self.increment;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.increment =
                        (1.0 - self.sustain_level) / stage_samples(self.decay_ms, sample_rate);
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                self.level -= self.increment;
                if self.level <= self.sustain_level {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeStage::Release => {
                self.level -= self.increment;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Returns true once the release has run out and the voice can be recycled.
    pub fn is_idle(&self) -> bool {
        self.stage == EnvelopeStage::Idle
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    /// Hard reset to idle, discarding any remaining tail.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.increment = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecayStage {
    Idle,
    Attack,
    Decay,
}

/// One-shot attack/decay envelope. Decay target is silence; there is no
/// sustain segment and no gate-off event.
pub struct DecayEnvelope {
    attack_ms: f32,
    decay_ms: f32,

    stage: DecayStage,
    level: f32,
    increment: f32,
}

impl DecayEnvelope {
    pub fn new(attack_ms: f32, decay_ms: f32) -> Self {
        Self {
            attack_ms: attack_ms.max(0.0),
            decay_ms: decay_ms.max(0.0),
            stage: DecayStage::Idle,
            level: 0.0,
            increment: 0.0,
        }
    }

    /// Fire the one-shot, entering Attack from the current level.
    pub fn trigger(&mut self, sample_rate: f32) {
        self.increment = 1.0 / stage_samples(self.attack_ms, sample_rate);
        self.stage = DecayStage::Attack;
    }

    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            DecayStage::Idle => {
                self.level = 0.0;
            }

            DecayStage::Attack => {
                self.level += self.increment;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.increment = 1.0 / stage_samples(self.decay_ms, sample_rate);
                    self.stage = DecayStage::Decay;
                }
            }

            DecayStage::Decay => {
                self.level -= self.increment;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = DecayStage::Idle;
                }
            }
        }

        self.level
    }

    pub fn is_idle(&self) -> bool {
        self.stage == DecayStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = DecayStage::Idle;
        self.level = 0.0;
        self.increment = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

pub mod config;
pub mod dsp;
pub mod params; // Lock-free parameter cells shared with the control thread
pub mod synth; // Voice management, polyphony, drum channels
pub mod tape; // Tape-loop record/playback engine
#[cfg(feature = "rtrb")]
pub mod viz; // Oscilloscope tap for external display

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

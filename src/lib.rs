pub mod dsp;
pub mod pitch; // Symbolic pitch names and frequency lookup
pub mod scheduler; // Looping melody playback
pub mod score; // Note and chord schedules
pub mod synth; // Tone rendering engine

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

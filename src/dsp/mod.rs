//! Low-level signal primitives behind the tone engine.
//!
//! Everything here renders per-sample or per-block into caller-provided
//! buffers and allocates only at construction time, so the synth can run
//! these inside the audio callback.

/// Attack/decay amplitude envelope for plucked tones.
pub mod envelope;
/// Phase-accumulating sine oscillator.
pub mod oscillator;
/// Schroeder reverb for the wet mix path.
pub mod reverb;

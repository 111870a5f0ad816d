//! Tone rendering engine.
//!
//! The engine owns every sounding tone and the shared output bus (master
//! gain plus a dry/wet reverb split). Control code never touches audio
//! state directly: it sends [`ToneRequest`]s through a [`CommandReceiver`],
//! and the engine drains them at block boundaries inside the audio callback.

pub mod command;
pub mod engine;
pub mod tone;

pub use command::{CommandReceiver, ToneRequest};
pub use engine::{EngineClock, SynthConfig, SynthEngine};

#[cfg(feature = "rtrb")]
pub use engine::{engine_with_handle, EngineHandle};

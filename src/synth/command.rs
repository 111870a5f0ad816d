#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Request for one synthesized tone.
///
/// `start` is an absolute time on the engine's audio clock; the engine is
/// responsible for sample-accurate placement. A request that arrives with a
/// start already in the past plays immediately.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ToneRequest {
    /// Fundamental frequency in Hz
    pub frequency: f32,
    /// Absolute start time in seconds on the audio clock
    pub start: f64,
    /// Tone length in seconds
    pub duration: f64,
    /// Peak amplitude, 0-1
    pub velocity: f32,
}

/// Source of tone requests drained by the engine each block.
pub trait CommandReceiver {
    fn pop(&mut self) -> Option<ToneRequest>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<ToneRequest> {
    fn pop(&mut self) -> Option<ToneRequest> {
        Consumer::pop(self).ok()
    }
}

/// In-process receiver for tests and offline rendering.
impl CommandReceiver for std::collections::VecDeque<ToneRequest> {
    fn pop(&mut self) -> Option<ToneRequest> {
        self.pop_front()
    }
}

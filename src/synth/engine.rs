use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::dsp::reverb::SchroederReverb;
use crate::synth::command::{CommandReceiver, ToneRequest};
use crate::synth::tone::Tone;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

/// Capacity of the control -> audio request ring. One scheduling pass of the
/// built-in score is 47 requests; 256 leaves room for several passes queued
/// back to back.
#[cfg(feature = "rtrb")]
const COMMAND_QUEUE_SIZE: usize = 256;

/// Engine parameters, fixed for the lifetime of the engine.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct SynthConfig {
    pub sample_rate: f32,
    /// Gain applied to the summed tones before the dry/wet split
    pub master_gain: f32,
    /// Wet level added on top of the dry path (0 = no reverb)
    pub reverb_mix: f32,
    /// Hard cap on simultaneously sounding tones
    pub max_tones: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            master_gain: 0.8,
            reverb_mix: 0.25,
            max_tones: 64,
        }
    }
}

/// Shared, lock-free view of the engine's audio clock.
///
/// The engine advances it once per rendered block; control-side code reads
/// `seconds()` to anchor future tone starts. `is_live()` flips true the
/// first time the audio callback renders, which is how the scheduler knows
/// output actually started (an output stream that never ran stays dead).
#[derive(Clone)]
pub struct EngineClock {
    frames: Arc<AtomicU64>,
    live: Arc<AtomicBool>,
    sample_rate: f32,
}

impl EngineClock {
    fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            live: Arc::new(AtomicBool::new(false)),
            sample_rate,
        }
    }

    /// Monotonic audio time in seconds.
    pub fn seconds(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    /// True once the engine has rendered at least one block.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn advance(&self, frames: u64) {
        self.live.store(true, Ordering::Release);
        self.frames.fetch_add(frames, Ordering::AcqRel);
    }
}

/// Mixes every sounding tone through the shared output bus.
///
/// Per block: drain pending requests, sum active tones (dry), apply master
/// gain, then split dry/wet and sum — `out = dry + wet * reverb_mix` where
/// `wet` is the reverb of the post-gain dry signal. Finished tones are
/// retired after mixing. All allocation happens in `new`.
pub struct SynthEngine<R: CommandReceiver> {
    config: SynthConfig,
    rx: R,
    tones: Vec<Tone>,
    reverb: SchroederReverb,
    frame: u64,
    clock: EngineClock,
}

impl<R: CommandReceiver> SynthEngine<R> {
    pub fn new(config: SynthConfig, rx: R) -> Self {
        Self {
            rx,
            tones: Vec::with_capacity(config.max_tones),
            reverb: SchroederReverb::new(config.sample_rate),
            frame: 0,
            clock: EngineClock::new(config.sample_rate),
            config,
        }
    }

    /// A clonable handle to this engine's clock.
    pub fn clock(&self) -> EngineClock {
        self.clock.clone()
    }

    /// Place a tone directly, bypassing the command queue. The audio
    /// callback uses the queue; this is for offline rendering and tests.
    pub fn schedule(&mut self, request: ToneRequest) {
        if self.tones.len() >= self.config.max_tones {
            // Polyphony cap: drop the request rather than grow or glitch
            return;
        }
        self.tones
            .push(Tone::new(&request, self.config.sample_rate, self.frame));
    }

    /// Number of tones currently held (sounding or awaiting their start).
    pub fn active_tones(&self) -> usize {
        self.tones.len()
    }

    /// Render one mono block. Must be called from a single thread; the
    /// buffer length sets the block size.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(request) = self.rx.pop() {
            self.schedule(request);
        }

        out.fill(0.0);
        let block_start = self.frame;
        let sample_rate = self.config.sample_rate;

        for tone in &mut self.tones {
            tone.mix_into(out, block_start, sample_rate);
        }
        self.tones.retain(|tone| tone.is_active(sample_rate));

        for sample in out.iter_mut() {
            let dry = *sample * self.config.master_gain;
            let wet = self.reverb.process(dry);
            *sample = dry + wet * self.config.reverb_mix;
        }

        self.frame += out.len() as u64;
        self.clock.advance(out.len() as u64);
    }
}

/// Control-side handle: queue a tone, read the clock.
///
/// This is the scheduler's transport in the real audio path. Pushing into a
/// full ring drops the tone and reports `false`; nothing panics on the
/// control side and nothing blocks on the audio side.
#[cfg(feature = "rtrb")]
pub struct EngineHandle {
    tx: Producer<ToneRequest>,
    clock: EngineClock,
}

#[cfg(feature = "rtrb")]
impl EngineHandle {
    /// Current audio-clock time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.seconds()
    }

    /// True once audio output is actually running.
    pub fn is_live(&self) -> bool {
        self.clock.is_live()
    }

    /// Queue a tone request. Returns false if the ring is full.
    pub fn send(&mut self, request: ToneRequest) -> bool {
        self.tx.push(request).is_ok()
    }
}

/// Build an engine wired to a control handle over an SPSC ring.
#[cfg(feature = "rtrb")]
pub fn engine_with_handle(config: SynthConfig) -> (SynthEngine<Consumer<ToneRequest>>, EngineHandle) {
    let (tx, rx) = RingBuffer::<ToneRequest>::new(COMMAND_QUEUE_SIZE);
    let engine = SynthEngine::new(config, rx);
    let handle = EngineHandle {
        tx,
        clock: engine.clock(),
    };
    (engine, handle)
}

#[cfg(feature = "rtrb")]
impl crate::scheduler::Transport for EngineHandle {
    fn now(&self) -> f64 {
        EngineHandle::now(self)
    }

    fn ready(&self) -> bool {
        self.is_live()
    }

    fn play_tone(&mut self, request: ToneRequest) -> bool {
        self.send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    const SAMPLE_RATE: f32 = 8_000.0;

    fn test_engine() -> SynthEngine<VecDeque<ToneRequest>> {
        let config = SynthConfig {
            sample_rate: SAMPLE_RATE,
            ..SynthConfig::default()
        };
        SynthEngine::new(config, VecDeque::new())
    }

    fn tone(start: f64, duration: f64) -> ToneRequest {
        ToneRequest {
            frequency: 220.0,
            start,
            duration,
            velocity: 0.6,
        }
    }

    #[test]
    fn empty_engine_renders_silence() {
        let mut engine = test_engine();
        let mut buffer = vec![1.0f32; 512];
        engine.render_block(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn scheduled_tone_is_audible_and_bounded() {
        let mut engine = test_engine();
        engine.schedule(tone(0.0, 0.5));

        let mut buffer = vec![0.0f32; 1024];
        engine.render_block(&mut buffer);

        assert!(buffer.iter().any(|&s| s.abs() > 0.01));
        assert!(buffer.iter().all(|&s| s.is_finite() && s.abs() <= 1.0));
    }

    #[test]
    fn future_start_stays_silent_until_due() {
        let mut engine = test_engine();
        // Starts half a second in: frame 4000
        engine.schedule(tone(0.5, 0.2));

        let mut buffer = vec![0.0f32; 1024];
        engine.render_block(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0), "early block must be silent");

        for _ in 0..3 {
            engine.render_block(&mut buffer);
        }
        assert!(
            buffer.iter().any(|&s| s.abs() > 0.001),
            "tone should sound once its start frame arrives"
        );
    }

    #[test]
    fn clock_tracks_rendered_frames() {
        let mut engine = test_engine();
        let clock = engine.clock();
        assert!(!clock.is_live());
        assert_eq!(clock.seconds(), 0.0);

        let mut buffer = vec![0.0f32; 800];
        engine.render_block(&mut buffer);

        assert!(clock.is_live());
        assert!((clock.seconds() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn finished_tones_are_retired() {
        let mut engine = test_engine();
        engine.schedule(tone(0.0, 0.1));
        assert_eq!(engine.active_tones(), 1);

        let mut buffer = vec![0.0f32; 800];
        engine.render_block(&mut buffer); // 0.1s exactly
        engine.render_block(&mut buffer);
        assert_eq!(engine.active_tones(), 0);
    }

    #[test]
    fn polyphony_cap_drops_excess_requests() {
        let config = SynthConfig {
            sample_rate: SAMPLE_RATE,
            max_tones: 4,
            ..SynthConfig::default()
        };
        let mut engine = SynthEngine::new(config, VecDeque::new());
        for _ in 0..10 {
            engine.schedule(tone(0.0, 1.0));
        }
        assert_eq!(engine.active_tones(), 4);
    }

    #[test]
    fn queued_requests_drain_at_block_boundary() {
        let mut queue = VecDeque::new();
        queue.push_back(tone(0.0, 0.5));
        queue.push_back(tone(0.1, 0.5));

        let config = SynthConfig {
            sample_rate: SAMPLE_RATE,
            ..SynthConfig::default()
        };
        let mut engine = SynthEngine::new(config, queue);
        assert_eq!(engine.active_tones(), 0);

        let mut buffer = vec![0.0f32; 256];
        engine.render_block(&mut buffer);
        assert_eq!(engine.active_tones(), 2);
    }

    #[test]
    fn reverb_mix_leaves_a_tail_after_the_tone() {
        let config = SynthConfig {
            sample_rate: SAMPLE_RATE,
            reverb_mix: 1.0,
            ..SynthConfig::default()
        };
        let mut engine = SynthEngine::new(config, VecDeque::new());
        engine.schedule(tone(0.0, 0.1));

        let mut buffer = vec![0.0f32; 1600]; // 0.2s, past the tone's end
        engine.render_block(&mut buffer);

        let tail = &buffer[1200..];
        assert!(
            tail.iter().any(|&s| s.abs() > 1e-4),
            "wet path should ring past the dry tone"
        );
    }
}

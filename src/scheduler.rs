use crate::score::{Score, ScoreEvent};
use crate::synth::ToneRequest;

/*
Melody Scheduler
================

Owns the playback state for one looping score. A scheduling pass converts
every note and chord event into tone requests anchored slightly ahead of the
audio clock, then arms a single continuation deadline one loop length later.
When the deadline passes, the next `poll` schedules the next pass; `stop`
cancels the deadline so no further pass can ever fire.

Vocabulary
----------

  transport     The audio engine seen from the control side: a monotonic
                clock, a readiness probe, and a tone sink. The scheduler
                never touches audio buffers.

  anchor        now + lookahead. The lookahead (100ms) keeps the first
                events of a pass from landing in the past while the
                requests travel to the audio thread.

  continuation  The one pending "schedule the next loop" deadline. There is
                never more than one: `start` refuses to double-schedule,
                and each pass replaces the previous continuation.

  generation    Cancellation token. Every `start` bumps it; a continuation
                armed under an older generation is dead even if a deadline
                comparison would let it fire. This closes the race where a
                stop and an about-to-fire continuation interleave.

Stopping does not silence tones already handed to the transport: the current
pass finishes audibly and the loop simply never re-arms. Hosts drive `poll`
from any convenient tick (a UI frame loop is plenty; the deadline only needs
to be noticed within the lookahead window).
*/

/// Seconds of audio-clock headroom between scheduling and sounding.
pub const DEFAULT_LOOKAHEAD: f64 = 0.1;

/// The audio engine as the scheduler sees it.
pub trait Transport {
    /// Monotonic audio-clock time in seconds.
    fn now(&self) -> f64;

    /// False while audio output has not actually started (stream not
    /// running yet, output blocked). `start` is a no-op until this is true.
    fn ready(&self) -> bool {
        true
    }

    /// Submit one tone for synthesis. Returns false if the request was
    /// dropped; the scheduler treats that as soft failure.
    fn play_tone(&mut self, request: ToneRequest) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Continuation {
    due: f64,
    generation: u64,
}

/// Loops a fixed score against an audio-clock transport.
pub struct MelodyScheduler<T: Transport> {
    transport: T,
    score: Score,
    lookahead: f64,
    playing: bool,
    generation: u64,
    pending: Option<Continuation>,
}

impl<T: Transport> MelodyScheduler<T> {
    pub fn new(transport: T, score: Score) -> Self {
        Self {
            transport,
            score,
            lookahead: DEFAULT_LOOKAHEAD,
            playing: false,
            generation: 0,
            pending: None,
        }
    }

    pub fn with_lookahead(mut self, seconds: f64) -> Self {
        self.lookahead = seconds.max(0.0);
        self
    }

    /// Begin looping playback.
    ///
    /// No-op when already playing (never double-schedules) and when the
    /// transport is not ready — in that case state stays not-playing, so a
    /// UI reading [`is_playing`](Self::is_playing) stays truthful.
    pub fn start(&mut self) {
        if self.playing || !self.transport.ready() {
            return;
        }
        self.playing = true;
        self.generation = self.generation.wrapping_add(1);
        self.schedule_pass();
    }

    /// Stop looping and cancel the pending continuation. Tones already
    /// submitted for the current pass finish audibly.
    pub fn stop(&mut self) {
        self.playing = false;
        self.pending = None;
    }

    /// Stop if playing, start otherwise.
    pub fn toggle(&mut self) {
        if self.playing {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// When the armed continuation fires, in audio-clock seconds.
    pub fn continuation_due(&self) -> Option<f64> {
        self.pending.map(|c| c.due)
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Drive the loop: schedules the next pass once the continuation
    /// deadline passes. Call at any cadence comfortably inside the
    /// lookahead window.
    pub fn poll(&mut self) {
        if !self.playing {
            return;
        }
        let due = match self.pending {
            Some(c) if c.generation == self.generation => c.due,
            _ => return,
        };
        if self.transport.now() >= due {
            self.schedule_pass();
        }
    }

    /// Issue every event of one loop pass in schedule order, then arm the
    /// continuation at the end of the pass.
    fn schedule_pass(&mut self) {
        let anchor = self.transport.now() + self.lookahead;

        for event in self.score.events() {
            match event {
                ScoreEvent::Note(note) => {
                    // A rejected push means a dropped tone, never an error
                    let _ = self.transport.play_tone(ToneRequest {
                        frequency: note.pitch.frequency(),
                        start: anchor + note.offset,
                        duration: note.duration,
                        velocity: note.velocity,
                    });
                }
                ScoreEvent::Chord(chord) => {
                    for &pitch in &chord.pitches {
                        let _ = self.transport.play_tone(ToneRequest {
                            frequency: pitch.frequency(),
                            start: anchor + chord.offset,
                            duration: chord.duration,
                            velocity: chord.velocity,
                        });
                    }
                }
            }
        }

        self.pending = Some(Continuation {
            due: anchor + self.score.length(),
            generation: self.generation,
        });
    }
}

use crate::pitch::{self, Pitch};

/*
Note and Chord Schedules
========================

A `Score` is the fixed, immutable schedule the melody scheduler plays: a list
of note and chord events positioned in seconds from the start of the loop,
plus the loop's total length. Events carry no engine state; they are data
that one scheduling pass turns into tone requests.

Offsets and durations are seconds rather than ticks. The schedule is fixed
and has no tempo changes, so a tick/ppq layer would only obscure the numbers
that matter (the loop length is the continuation deadline).

Scores are built through `ScoreBuilder`, which validates timing and velocity
up front so a bad schedule is a construction error, not a runtime surprise.
Events are sorted by offset on build; a scheduling pass that walks the event
list therefore issues synthesis requests in schedule order.
*/

/// A single melody note
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Seconds from loop start
    pub offset: f64,
    /// Seconds the tone lasts
    pub duration: f64,
    pub pitch: Pitch,
    /// Peak amplitude, 0-1
    pub velocity: f32,
}

/// A block chord: every pitch sounds simultaneously
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChordEvent {
    /// Seconds from loop start
    pub offset: f64,
    /// Seconds the chord lasts
    pub duration: f64,
    pub pitches: Vec<Pitch>,
    /// Peak amplitude per chord tone, 0-1
    pub velocity: f32,
}

/// One entry in a score, ordered by offset
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreEvent {
    Note(NoteEvent),
    Chord(ChordEvent),
}

impl ScoreEvent {
    pub fn offset(&self) -> f64 {
        match self {
            ScoreEvent::Note(note) => note.offset,
            ScoreEvent::Chord(chord) => chord.offset,
        }
    }

    fn end(&self) -> f64 {
        match self {
            ScoreEvent::Note(note) => note.offset + note.duration,
            ScoreEvent::Chord(chord) => chord.offset + chord.duration,
        }
    }

    /// Number of simultaneous tones this event expands to
    pub fn tone_count(&self) -> usize {
        match self {
            ScoreEvent::Note(_) => 1,
            ScoreEvent::Chord(chord) => chord.pitches.len(),
        }
    }
}

/// A fixed schedule of notes and chords with a loop length in seconds
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Score {
    events: Vec<ScoreEvent>,
    length: f64,
}

impl Score {
    pub fn builder() -> ScoreBuilder {
        ScoreBuilder::new()
    }

    /// Events in offset order.
    pub fn events(&self) -> &[ScoreEvent] {
        &self.events
    }

    /// Loop length in seconds: the continuation deadline for one pass.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Number of single-note events.
    pub fn note_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ScoreEvent::Note(_)))
            .count()
    }

    /// Total tones contributed by chord events.
    pub fn chord_tone_count(&self) -> usize {
        self.events
            .iter()
            .filter_map(|e| match e {
                ScoreEvent::Chord(chord) => Some(chord.pitches.len()),
                ScoreEvent::Note(_) => None,
            })
            .sum()
    }

    /// Total tones one scheduling pass issues.
    pub fn tone_count(&self) -> usize {
        self.events.iter().map(ScoreEvent::tone_count).sum()
    }

    /// The built-in melody: eight 4/4 bars over a C / Am / F / G progression,
    /// two beats per second, with a block-chord accompaniment on each
    /// downbeat. Loops every 16 seconds.
    pub fn music_box() -> Score {
        use pitch::*;

        const BEAT: f64 = 0.5;
        const MELODY: f32 = 0.5;
        const CHORD: f32 = 0.22;

        let bar = |n: f64| n * 4.0 * BEAT;

        Score::builder()
            // Accompaniment: one triad per bar
            .chord_at(bar(0.0), &[C3, E3, G3], bar(1.0), CHORD)
            .chord_at(bar(1.0), &[A2, C3, E3], bar(1.0), CHORD)
            .chord_at(bar(2.0), &[F2, A2, C3], bar(1.0), CHORD)
            .chord_at(bar(3.0), &[G2, B2, D3], bar(1.0), CHORD)
            .chord_at(bar(4.0), &[C3, E3, G3], bar(1.0), CHORD)
            .chord_at(bar(5.0), &[A2, C3, E3], bar(1.0), CHORD)
            .chord_at(bar(6.0), &[F2, A2, C3], bar(1.0), CHORD)
            .chord_at(bar(7.0), &[G2, B2, D3], bar(1.0), CHORD)
            // Melody line
            .note_at(bar(0.0), E4, BEAT, MELODY)
            .note_at(bar(0.0) + BEAT, G4, BEAT, MELODY)
            .note_at(bar(0.0) + 2.0 * BEAT, C5, 2.0 * BEAT, MELODY)
            .note_at(bar(1.0), B4, BEAT, MELODY)
            .note_at(bar(1.0) + BEAT, A4, BEAT, MELODY)
            .note_at(bar(1.0) + 2.0 * BEAT, E4, 2.0 * BEAT, MELODY)
            .note_at(bar(2.0), A4, BEAT, MELODY)
            .note_at(bar(2.0) + BEAT, G4, BEAT, MELODY)
            .note_at(bar(2.0) + 2.0 * BEAT, F4, 2.0 * BEAT, MELODY)
            .note_at(bar(3.0), G4, 3.0 * BEAT, MELODY)
            .note_at(bar(3.0) + 3.0 * BEAT, B4, BEAT, MELODY)
            .note_at(bar(4.0), E4, BEAT, MELODY)
            .note_at(bar(4.0) + BEAT, G4, BEAT, MELODY)
            .note_at(bar(4.0) + 2.0 * BEAT, C5, 2.0 * BEAT, MELODY)
            .note_at(bar(5.0), D5, BEAT, MELODY)
            .note_at(bar(5.0) + BEAT, C5, BEAT, MELODY)
            .note_at(bar(5.0) + 2.0 * BEAT, A4, 2.0 * BEAT, MELODY)
            .note_at(bar(6.0), F4, BEAT, MELODY)
            .note_at(bar(6.0) + BEAT, A4, BEAT, MELODY)
            .note_at(bar(6.0) + 2.0 * BEAT, G4, 2.0 * BEAT, MELODY)
            .note_at(bar(7.0), D4, BEAT, MELODY)
            .note_at(bar(7.0) + BEAT, B3, BEAT, MELODY)
            .note_at(bar(7.0) + 2.0 * BEAT, C4, 2.0 * BEAT, MELODY)
            .build()
            .expect("built-in score is valid")
    }
}

/// Builder for constructing scores with validated timing
pub struct ScoreBuilder {
    events: Vec<ScoreEvent>,
    length: Option<f64>,
    error: Option<ScoreError>,
}

impl ScoreBuilder {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            length: None,
            error: None,
        }
    }

    /// Add a single note at an absolute offset (seconds from loop start).
    pub fn note_at(mut self, offset: f64, pitch: Pitch, duration: f64, velocity: f32) -> Self {
        if let Err(err) = check_event(offset, duration, velocity) {
            self.error.get_or_insert(err);
            return self;
        }
        self.events.push(ScoreEvent::Note(NoteEvent {
            offset,
            duration,
            pitch,
            velocity,
        }));
        self
    }

    /// Add a chord at an absolute offset; every pitch sounds for the full
    /// duration.
    pub fn chord_at(
        mut self,
        offset: f64,
        pitches: &[Pitch],
        duration: f64,
        velocity: f32,
    ) -> Self {
        if let Err(err) = check_event(offset, duration, velocity) {
            self.error.get_or_insert(err);
            return self;
        }
        if pitches.is_empty() {
            self.error.get_or_insert(ScoreError::EmptyChord { offset });
            return self;
        }
        self.events.push(ScoreEvent::Chord(ChordEvent {
            offset,
            duration,
            pitches: pitches.to_vec(),
            velocity,
        }));
        self
    }

    /// Override the loop length. Defaults to the end of the last event;
    /// set this to add trailing silence before the loop repeats.
    pub fn length(mut self, seconds: f64) -> Self {
        self.length = Some(seconds);
        self
    }

    /// Build the final score, sorting events into schedule order.
    pub fn build(self) -> Result<Score, ScoreError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.events.is_empty() {
            return Err(ScoreError::Empty);
        }

        let mut events = self.events;
        events.sort_by(|a, b| {
            a.offset()
                .partial_cmp(&b.offset())
                .expect("offsets validated finite")
        });

        let last_end = events
            .iter()
            .map(ScoreEvent::end)
            .fold(0.0_f64, f64::max);
        let length = self.length.unwrap_or(last_end);
        if !length.is_finite() || length < last_end {
            return Err(ScoreError::LengthTooShort { length, last_end });
        }

        Ok(Score { events, length })
    }
}

fn check_event(offset: f64, duration: f64, velocity: f32) -> Result<(), ScoreError> {
    if !offset.is_finite() || offset < 0.0 || !duration.is_finite() || duration <= 0.0 {
        return Err(ScoreError::BadTiming { offset, duration });
    }
    if !velocity.is_finite() || velocity <= 0.0 || velocity > 1.0 {
        return Err(ScoreError::BadVelocity { velocity });
    }
    Ok(())
}

/// Errors that can occur when building a score
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// No events were added
    Empty,
    /// Offset or duration is negative, zero, or non-finite
    BadTiming { offset: f64, duration: f64 },
    /// Velocity outside (0, 1]
    BadVelocity { velocity: f32 },
    /// Chord with no pitches
    EmptyChord { offset: f64 },
    /// Explicit length ends before the last event does
    LengthTooShort { length: f64, last_end: f64 },
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::Empty => write!(f, "score has no events"),
            ScoreError::BadTiming { offset, duration } => {
                write!(
                    f,
                    "event timing invalid: offset {}s, duration {}s",
                    offset, duration
                )
            }
            ScoreError::BadVelocity { velocity } => {
                write!(f, "velocity {} outside (0, 1]", velocity)
            }
            ScoreError::EmptyChord { offset } => {
                write!(f, "chord at {}s has no pitches", offset)
            }
            ScoreError::LengthTooShort { length, last_end } => {
                write!(
                    f,
                    "loop length {}s ends before the last event at {}s",
                    length, last_end
                )
            }
        }
    }
}

impl std::error::Error for ScoreError {}

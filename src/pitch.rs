#![allow(non_upper_case_globals)]

/*
Symbolic Pitch Names
====================

A `Pitch` wraps a MIDI note number and knows its frequency in twelve-tone
equal temperament, tuned to A4 = 440 Hz:

    frequency = 440 * 2^((midi - 69) / 12)

Naming Convention:
- Natural notes: C4, D4, E4, etc.
- Sharps: Cs4 (C#4), Ds4 (D#4), etc.
- Flats: Db4, Eb4, etc. (aliases for the same pitches as the sharps)

Middle C (C4) = MIDI note 60. Constants cover C2..B6, the range the built-in
score uses; anything else can be spelled with `Pitch::parse` ("Bb3", "F#5").

Lookup is a pure function of the name: the same name always yields the same
frequency, which is what makes schedules testable.
*/

use std::fmt;

/// Tuning reference: A4 = 440 Hz.
pub const CONCERT_A: Pitch = A4;

/// A musical pitch, stored as a MIDI note number (C4 = 60, A4 = 69).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(pub u8);

impl Pitch {
    /// Frequency in Hz (equal temperament, A4 = 440 Hz).
    pub fn frequency(self) -> f32 {
        440.0 * 2.0_f32.powf((self.0 as f32 - 69.0) / 12.0)
    }

    /// MIDI note number.
    pub fn midi(self) -> u8 {
        self.0
    }

    /// Parse a symbolic name like "E4", "Bb3", or "F#5".
    ///
    /// Letter A-G, optional accidental ('#' or 's' for sharp, 'b' for flat),
    /// octave digit 0-9. Unknown names are an error; use [`parse_lenient`]
    /// for the substitute-A440 behavior.
    ///
    /// [`parse_lenient`]: Pitch::parse_lenient
    pub fn parse(name: &str) -> Result<Pitch, PitchError> {
        let unknown = || PitchError::UnknownName(name.to_string());
        let mut chars = name.chars();

        let semitone: i16 = match chars.next().ok_or_else(unknown)? {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(unknown()),
        };

        let mut next = chars.next().ok_or_else(unknown)?;
        let accidental: i16 = match next {
            '#' | 's' => {
                next = chars.next().ok_or_else(unknown)?;
                1
            }
            'b' => {
                next = chars.next().ok_or_else(unknown)?;
                -1
            }
            _ => 0,
        };

        let octave = next.to_digit(10).ok_or_else(unknown)? as i16;
        if chars.next().is_some() {
            return Err(unknown());
        }

        let midi = 12 * (octave + 1) + semitone + accidental;
        if !(0..=127).contains(&midi) {
            return Err(PitchError::OutOfRange(name.to_string()));
        }
        Ok(Pitch(midi as u8))
    }

    /// Parse a symbolic name, substituting A4 (440 Hz) for anything
    /// unrecognized. Mirrors lookup tables that fail soft on a typo; prefer
    /// [`parse`](Pitch::parse) when a wrong pitch should be an error.
    pub fn parse_lenient(name: &str) -> Pitch {
        Pitch::parse(name).unwrap_or(CONCERT_A)
    }

    /// Canonical name with sharp spelling, e.g. "C#4".
    pub fn name(self) -> String {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        let octave = (self.0 / 12) as i16 - 1;
        format!("{}{}", NAMES[(self.0 % 12) as usize], octave)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Errors from symbolic pitch lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PitchError {
    /// Name does not follow letter / accidental / octave form
    UnknownName(String),
    /// Name parses but lands outside the MIDI range
    OutOfRange(String),
}

impl fmt::Display for PitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PitchError::UnknownName(name) => write!(f, "unknown pitch name: {:?}", name),
            PitchError::OutOfRange(name) => write!(f, "pitch out of MIDI range: {:?}", name),
        }
    }
}

impl std::error::Error for PitchError {}

// Octave 2
pub const C2: Pitch = Pitch(36);
pub const Cs2: Pitch = Pitch(37);
pub const Db2: Pitch = Pitch(37);
pub const D2: Pitch = Pitch(38);
pub const Ds2: Pitch = Pitch(39);
pub const Eb2: Pitch = Pitch(39);
pub const E2: Pitch = Pitch(40);
pub const F2: Pitch = Pitch(41);
pub const Fs2: Pitch = Pitch(42);
pub const Gb2: Pitch = Pitch(42);
pub const G2: Pitch = Pitch(43);
pub const Gs2: Pitch = Pitch(44);
pub const Ab2: Pitch = Pitch(44);
pub const A2: Pitch = Pitch(45);
pub const As2: Pitch = Pitch(46);
pub const Bb2: Pitch = Pitch(46);
pub const B2: Pitch = Pitch(47);

// Octave 3
pub const C3: Pitch = Pitch(48);
pub const Cs3: Pitch = Pitch(49);
pub const Db3: Pitch = Pitch(49);
pub const D3: Pitch = Pitch(50);
pub const Ds3: Pitch = Pitch(51);
pub const Eb3: Pitch = Pitch(51);
pub const E3: Pitch = Pitch(52);
pub const F3: Pitch = Pitch(53);
pub const Fs3: Pitch = Pitch(54);
pub const Gb3: Pitch = Pitch(54);
pub const G3: Pitch = Pitch(55);
pub const Gs3: Pitch = Pitch(56);
pub const Ab3: Pitch = Pitch(56);
pub const A3: Pitch = Pitch(57);
pub const As3: Pitch = Pitch(58);
pub const Bb3: Pitch = Pitch(58);
pub const B3: Pitch = Pitch(59);

// Octave 4 (Middle C octave)
pub const C4: Pitch = Pitch(60);
pub const Cs4: Pitch = Pitch(61);
pub const Db4: Pitch = Pitch(61);
pub const D4: Pitch = Pitch(62);
pub const Ds4: Pitch = Pitch(63);
pub const Eb4: Pitch = Pitch(63);
pub const E4: Pitch = Pitch(64);
pub const F4: Pitch = Pitch(65);
pub const Fs4: Pitch = Pitch(66);
pub const Gb4: Pitch = Pitch(66);
pub const G4: Pitch = Pitch(67);
pub const Gs4: Pitch = Pitch(68);
pub const Ab4: Pitch = Pitch(68);
pub const A4: Pitch = Pitch(69); // A440 tuning reference
pub const As4: Pitch = Pitch(70);
pub const Bb4: Pitch = Pitch(70);
pub const B4: Pitch = Pitch(71);

// Octave 5
pub const C5: Pitch = Pitch(72);
pub const Cs5: Pitch = Pitch(73);
pub const Db5: Pitch = Pitch(73);
pub const D5: Pitch = Pitch(74);
pub const Ds5: Pitch = Pitch(75);
pub const Eb5: Pitch = Pitch(75);
pub const E5: Pitch = Pitch(76);
pub const F5: Pitch = Pitch(77);
pub const Fs5: Pitch = Pitch(78);
pub const Gb5: Pitch = Pitch(78);
pub const G5: Pitch = Pitch(79);
pub const Gs5: Pitch = Pitch(80);
pub const Ab5: Pitch = Pitch(80);
pub const A5: Pitch = Pitch(81);
pub const As5: Pitch = Pitch(82);
pub const Bb5: Pitch = Pitch(82);
pub const B5: Pitch = Pitch(83);

// Octave 6
pub const C6: Pitch = Pitch(84);
pub const Cs6: Pitch = Pitch(85);
pub const Db6: Pitch = Pitch(85);
pub const D6: Pitch = Pitch(86);
pub const Ds6: Pitch = Pitch(87);
pub const Eb6: Pitch = Pitch(87);
pub const E6: Pitch = Pitch(88);
pub const F6: Pitch = Pitch(89);
pub const Fs6: Pitch = Pitch(90);
pub const Gb6: Pitch = Pitch(90);
pub const G6: Pitch = Pitch(91);
pub const Gs6: Pitch = Pitch(92);
pub const Ab6: Pitch = Pitch(92);
pub const A6: Pitch = Pitch(93);
pub const As6: Pitch = Pitch(94);
pub const Bb6: Pitch = Pitch(94);
pub const B6: Pitch = Pitch(95);
